pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown template: {id}")]
    UnknownTemplate { id: String },

    #[error("Invalid synthesis config: {message}")]
    InvalidConfig { message: String },
}
