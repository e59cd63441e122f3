use futures::executor::block_on;
use mersynth::catalog::{self, Template};
use mersynth::{
    Complexity, GenerationOptions, Issue, RawCompletion, StaticClient, Style, SynthesisConfig,
    Synthesizer, declaration, normalize, prompt, select,
};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MERSYNTH_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Config(mersynth::Error),
    Synthesis(mersynth::SynthesisError),
    Json(serde_json::Error),
    IssuesFound(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Config(err) => write!(f, "{err}"),
            CliError::Synthesis(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::IssuesFound(count) => write!(f, "{count} structural issue(s) found"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mersynth::Error> for CliError {
    fn from(value: mersynth::Error) -> Self {
        Self::Config(value)
    }
}

impl From<mersynth::SynthesisError> for CliError {
    fn from(value: mersynth::SynthesisError) -> Self {
        Self::Synthesis(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Templates,
    Select,
    Prompt,
    Normalize,
    Check,
    Repair,
    Generate,
}

#[derive(Debug, Default)]
struct Args {
    command: Option<Command>,
    positional: Vec<String>,
    options: GenerationOptions,
    industry_filter: bool,
    complexity_filter: bool,
    config: Option<String>,
    completion: Option<String>,
    suite: bool,
    pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectOut<'a> {
    template_id: &'a str,
    name: &'a str,
    diagram_type_hint: &'a str,
    suite: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueOut {
    #[serde(flatten)]
    issue: Issue,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOut<'a> {
    declaration: Option<&'a str>,
    issues: Vec<IssueOut>,
}

fn usage() -> &'static str {
    "mersynth-cli\n\
\n\
USAGE:\n\
  mersynth-cli templates [--industry <name>] [--complexity simple|medium|complex] [--pretty]\n\
  mersynth-cli select [--template <id>] <text>\n\
  mersynth-cli prompt [--template <id>] [--industry <name>] [--complexity <c>] [--style minimal|detailed|professional] [--examples] [--config <path>] <text>\n\
  mersynth-cli normalize [<path>|-]\n\
  mersynth-cli check [--pretty] [<path>|-]\n\
  mersynth-cli repair [<path>|-]\n\
  mersynth-cli generate --completion <path> [--suite] [--template <id>] [--industry <name>] [--complexity <c>] [--style <s>] [--examples] [--config <path>] [--pretty] <text>\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin. <text> is read from stdin when omitted.\n\
  - templates lists every template; --industry/--complexity keep only the applicable ones.\n\
  - check reports issues in the normalized input and exits with code 3 when any are found.\n\
  - generate replays a recorded completion (JSON: content, title, description, tokensUsed)\n\
    through the full pipeline and prints the diagram JSON.\n\
  - --config accepts JSON, or YAML when the path ends in .yaml/.yml.\n\
  - Set MERSYNTH_LOG (e.g. MERSYNTH_LOG=debug) to log pipeline steps to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "templates" if args.command.is_none() => args.command = Some(Command::Templates),
            "select" if args.command.is_none() => args.command = Some(Command::Select),
            "prompt" if args.command.is_none() => args.command = Some(Command::Prompt),
            "normalize" if args.command.is_none() => args.command = Some(Command::Normalize),
            "check" if args.command.is_none() => args.command = Some(Command::Check),
            "repair" if args.command.is_none() => args.command = Some(Command::Repair),
            "generate" if args.command.is_none() => args.command = Some(Command::Generate),
            "--pretty" => args.pretty = true,
            "--examples" => args.options.include_examples = true,
            "--suite" => args.suite = true,
            "--template" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.template_override = Some(id.clone());
            }
            "--industry" => {
                let Some(industry) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.industry = Some(industry.clone());
                args.industry_filter = true;
            }
            "--complexity" => {
                let Some(complexity) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.complexity = complexity
                    .parse::<Complexity>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.complexity_filter = true;
            }
            "--style" => {
                let Some(style) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.style = style
                    .parse::<Style>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--completion" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.completion = Some(path.clone());
            }
            "--" => args.positional.extend(it.by_ref().cloned()),
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            word => args.positional.push(word.to_string()),
        }
    }

    if args.command.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

/// Reads a single `<path>|-` operand.
fn read_source(args: &Args) -> Result<String, CliError> {
    match args.positional.as_slice() {
        [] => read_input(None),
        [path] => read_input(Some(path)),
        _ => Err(CliError::Usage(usage())),
    }
}

/// Joins the remaining words into the description, or reads it from stdin.
fn read_text(args: &Args) -> Result<String, CliError> {
    let text = match args.positional.as_slice() {
        [] => read_input(None)?,
        [dash] if dash == "-" => read_input(None)?,
        words => words.join(" "),
    };
    if text.trim().is_empty() {
        return Err(CliError::Usage(usage()));
    }
    Ok(text)
}

fn load_config(path: Option<&str>) -> Result<SynthesisConfig, CliError> {
    let Some(path) = path else {
        return Ok(SynthesisConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let is_yaml = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let config = if is_yaml {
        SynthesisConfig::from_yaml_str(&text)?
    } else {
        SynthesisConfig::from_json_str(&text)?
    };
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let Some(command) = args.command else {
        return Err(CliError::Usage(usage()));
    };
    tracing::debug!(?command, "running command");

    match command {
        Command::Templates => {
            let templates: Vec<&Template> = if args.industry_filter || args.complexity_filter {
                catalog::applicable(args.options.industry(), args.options.complexity)
            } else {
                catalog::templates().iter().collect()
            };
            write_json(&templates, args.pretty)
        }
        Command::Select => {
            let text = read_text(&args)?;
            let template = select::select(&text, &args.options);
            let out = SelectOut {
                template_id: template.id,
                name: template.name,
                diagram_type_hint: template.diagram_type_hint(),
                suite: select::suite_candidates(&text)
                    .into_iter()
                    .map(|t| t.id)
                    .collect(),
            };
            write_json(&out, args.pretty)
        }
        Command::Prompt => {
            let text = read_text(&args)?;
            let config = load_config(args.config.as_deref())?;
            let mut options = args.options.clone();
            if options.industry.is_none() {
                options.industry = Some(config.default_industry);
            }
            let template = select::select(&text, &options);
            println!("{}", prompt::compose(&text, template, &options));
            Ok(())
        }
        Command::Normalize => {
            let source = read_source(&args)?;
            println!("{}", normalize::normalize(&source));
            Ok(())
        }
        Command::Check => {
            let source = read_source(&args)?;
            let code = normalize::normalize(&source);
            let issues = mersynth::detect(&code);
            let out = CheckOut {
                declaration: declaration::detect_declaration(&code).map(|d| d.id),
                issues: issues
                    .iter()
                    .map(|&issue| IssueOut {
                        issue,
                        message: issue.message(),
                    })
                    .collect(),
            };
            write_json(&out, args.pretty)?;
            if issues.is_empty() {
                Ok(())
            } else {
                Err(CliError::IssuesFound(issues.len()))
            }
        }
        Command::Repair => {
            let source = read_source(&args)?;
            println!("{}", mersynth::sanitize_code(&source));
            Ok(())
        }
        Command::Generate => {
            let Some(completion_path) = args.completion.as_deref() else {
                return Err(CliError::Usage(usage()));
            };
            let completion: RawCompletion =
                serde_json::from_str(&std::fs::read_to_string(completion_path)?)?;
            let text = read_text(&args)?;
            let config = load_config(args.config.as_deref())?;
            let synth = Synthesizer::new(StaticClient::new(completion)).with_config(config);

            if args.suite {
                let diagrams = block_on(synth.generate_diagram_suite(&text, &args.options));
                write_json(&diagrams, args.pretty)
            } else {
                let diagram = block_on(synth.generate_diagram(&text, &args.options))?;
                write_json(&diagram, args.pretty)
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err @ CliError::IssuesFound(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
