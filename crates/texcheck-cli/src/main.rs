use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use texcheck_core::{analyze, EngineConfig, Summary};
use texcheck_syntax::AnalysisSession;

#[derive(Parser)]
#[command(name = "texcheck")]
#[command(about = "Static checks for LaTeX documents", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Start file of the document
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Directory inclusions and bibliographies are resolved against
    /// [default: the directory of FILE]
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// JSON file with grammar and rule settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document and print its diagnostics
    Check {
        #[command(flatten)]
        input: Input,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the scanned node sequence as JSON
    Dump {
        #[command(flatten)]
        input: Input,
    },
}

impl Input {
    fn config(&self) -> anyhow::Result<EngineConfig> {
        match &self.config {
            Some(path) => Ok(EngineConfig::load_from_path(path)?),
            None => Ok(EngineConfig::default()),
        }
    }

    /// The start file as an absolute path and the directory to resolve from.
    fn locations(&self) -> anyhow::Result<(PathBuf, PathBuf)> {
        let file = std::path::absolute(&self.path)
            .with_context(|| format!("cannot resolve {}", self.path.display()))?;
        let root = match &self.root {
            Some(root) => root.clone(),
            None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Ok((file, root))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Check { input, format } => {
            let config = input.config()?;
            let grammar = config.registry()?;
            let (file, root) = input.locations()?;
            let analysis = analyze(&file, &root, &grammar, &config.rules)?;

            match format {
                Format::Json => {
                    println!("{}", serde_json::to_string_pretty(&analysis.diagnostics)?)
                }
                Format::Text => {
                    for diagnostic in &analysis.diagnostics {
                        println!("{diagnostic}");
                    }
                    let summary = Summary::from(&analysis);
                    println!(
                        "{} error(s), {} warning(s), {} info(s)",
                        summary.errors, summary.warnings, summary.infos
                    );
                }
            }

            if analysis.has_errors() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Dump { input } => {
            let config = input.config()?;
            let grammar = config.registry()?;
            let (file, root) = input.locations()?;
            let document = AnalysisSession::new(&grammar, root).scan(&file)?;
            let dump = serde_json::json!({
                "files": document
                    .sources()
                    .iter()
                    .map(|(_, source)| source.path.display().to_string())
                    .collect::<Vec<_>>(),
                "nodes": document.nodes(),
                "issues": document.issues(),
            });
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}
