//! Main CLI application structure

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::output::{Output, OutputFormat};
use super::{rules, tree, validate};
use crate::storage::{Config, Project};
use crate::validation::State;

/// Exit code of `validate` when the document has errors
const EXIT_INVALID: u8 = 2;

#[derive(Parser)]
#[command(name = "workpiece")]
#[command(author, version, about = "Structure and metadata validation for digitized works")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workpiece project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Validate a document against a ruleset
    Validate {
        /// Document path or file:// URI
        document: String,

        /// Ruleset path or file:// URI (defaults to the project's default_ruleset)
        #[arg(long, short)]
        ruleset: Option<String>,

        /// Label languages, e.g. "de, en;q=0.5"
        #[arg(long, env = "WORKPIECE_LANG")]
        lang: Option<String>,
    },

    /// Show the structure tree of a document
    Tree {
        /// Document path or file:// URI
        document: String,

        /// Show the physical instead of the logical tree
        #[arg(long)]
        physical: bool,
    },

    /// List media units in page order
    Pages {
        /// Document path or file:// URI
        document: String,
    },

    /// Show the divisions and fields of a ruleset
    Rules {
        /// Ruleset path or file:// URI
        ruleset: String,

        /// Show allowed children and fields of one division type
        #[arg(long, short)]
        division: Option<String>,

        /// Label languages, e.g. "de, en;q=0.5"
        #[arg(long, env = "WORKPIECE_LANG")]
        lang: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "workpiece=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Main entry point for the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    if let Some(root) = &config.project_root {
        output.verbose(&format!("Using project at {}", root.display()));
    }

    let mut exit = ExitCode::SUCCESS;

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created directory at: {}", project.project_dir().display()),
            );
            output.verbose_ctx(
                "init",
                &format!("Rulesets go into: {}", project.rulesets_dir().display()),
            );
            output.success(&format!(
                "Initialized workpiece project at {}",
                project.root().display()
            ));
        }

        Commands::Validate {
            document,
            ruleset,
            lang,
        } => {
            let state = validate::run(
                &output,
                &config,
                &document,
                ruleset.as_deref(),
                lang.as_deref(),
            )?;
            if state == State::Error {
                exit = ExitCode::from(EXIT_INVALID);
            }
        }

        Commands::Tree { document, physical } => tree::tree(&output, &document, physical)?,

        Commands::Pages { document } => tree::pages(&output, &document)?,

        Commands::Rules {
            ruleset,
            division,
            lang,
        } => rules::run(
            &output,
            &config,
            &ruleset,
            division.as_deref(),
            lang.as_deref(),
        )?,
    }

    output.verbose("Command completed");
    Ok(exit)
}
