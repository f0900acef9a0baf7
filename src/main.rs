//! # api-modules CLI (`apimod`)
//!
//! Commands for generating token-budgeted API module artifacts from an
//! OpenAPI specification and for working with them at runtime.
//!
//! ## Usage
//!
//! ```bash
//! apimod --config ./config/apimod.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `apimod generate` | Resolve the spec and write the index plus per-module documents |
//! | `apimod modules` | List the static module definitions |
//! | `apimod analyze` | Match a task description against a module's endpoints and report gaps |
//! | `apimod prompt` | Assemble a prompt with (or without) module API context |
//!
//! ## Examples
//!
//! ```bash
//! # Generate from the remote spec, falling back to the local file
//! apimod generate --output ./api-modules
//!
//! # Generate strictly from a local spec file
//! apimod generate --local ./openapi.json --force-local
//!
//! # Detect missing endpoints for a task
//! apimod analyze --module queues "quiero eliminar un lead"
//!
//! # Assemble an enriched prompt
//! apimod prompt --module auditing "add filters to the audit report list"
//! ```

mod analyze;
mod client;
mod config;
mod extract;
mod generate;
mod models;
mod modules;
mod partition;
mod prompt;
mod source;
mod tokens;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::generate::GenerateOptions;

/// api-modules CLI — partition an OpenAPI specification into token-budgeted
/// topic modules and analyze task descriptions against them.
#[derive(Parser)]
#[command(
    name = "apimod",
    about = "Partition OpenAPI specifications into token-budgeted topic modules for AI prompt context",
    version,
    long_about = "api-modules splits a large OpenAPI specification into a compact index plus \
    per-module documents sized for prompt injection, and analyzes natural-language task \
    descriptions to detect endpoints the API does not provide yet."
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; every setting has a
    /// working default.
    #[arg(long, global = true, default_value = "./config/apimod.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Generate the index and per-module documents from the specification.
    ///
    /// Resolves the spec from the remote URL with a local file fallback,
    /// extracts endpoints, partitions them by tag into the static modules,
    /// and writes `api-index.json`, `metadata.json`, `API-INDEX.md`, and one
    /// JSON document per module under `modules/`.
    Generate {
        /// Remote URL of the OpenAPI specification.
        #[arg(long)]
        remote_url: Option<String>,

        /// Local fallback path to the OpenAPI specification.
        #[arg(long)]
        local: Option<PathBuf>,

        /// Output directory for the generated artifacts.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the remote source and read only the local file.
        #[arg(long, conflicts_with = "force_remote")]
        force_local: bool,

        /// Fail if the remote source is unavailable instead of falling back.
        #[arg(long)]
        force_remote: bool,
    },

    /// List the static module definitions.
    ///
    /// Shows each module's id, label, estimated token budget, and the spec
    /// tags that map endpoints into it.
    Modules,

    /// Analyze a task description against a module's endpoints.
    ///
    /// Fetches the module document, extracts intended actions and entities
    /// from the description, and reports matched endpoints and gaps with
    /// ready-to-file issue drafts.
    Analyze {
        /// The task description to analyze.
        description: String,

        /// Module whose endpoints the description is matched against.
        #[arg(long)]
        module: String,

        /// Override the base URL where module documents are served.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Assemble a prompt for a task description.
    ///
    /// With `--module`, the module's endpoint summaries are rendered into the
    /// prompt; without it (or when the module cannot be fetched), a simple
    /// template with only project context is used.
    Prompt {
        /// The task description to embed in the prompt.
        description: String,

        /// Module whose endpoints enrich the prompt.
        #[arg(long)]
        module: Option<String>,

        /// Override the base URL where module documents are served.
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Generate {
            remote_url,
            local,
            output,
            force_local,
            force_remote,
        } => {
            generate::run_generate(
                &cfg,
                GenerateOptions {
                    remote_url,
                    local_path: local,
                    output_dir: output,
                    force_local,
                    force_remote,
                },
            )
            .await?;
        }
        Commands::Modules => {
            modules::list_modules();
        }
        Commands::Analyze {
            description,
            module,
            base_url,
        } => {
            analyze::run_analyze(&cfg, &module, &description, base_url).await?;
        }
        Commands::Prompt {
            description,
            module,
            base_url,
        } => {
            prompt::run_prompt(&cfg, module.as_deref(), &description, base_url).await?;
        }
    }

    Ok(())
}
