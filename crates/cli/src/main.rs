//! `automation-studio` CLI entry-point.
//!
//! Available sub-commands:
//! - `catalog`: list the trigger and action catalog.
//! - `validate`: load an automation JSON file and print its step order.
//! - `new`: build an automation from a trigger and a list of actions.
//! - `apply`: replay a JSON script of editor commands onto an automation.

mod file_sink;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::Catalog;
use clap::{Parser, Subcommand};
use editor::{EditorCommand, EditorConfig, EditorSession, ExistingAutomation, NoticeLevel};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::file_sink::FileSink;

#[derive(Parser)]
#[command(
    name = "automation-studio",
    about = "Build and check CRM workflow automations",
    version
)]
struct Cli {
    /// TOML file with editor settings (spacing, trigger position, ordering).
    #[arg(long, global = true, env = "AUTOMATION_STUDIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available triggers and actions.
    Catalog,
    /// Load an automation JSON file and print its step order.
    Validate {
        /// Path to the automation JSON file.
        path: PathBuf,
    },
    /// Create a new automation.
    New {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Trigger subtype, e.g. `new_lead`.
        #[arg(long)]
        trigger: String,
        /// Action subtype to append; repeat for more steps.
        #[arg(long = "action")]
        actions: Vec<String>,
        /// Output file; prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply a JSON list of editor commands to an existing automation.
    Apply {
        /// Path to the automation JSON file.
        path: PathBuf,
        /// Path to the command script.
        script: PathBuf,
        /// Output file; prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = settings::load_editor_config(cli.config.as_deref()).await;
    let catalog = Arc::new(Catalog::builtin());

    let outcome = match cli.command {
        Command::Catalog => {
            print_catalog(&catalog);
            Ok(())
        }
        Command::Validate { path } => validate(catalog, config, &path).await,
        Command::New { name, description, trigger, actions, out } => {
            create(catalog, config, name, description, &trigger, &actions, out).await
        }
        Command::Apply { path, script, out } => apply(catalog, config, &path, &script, out).await,
    };

    if let Err(e) = outcome {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("Triggers:");
    for entry in catalog.triggers() {
        println!("  {:<20} {:<14} {}", entry.id, entry.category, entry.description);
    }
    println!("Actions:");
    for entry in catalog.steps() {
        println!("  {:<20} {:<14} {}", entry.id, entry.category, entry.description);
    }
}

async fn read_automation(path: &Path) -> Result<ExistingAutomation> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid automation JSON in {}", path.display()))
}

async fn validate(catalog: Arc<Catalog>, config: EditorConfig, path: &Path) -> Result<()> {
    let existing = read_automation(path).await?;
    let session = EditorSession::open_existing(catalog, config, &existing)?;
    let definition = session.to_definition()?;

    let order: Vec<&str> = definition.actions.iter().map(|a| a.id.as_str()).collect();
    println!(
        "✅ Automation is valid. Trigger: {}, steps: {order:?}",
        definition.trigger_type
    );
    Ok(())
}

async fn create(
    catalog: Arc<Catalog>,
    config: EditorConfig,
    name: String,
    description: String,
    trigger: &str,
    actions: &[String],
    out: Option<PathBuf>,
) -> Result<()> {
    let mut session = EditorSession::open_new(catalog, config);
    session.set_name(name)?;
    session.set_description(description)?;
    session.set_trigger_subtype(trigger)?;
    for subtype in actions {
        session.add_action(subtype)?;
    }
    save(&mut session, out).await
}

async fn apply(
    catalog: Arc<Catalog>,
    config: EditorConfig,
    path: &Path,
    script: &Path,
    out: Option<PathBuf>,
) -> Result<()> {
    let existing = read_automation(path).await?;
    let commands: Vec<EditorCommand> = serde_json::from_str(
        &tokio::fs::read_to_string(script)
            .await
            .with_context(|| format!("cannot read script {}", script.display()))?,
    )
    .with_context(|| format!("invalid command script {}", script.display()))?;

    let mut session = EditorSession::open_existing(catalog, config, &existing)?;
    for (index, command) in commands.into_iter().enumerate() {
        session
            .dispatch(command)
            .with_context(|| format!("command #{} failed", index + 1))?;
    }
    info!("applied script {}", script.display());
    save(&mut session, out).await
}

async fn save(session: &mut EditorSession, out: Option<PathBuf>) -> Result<()> {
    let sink = FileSink::new(out);
    let result = session.save(&sink).await;

    for notice in session.take_notices() {
        match notice.level {
            NoticeLevel::Info => info!("{}", notice.message),
            NoticeLevel::Error => tracing::error!("{}", notice.message),
        }
    }

    let receipt = result?;
    info!("automation {} saved at {}", receipt.automation_id, receipt.saved_at);
    Ok(())
}
