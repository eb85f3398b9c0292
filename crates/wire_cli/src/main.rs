//! CLI entry point.
//!
//! # Responsibility
//! - Own the process-wide store and model client handles and inject them
//!   into the core services.
//! - Print a deterministic status report for quick local sanity checks.
//!
//! Settings come from `$WIRE_CONFIG`, else `./wire.toml` when present,
//! else defaults.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::Path;
use wire_core::{
    init_logging_from, AzureOpenAiClient, DocumentService, ProjectService, Settings,
    SqliteItemStore, StoreDocumentRepository, StoreProjectRepository, TextGenerationService,
};

const SETTINGS_ENV: &str = "WIRE_CONFIG";
const DEFAULT_SETTINGS_PATH: &str = "wire.toml";

#[derive(Debug, Parser)]
#[command(name = "wire_cli")]
#[command(about = "Project and document store status, plus one-shot text generation")]
#[command(version)]
struct Cli {
    /// Prints the status report when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generates text with the configured model deployment
    Generate {
        /// Prompt sent as the user turn
        prompt: String,
        /// Earlier model output to continue from
        context: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings()?;
    let logging_active = init_logging_from(&settings.logging)?;

    println!("wire_core ping={}", wire_core::ping());
    println!("wire_core version={}", wire_core::core_version());
    println!("logging={}", if logging_active { "file" } else { "off" });

    match cli.command {
        None => report(&settings).await,
        Some(Command::Generate { prompt, context }) => {
            generate(&settings, &prompt, context.as_deref()).await
        }
    }
}

fn load_settings() -> Result<Settings> {
    if let Ok(path) = std::env::var(SETTINGS_ENV) {
        return Settings::load(&path).with_context(|| format!("loading settings from `{path}`"));
    }
    if Path::new(DEFAULT_SETTINGS_PATH).exists() {
        return Settings::load(DEFAULT_SETTINGS_PATH)
            .with_context(|| format!("loading settings from `{DEFAULT_SETTINGS_PATH}`"));
    }

    let mut settings = Settings::default();
    settings.apply_env_overrides(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

async fn report(settings: &Settings) -> Result<()> {
    let store = match &settings.store.database_path {
        Some(path) => SqliteItemStore::open(path)?,
        None => SqliteItemStore::open_in_memory()?,
    };
    let projects =
        StoreProjectRepository::new(store.container(&settings.store.projects_container));
    let documents =
        StoreDocumentRepository::new(store.container(&settings.store.documents_container));
    let project_service = ProjectService::new(projects.clone());
    let document_service = DocumentService::new(documents, projects);

    println!("projects={}", project_service.list_projects().await?.len());
    println!("documents={}", document_service.list_documents().await?.len());

    let dangling = document_service.find_dangling_documents().await?;
    println!("dangling_documents={}", dangling.len());
    for document in &dangling {
        println!(
            "dangling document_id={} project_id={}",
            document.id, document.project_id
        );
    }

    match &settings.generation {
        Some(generation) => println!("generation=configured deployment={}", generation.deployment),
        None => println!("generation=off"),
    }
    info!("event=status_report module=cli status=ok dangling={}", dangling.len());
    Ok(())
}

async fn generate(settings: &Settings, prompt: &str, context: Option<&str>) -> Result<()> {
    let generation = settings
        .generation
        .as_ref()
        .context("text generation is not configured")?;
    let service = TextGenerationService::new(AzureOpenAiClient::new(generation)?);

    match service.generate_text(prompt, context).await {
        Some(text) => {
            println!("{text}");
            Ok(())
        }
        None => bail!("content generation failed"),
    }
}
