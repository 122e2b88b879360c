//! formwright - command line front end
//!
//! Edits, publishes and rolls back form configurations stored as JSON
//! documents, and evaluates field values against the active schema.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Cmd};
use formwright::config::{EditorConfig, DEFAULT_LOG_FILTER};
use formwright::engine::FieldValues;
use formwright::render::{render_active_form, RenderMode};
use formwright::schema::{FormConfiguration, SchemaMutation};
use formwright::store::JsonFileStore;
use formwright::version::VersionManager;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load_from(path)?,
        None => EditorConfig::load()?,
    };

    let store_dir = cli.store_dir.clone().unwrap_or_else(|| config.store_dir());
    tracing::debug!(store_dir = %store_dir.display(), "using configuration store");

    let mut manager =
        VersionManager::new(JsonFileStore::new(store_dir)).with_policy(config.publish_policy());

    match cli.cmd {
        Cmd::Init => {
            let seeded = manager.ensure_default().await?;
            print_summary(&seeded);
        }
        Cmd::Show { id } => {
            let current = manager.load(&id).await?;
            println!("{}", serde_json::to_string_pretty(&current)?);
        }
        Cmd::Mutate { mutation, id } => {
            let mutation: SchemaMutation =
                serde_json::from_str(&mutation).context("invalid mutation JSON")?;
            let current = manager.load(&id).await?;
            let next = manager.apply_mutation(&current, &mutation).await?;
            print_summary(&next);
        }
        Cmd::Publish { id } => {
            let current = manager.load(&id).await?;
            print_summary(&manager.publish(&current).await?);
        }
        Cmd::Discard { id } => {
            let current = manager.load(&id).await?;
            print_summary(&manager.discard_draft(&current).await?);
        }
        Cmd::Rollback { id } => {
            let current = manager.load(&id).await?;
            print_summary(&manager.rollback(&current).await?);
        }
        Cmd::Evaluate {
            values,
            template,
            preview,
        } => {
            let values: FieldValues =
                serde_json::from_str(&values).context("values must be a JSON object")?;
            let template = template.or(config.default_template);
            let mode = if preview {
                RenderMode::Preview
            } else {
                RenderMode::Editable
            };
            let schema = manager.get_active_schema(template.as_deref()).await;
            let form = render_active_form(schema, &values, mode)?;
            println!("{}", serde_json::to_string_pretty(&form)?);
        }
    }

    Ok(())
}

fn print_summary(config: &FormConfiguration) {
    let state = if config.is_draft { "draft" } else { "published" };
    println!(
        "{} v{} ({state}): {} sections, {} fields ({} custom), rollback {}",
        config.id,
        config.version,
        config.metadata.section_count,
        config.metadata.total_fields,
        config.metadata.custom_fields_count,
        if config.has_rollback_snapshot() {
            "available"
        } else {
            "not available"
        }
    );
}
