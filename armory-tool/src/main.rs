mod config;
mod error;
mod export;
mod logging;

#[cfg(feature = "panel")]
mod panel;

use std::path::PathBuf;
use std::sync::Arc;

use armory_client::{shared_cache, Backend, HttpBackend, ResourceManager};
use armory_core::{
    filter, CatalogType, Category, Collection, Entity, Item, Rarity, Resource, Weapon,
};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::resolve_settings;
use crate::error::ArmoryError;
use crate::export::{export, ExportFormat};

#[derive(Parser)]
#[command(name = "armory")]
#[command(about = "Admin panel for the weapon skin catalog", long_about = None)]
struct Cli {
    /// Catalog server origin, e.g. http://localhost:8000
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[cfg(feature = "panel")]
    /// Open the interactive admin panel
    Panel,

    /// Print a resource collection
    List {
        /// items, weapons, categories, collections, rarities or types
        resource: Resource,

        /// Only show entities whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Dump a resource collection as JSON or YAML
    Export {
        resource: Resource,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Runs `$run::<Entity>(args..)` for the entity type of a resource.
macro_rules! for_resource {
    ($resource:expr, $run:ident($($arg:expr),*)) => {
        match $resource {
            Resource::Items => $run::<Item, _>($($arg),*).await,
            Resource::Weapons => $run::<Weapon, _>($($arg),*).await,
            Resource::Categories => $run::<Category, _>($($arg),*).await,
            Resource::Collections => $run::<Collection, _>($($arg),*).await,
            Resource::Rarities => $run::<Rarity, _>($($arg),*).await,
            Resource::Types => $run::<CatalogType, _>($($arg),*).await,
        }
    };
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init()?;
    let settings = resolve_settings(cli.base_url)?;
    let backend = Arc::new(HttpBackend::with_prefix(
        settings.base_url.clone(),
        settings.api_prefix.clone(),
    ));
    info!(base_url = %settings.base_url, "Using catalog server");

    match cli.command {
        #[cfg(feature = "panel")]
        Command::Panel => panel::run(backend, &settings).await?,
        Command::List { resource, search } => {
            for_resource!(resource, print_list(backend, search.as_deref().unwrap_or("")))?
        }
        Command::Export {
            resource,
            format,
            output,
        } => for_resource!(resource, write_export(backend, format, output.as_deref()))?,
    }

    Ok(())
}

async fn fetch<E: Entity, B: Backend>(backend: Arc<B>) -> Result<Arc<Vec<E>>, ArmoryError> {
    let manager = ResourceManager::<E, B>::new(backend, shared_cache());
    Ok(manager.list().await?)
}

async fn print_list<E: Entity, B: Backend>(backend: Arc<B>, query: &str) -> Result<(), ArmoryError> {
    let entities = fetch::<E, B>(Arc::clone(&backend)).await?;
    let visible = filter(entities.as_slice(), query);
    if visible.is_empty() {
        println!("No {} found.", E::RESOURCE.path());
        return Ok(());
    }

    for entity in visible {
        println!("#{:<4} {}", entity.id(), entity.name());
        for (label, value) in entity.details() {
            println!("      {}: {}", label, value);
        }
        if let Some(photo) = entity.photo() {
            println!("      Photo: {}", backend.photo_url(photo));
        }
    }
    Ok(())
}

async fn write_export<E: Entity, B: Backend>(
    backend: Arc<B>,
    format: ExportFormat,
    output: Option<&std::path::Path>,
) -> Result<(), ArmoryError> {
    let entities = fetch::<E, B>(backend).await?;
    let rendered = export(entities.as_slice(), format)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), count = entities.len(), "Exported");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
