//! Designer Store - inspect a workspace of pages, fragments and widgets

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use designer_store::{
    assets_in_order, Artifact, HasAssets, JsonFileRepository, Repository, StoreConfig, Workspace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "designer-store", version, about = "Inspect a designer workspace")]
struct Cli {
    /// Workspace directory (defaults to the configured one)
    #[arg(long, value_name = "PATH", global = true)]
    workspace: Option<PathBuf>,
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List artifacts of a kind
    List { kind: Kind },
    /// Print an artifact document
    Show { kind: Kind, id: String },
    /// Resolve an artifact through the uuid index
    Uuid { kind: Kind, uuid: String },
    /// Pages and fragments using a fragment or widget
    Usages { id: String },
    /// Assets of a page or widget, in order
    Assets { kind: Kind, id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Page,
    Fragment,
    Widget,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(level)
        .init();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_from(path)?,
        None => StoreConfig::load()?,
    };
    if let Some(workspace) = cli.workspace {
        config.workspace_path = workspace;
    }
    tracing::debug!("Using workspace {}", config.workspace_path.display());

    let workspace = Workspace::open(config);
    match cli.command {
        Commands::List { kind } => match kind {
            Kind::Page => list(workspace.pages()),
            Kind::Fragment => list(workspace.fragments()),
            Kind::Widget => list(workspace.widgets()),
        },
        Commands::Show { kind, id } => match kind {
            Kind::Page => show(workspace.pages(), &id),
            Kind::Fragment => show(workspace.fragments(), &id),
            Kind::Widget => show(workspace.widgets(), &id),
        },
        Commands::Uuid { kind, uuid } => match kind {
            Kind::Page => show_by_uuid(workspace.pages(), &uuid),
            Kind::Fragment => show_by_uuid(workspace.fragments(), &uuid),
            Kind::Widget => show_by_uuid(workspace.widgets(), &uuid),
        },
        Commands::Usages { id } => {
            let usages = workspace.usages(&id)?;
            for page in &usages.pages {
                println!("page\t{}", page.id);
            }
            for fragment in &usages.fragments {
                println!("fragment\t{}", fragment.id);
            }
            Ok(())
        }
        Commands::Assets { kind, id } => match kind {
            Kind::Page => print_assets(workspace.pages(), &id),
            Kind::Widget => print_assets(workspace.widgets(), &id),
            Kind::Fragment => anyhow::bail!("fragments have no assets"),
        },
    }
}

fn list<T: Artifact>(repository: &JsonFileRepository<T>) -> Result<()> {
    for artifact in repository.get_all()? {
        println!("{}", artifact.id());
    }
    Ok(())
}

fn show<T: Artifact>(repository: &JsonFileRepository<T>, id: &str) -> Result<()> {
    let artifact = repository.get(id)?;
    println!("{}", serde_json::to_string_pretty(&artifact)?);
    Ok(())
}

fn show_by_uuid<T: Artifact>(repository: &JsonFileRepository<T>, uuid: &str) -> Result<()> {
    let artifact = repository
        .get_by_uuid(uuid)?
        .with_context(|| format!("no {} registered for uuid {uuid}", T::KIND))?;
    println!("{}", serde_json::to_string_pretty(&artifact)?);
    Ok(())
}

fn print_assets<T: HasAssets>(repository: &JsonFileRepository<T>, id: &str) -> Result<()> {
    let artifact = repository.get(id)?;
    for asset in assets_in_order(&artifact) {
        let kind = asset.asset_type.map(|t| t.key()).unwrap_or("?");
        let location = if asset.external { "external" } else { "stored" };
        println!("{}\t{}\t{}\t{}", asset.order, kind, location, asset.name);
    }
    Ok(())
}
