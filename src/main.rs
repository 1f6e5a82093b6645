mod cli;

use gallery::{config, GalleryService, LocalFileStore};
use gallery_db::pool::init_pool;
use gallery_db::SqlitePictureRepository;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, GalleryCommand};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gallery=trace,gallery_db=debug,gallery_core=debug".to_string()
        } else {
            "gallery=info,gallery_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("gallery {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Gallery(command) => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let service = open_service(&config)?;
            run_command(&service, &config, command)
        }
    }
}

fn open_service(config: &config::Config) -> Result<GalleryService> {
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }
    }

    let db_path = config.database.path.to_string_lossy();
    tracing::debug!("Opening picture database at {}", db_path);
    let pool = init_pool(&db_path)?;

    Ok(GalleryService::new(
        SqlitePictureRepository::new(pool),
        LocalFileStore::new(&config.storage.base_dir),
    ))
}

fn run_command(
    service: &GalleryService,
    config: &config::Config,
    command: GalleryCommand,
) -> Result<()> {
    match command {
        GalleryCommand::Upload {
            file,
            owner,
            category,
            title,
            caption,
        } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read upload: {:?}", file))?;
            let id = service
                .insert_from_upload(&data, owner, caption.as_deref(), category, title.as_deref())
                .with_context(|| format!("Failed to upload {:?}", file))?;
            println!("{id}");
        }
        GalleryCommand::List {
            owner,
            category,
            offset,
            rows,
        } => {
            let rows = config.listing.page_size(rows);
            for picture in service.list_blogger_pictures(owner, category, offset, rows)? {
                println!("{}", serde_json::to_string(&picture)?);
            }
        }
        GalleryCommand::Show { id, owner } => {
            let picture = match owner {
                Some(owner) => service.get_owned_picture(id, owner)?,
                None => service.get_picture(id)?,
            };
            let picture = picture.with_context(|| format!("Picture {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&picture)?);
        }
        GalleryCommand::Update {
            id,
            category,
            title,
            caption,
            clear_caption,
        } => {
            let bewrite = if clear_caption {
                Some(None)
            } else {
                caption.as_deref().map(Some)
            };
            service
                .update_picture(id, category, bewrite, title.as_deref())
                .with_context(|| format!("Failed to update picture {id}"))?;
        }
        GalleryCommand::Delete { id, keep_file } => {
            service
                .delete_picture(id, !keep_file)
                .with_context(|| format!("Failed to delete picture {id}"))?;
        }
    }
    Ok(())
}

fn validate_config(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Configuration is valid.");
    println!("  Storage: {}", config.storage.base_dir.display());
    println!("  Database: {}", config.database.path.display());
    println!(
        "  Listing: {} rows per page (max {})",
        config.listing.default_rows, config.listing.max_rows
    );

    Ok(())
}
