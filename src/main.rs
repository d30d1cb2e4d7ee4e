use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use newsdesk::api::NewsClient;
use newsdesk::app::{App, AppEvent, Services};
use newsdesk::auth::AuthGate;
use newsdesk::config::Config;
use newsdesk::pipeline::Retriever;
use newsdesk::platform::terminal::{
    BrowserShare, HttpDownloader, NoBiometrics, PathPicker, StatusNotifier,
};
use newsdesk::platform::DocumentPicker;
use newsdesk::storage::{Database, DatabaseError, FavoritesStore, KeyValueStore};
use newsdesk::ui;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdesk"))
}

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Terminal news reader")]
struct Args {
    /// Reset database (delete favorites and login state)
    #[arg(long)]
    reset_db: bool,

    /// Clear the saved login before starting
    #[arg(long)]
    logout: bool,

    /// Merge favorites from a JSON file, then exit
    #[arg(long, value_name = "FILE")]
    import_favorites: Option<PathBuf>,

    /// Write favorites to a JSON file, then exit
    #[arg(long, value_name = "FILE")]
    export_favorites: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // Favorites and the login flag are private to the user
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config = Config::load(&config_dir.join("config.toml")).context("Failed to load config")?;
    let db_path = config_dir.join("newsdesk.db");

    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of newsdesk appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };
    let kv: Arc<dyn KeyValueStore> = Arc::new(db);
    let favorites = FavoritesStore::new(kv.clone());

    if let Some(path) = &args.export_favorites {
        let count = favorites
            .export_to(path)
            .await
            .context("Failed to export favorites")?;
        println!("Exported {} favorites to {}", count, path.display());
        return Ok(());
    }

    let picker = PathPicker::new(args.import_favorites.clone());
    if args.import_favorites.is_some() {
        let path = picker
            .pick()
            .await
            .context("Failed to open import file")?
            .ok_or_else(|| anyhow::anyhow!("No import file given"))?;
        let added = favorites
            .import_from(&path)
            .await
            .context("Failed to import favorites")?;
        println!("Imported {} new favorites from {}", added, path.display());
        return Ok(());
    }

    let biometrics = Arc::new(NoBiometrics);
    let auth = AuthGate::new(kv, biometrics.clone(), biometrics);
    if args.logout && !auth.logout().await {
        eprintln!("Warning: could not clear the saved login");
    }

    let client = NewsClient::new(config.client_options()).context("Failed to create news client")?;
    if !client.has_api_key() {
        eprintln!(
            "Warning: no API key configured. Set {} or api_key in {}",
            newsdesk::config::API_KEY_ENV,
            config_dir.join("config.toml").display()
        );
    }

    let download_dir = config.download_dir_or(&config_dir);
    let downloader =
        HttpDownloader::new(download_dir).context("Failed to prepare download directory")?;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let services = Services {
        retriever: Retriever::new(Arc::new(client)),
        favorites,
        auth,
        notifier: Arc::new(StatusNotifier::new(event_tx.clone())),
        downloader: Arc::new(downloader),
        share: Arc::new(BrowserShare),
        picker: Arc::new(picker),
        reminder_delay: config.reminder_delay(),
    };

    let mut app = App::new(services, config.default_filters(), config.page_size);
    for problem in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(problem = %problem, "Ignoring keybinding override");
    }
    app.set_theme(config.theme);
    app.biometrics = app.services.auth.check_biometric_availability().await;

    let auth_state = app.services.auth.state().await;
    if auth_state.is_authenticated {
        app.auth = auth_state;
    }

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
