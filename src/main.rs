use clap::Parser;
use cmis_browser::adapters::favorites::{FavoriteRepository, SqliteFavoriteRepository};
use cmis_browser::adapters::servers::{ServerRepository, SqliteServerRepository};
use cmis_browser::adapters::open_db;
use cmis_browser::config::toml_config::ServerPrefs;
use cmis_browser::config::{Command, FavoriteCommand, ServerCommand, PREFS_SERVER_ID};
use cmis_browser::core::browser::OpenedDocument;
use cmis_browser::domain::model::{DocumentDetails, SharePayload};
use cmis_browser::utils::error::ErrorSeverity;
use cmis_browser::utils::{logger, validation::Validate};
use cmis_browser::{
    CliConfig, CmisBrowser, CmisError, CmisItem, CmisRepository, Favorite, LocalStorage,
    PrefsConfig, Result, Server,
};
use rusqlite::Connection;

type Browser = CmisBrowser<LocalStorage, CmisRepository>;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.verbose {
        tracing::debug!(
            "Command '{}' (config {}, database {}, cache {})",
            config.command.name(),
            config.config_path().display(),
            config.database_path().display(),
            config.cache_path().display()
        );
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: &CliConfig) -> Result<()> {
    if let Command::Init {
        url,
        user,
        password,
        workspace,
        name,
        force,
    } = &config.command
    {
        return init_prefs(config, url, user, password, workspace, name, *force);
    }

    let conn = open_db(config.database_path())?;

    if !config.needs_connection() {
        return run_offline(config, &conn);
    }

    let (server_id, prefs) = resolve_prefs(config, &conn)?;
    let repository = CmisRepository::connect(&prefs, prefs.display.clone()).await?;
    let browser = CmisBrowser::new(LocalStorage::new(config.cache_path()), repository);

    match &config.command {
        Command::Browse { feed } => {
            let items = browser.browse(feed.as_deref()).await?;
            print_items(&browser, &items, config.json)
        }
        Command::Search { query_type, text } => {
            let items = browser.search(*query_type, &text.join(" ")).await?;
            print_items(&browser, &items, config.json)
        }
        Command::Open { entry, feed } => {
            let item = browser.find(feed.as_deref(), entry).await?;
            open_item(&browser, &item, config.json).await
        }
        Command::Share { entry, feed } => {
            let item = browser.find(feed.as_deref(), entry).await?;
            let payload = browser.share(&item).await?;
            print_share(&payload, config.json)
        }
        Command::Details { entry, feed } => {
            let item = browser.find(feed.as_deref(), entry).await?;
            print_details(&browser.details(&item), config.json)
        }
        Command::Favorite {
            action: FavoriteCommand::Add { entry, feed },
        } => {
            let item = browser.find(feed.as_deref(), entry).await?;
            let favorites = SqliteFavoriteRepository::new(&conn);
            let id = browser.add_favorite(&favorites, server_id, &item)?;
            println!("⭐ Favorite added: {} (#{})", item.title, id);
            Ok(())
        }
        Command::Favorite {
            action: FavoriteCommand::Open { id },
        } => {
            let favorite = SqliteFavoriteRepository::new(&conn).get(*id)?;
            if favorite.is_folder() {
                let items = browser.browse_folder(&favorite.url).await?;
                print_items(&browser, &items, config.json)
            } else {
                let item = browser.entry(&favorite.url).await?;
                open_item(&browser, &item, config.json).await
            }
        }
        _ => run_offline(config, &conn),
    }
}

fn run_offline(config: &CliConfig, conn: &Connection) -> Result<()> {
    match &config.command {
        Command::Favorite { action } => {
            let favorites = SqliteFavoriteRepository::new(conn);
            match action {
                FavoriteCommand::List { all } => {
                    let list = if *all {
                        favorites.list_all()?
                    } else {
                        favorites.list_for_server(config.server.unwrap_or(PREFS_SERVER_ID))?
                    };
                    print_favorites(&list, config.json)
                }
                FavoriteCommand::Remove { id } => {
                    favorites.delete(*id)?;
                    println!("🗑️  Favorite #{} removed", id);
                    Ok(())
                }
                _ => Err(CmisError::config("this favorite command needs a server connection")),
            }
        }
        Command::Server { action } => {
            let servers = SqliteServerRepository::new(conn);
            match action {
                ServerCommand::Add {
                    name,
                    url,
                    user,
                    password,
                    workspace,
                } => {
                    let id = servers.insert(&Server {
                        id: 0,
                        name: name.clone(),
                        url: url.clone(),
                        user: user.clone(),
                        password: password.clone(),
                        workspace: workspace.clone(),
                    })?;
                    println!("✅ Server '{}' stored as #{}", name, id);
                    Ok(())
                }
                ServerCommand::List => print_servers(&servers.list()?, config.json),
                ServerCommand::Remove { id } => {
                    servers.delete(*id)?;
                    println!("🗑️  Server #{} removed", id);
                    Ok(())
                }
            }
        }
        _ => Err(CmisError::config("this command needs a server connection")),
    }
}

/// Preferences for the selected server; stored profiles replace the `[server]` section.
fn resolve_prefs(config: &CliConfig, conn: &Connection) -> Result<(i64, PrefsConfig)> {
    let path = config.config_path();

    match config.server {
        Some(id) => {
            let server = SqliteServerRepository::new(conn).get(id)?;
            let prefs = if path.exists() {
                PrefsConfig::from_file(&path)?
            } else {
                PrefsConfig::default()
            };
            let prefs = prefs.with_server(&server);
            prefs.validate()?;
            Ok((id, prefs))
        }
        None => {
            if !path.exists() {
                return Err(CmisError::config(format!(
                    "no preferences at {}; run `cmis-browser init --url <service document>` or pass --server",
                    path.display()
                )));
            }
            tracing::debug!("Loading preferences from {}", path.display());
            let prefs = PrefsConfig::from_file(&path)?;
            prefs.validate()?;
            Ok((PREFS_SERVER_ID, prefs))
        }
    }
}

fn init_prefs(
    config: &CliConfig,
    url: &str,
    user: &str,
    password: &str,
    workspace: &str,
    name: &str,
    force: bool,
) -> Result<()> {
    let path = config.config_path();
    if path.exists() && !force {
        return Err(CmisError::config(format!(
            "{} already exists; use --force to overwrite it",
            path.display()
        )));
    }

    let prefs = PrefsConfig {
        server: ServerPrefs {
            name: name.to_string(),
            url: url.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            workspace: workspace.to_string(),
        },
        display: Default::default(),
    };
    prefs.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, prefs.to_toml_string()?)?;

    println!("✅ Preferences written to {}", path.display());
    Ok(())
}

async fn open_item(browser: &Browser, item: &CmisItem, json: bool) -> Result<()> {
    if item.has_children() {
        let items = browser.browse_children(item).await?;
        return print_items(browser, &items, json);
    }

    let opened = browser.open(item).await?;
    print_opened(&opened, json)
}

fn print_items(browser: &Browser, items: &[CmisItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("(empty)");
    }

    for item in items {
        let modified = item
            .modification_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        match browser.source().children_url(item) {
            Some(children) => {
                println!("📁 {}  {}", item.title, modified);
                println!("     {}", children);
            }
            None => {
                println!("📄 {}  [{}]  {}  {}", item.title, item.mime_type, item.author, modified);
                if !item.self_url.is_empty() {
                    println!("     {}", item.self_url);
                }
            }
        }
    }
    Ok(())
}

fn print_opened(opened: &OpenedDocument, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(opened)?);
    } else {
        let origin = if opened.downloaded { "downloaded" } else { "cached" };
        println!("📂 {} ({}, {})", opened.path.display(), opened.mime_type, origin);
    }
    Ok(())
}

fn print_share(payload: &SharePayload, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(payload)?);
        return Ok(());
    }

    println!("Subject: {}", payload.subject);
    println!("Text:    {}", payload.text);
    println!("Type:    {}", payload.mime_type);
    if let Some(stream) = &payload.stream {
        println!("Stream:  {}", stream.display());
    }
    Ok(())
}

fn print_details(details: &DocumentDetails, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(details)?);
        return Ok(());
    }

    println!("{}", details.title);
    println!("  MIME type:    {}", details.mime_type);
    println!("  Object type:  {}", details.object_type_id);
    println!("  Base type:    {}", details.base_type_id);
    println!("  Content URL:  {}", details.content_url);
    println!("  Self URL:     {}", details.self_url);
    if let Some(length) = details.content_stream_length {
        println!("  Size:         {} bytes", length);
    }
    for property in &details.properties {
        println!("  {:<32} {}", property.display_name, property.value);
    }
    Ok(())
}

fn print_favorites(favorites: &[Favorite], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(favorites)?);
        return Ok(());
    }

    for favorite in favorites {
        let icon = if favorite.is_folder() { "📁" } else { "📄" };
        println!(
            "#{:<4} {} {}  (server {})",
            favorite.id, icon, favorite.title, favorite.server_id
        );
        println!("      {}", favorite.url);
    }
    Ok(())
}

fn print_servers(servers: &[Server], json: bool) -> Result<()> {
    if json {
        let redacted: Vec<Server> = servers
            .iter()
            .cloned()
            .map(|mut s| {
                s.password.clear();
                s
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&redacted)?);
        return Ok(());
    }

    for server in servers {
        println!("#{:<4} {}  {}  user={}", server.id, server.name, server.url, server.user);
    }
    Ok(())
}
