pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command, FavoriteCommand, ServerCommand};

/// Server id used for favorites of the server configured in the preferences file.
pub const PREFS_SERVER_ID: i64 = 0;

const APP_DIR: &str = "cmis-browser";

pub fn default_config_path() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_DIR)
        .join("prefs.toml")
}

pub fn default_database_path() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_DIR)
        .join("cmis.db")
}

pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(feature = "cli")]
mod args {
    use crate::domain::model::QueryType;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::{Parser, Subcommand};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "cmis-browser")]
    #[command(about = "Browse, search and bookmark CMIS repositories over AtomPub")]
    pub struct CliConfig {
        /// Preferences file with the server connection
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Use a stored server profile instead of the preferences file
        #[arg(long)]
        pub server: Option<i64>,

        /// SQLite database holding favorites and server profiles
        #[arg(long)]
        pub database: Option<PathBuf>,

        /// Directory downloaded documents are cached in
        #[arg(long)]
        pub cache_dir: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        pub json: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        /// Emit logs as JSON lines
        #[arg(long)]
        pub log_json: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Write a preferences file
        Init {
            #[arg(long)]
            url: String,
            #[arg(long, default_value = "")]
            user: String,
            #[arg(long, default_value = "")]
            password: String,
            #[arg(long, default_value = "")]
            workspace: String,
            #[arg(long, default_value = "")]
            name: String,
            /// Overwrite an existing file
            #[arg(long)]
            force: bool,
        },
        /// List a feed (the root collection by default)
        Browse { feed: Option<String> },
        /// Search documents
        Search {
            /// title, fulltext or cmis
            #[arg(long = "type", default_value = "fulltext")]
            query_type: QueryType,
            #[arg(required = true, num_args = 1..)]
            text: Vec<String>,
        },
        /// Download a document into the cache
        Open {
            /// Entry id or title
            entry: String,
            #[arg(long)]
            feed: Option<String>,
        },
        /// Print what would be handed to a share target
        Share {
            entry: String,
            #[arg(long)]
            feed: Option<String>,
        },
        /// Show the properties of an entry
        Details {
            entry: String,
            #[arg(long)]
            feed: Option<String>,
        },
        Favorite {
            #[command(subcommand)]
            action: FavoriteCommand,
        },
        Server {
            #[command(subcommand)]
            action: ServerCommand,
        },
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum FavoriteCommand {
        Add {
            entry: String,
            #[arg(long)]
            feed: Option<String>,
        },
        List {
            /// Include favorites of every server
            #[arg(long)]
            all: bool,
        },
        /// Browse a favorite folder or open a favorite document
        Open { id: i64 },
        Remove { id: i64 },
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum ServerCommand {
        Add {
            name: String,
            url: String,
            #[arg(long, default_value = "")]
            user: String,
            #[arg(long, default_value = "")]
            password: String,
            #[arg(long, default_value = "")]
            workspace: String,
        },
        List,
        Remove { id: i64 },
    }

    impl Command {
        /// Subcommand path for logs; arguments are left out since some carry passwords.
        pub fn name(&self) -> &'static str {
            match self {
                Command::Init { .. } => "init",
                Command::Browse { .. } => "browse",
                Command::Search { .. } => "search",
                Command::Open { .. } => "open",
                Command::Share { .. } => "share",
                Command::Details { .. } => "details",
                Command::Favorite { action } => match action {
                    FavoriteCommand::Add { .. } => "favorite add",
                    FavoriteCommand::List { .. } => "favorite list",
                    FavoriteCommand::Open { .. } => "favorite open",
                    FavoriteCommand::Remove { .. } => "favorite remove",
                },
                Command::Server { action } => match action {
                    ServerCommand::Add { .. } => "server add",
                    ServerCommand::List => "server list",
                    ServerCommand::Remove { .. } => "server remove",
                },
            }
        }
    }

    impl CliConfig {
        pub fn config_path(&self) -> PathBuf {
            self.config.clone().unwrap_or_else(super::default_config_path)
        }

        pub fn database_path(&self) -> PathBuf {
            self.database.clone().unwrap_or_else(super::default_database_path)
        }

        pub fn cache_path(&self) -> PathBuf {
            self.cache_dir.clone().unwrap_or_else(super::default_cache_dir)
        }

        /// Whether the command talks to a CMIS server at all.
        pub fn needs_connection(&self) -> bool {
            match &self.command {
                Command::Init { .. } | Command::Server { .. } => false,
                Command::Favorite { action } => {
                    matches!(action, FavoriteCommand::Add { .. } | FavoriteCommand::Open { .. })
                }
                _ => true,
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("config", &self.config_path().to_string_lossy())?;
            validation::validate_path("database", &self.database_path().to_string_lossy())?;
            validation::validate_path("cache_dir", &self.cache_path().to_string_lossy())?;

            match &self.command {
                Command::Init { url, .. } => validation::validate_url("url", url),
                Command::Search { text, .. } => validation::validate_not_blank("text", &text.join(" ")),
                Command::Server {
                    action: ServerCommand::Add { name, url, .. },
                } => {
                    validation::validate_not_blank("name", name)?;
                    validation::validate_url("url", url)
                }
                _ => Ok(()),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_search() {
            let cli = CliConfig::parse_from([
                "cmis-browser",
                "search",
                "--type",
                "title",
                "annual",
                "report",
            ]);
            match cli.command {
                Command::Search { query_type, text } => {
                    assert_eq!(query_type, QueryType::Title);
                    assert_eq!(text, vec!["annual", "report"]);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn test_search_defaults_to_fulltext() {
            let cli = CliConfig::parse_from(["cmis-browser", "search", "budget"]);
            assert!(matches!(
                cli.command,
                Command::Search {
                    query_type: QueryType::Fulltext,
                    ..
                }
            ));
            assert!(cli.needs_connection());
        }

        #[test]
        fn test_global_options_and_paths() {
            let cli = CliConfig::parse_from([
                "cmis-browser",
                "--database",
                "/tmp/x.db",
                "--server",
                "2",
                "favorite",
                "list",
                "--all",
            ]);
            assert_eq!(cli.database_path(), PathBuf::from("/tmp/x.db"));
            assert_eq!(cli.server, Some(2));
            assert!(!cli.needs_connection());
            assert!(cli.validate().is_ok());
        }

        #[test]
        fn test_command_name_omits_arguments() {
            let cli = CliConfig::parse_from([
                "cmis-browser",
                "server",
                "add",
                "prod",
                "http://host/cmis",
                "--password",
                "hunter2",
            ]);
            assert_eq!(cli.command.name(), "server add");
            assert!(!cli.command.name().contains("hunter2"));
        }

        #[test]
        fn test_server_add_validation() {
            let cli = CliConfig::parse_from(["cmis-browser", "server", "add", "dev", "not-a-url"]);
            assert!(cli.validate().is_err());
        }

        #[test]
        fn test_invalid_query_type_is_rejected() {
            let parsed = CliConfig::try_parse_from(["cmis-browser", "search", "--type", "regex", "x"]);
            assert!(parsed.is_err());
        }
    }
}
