use crate::domain::model::Server;
use crate::domain::ports::ConnectionSettings;
use crate::utils::error::{CmisError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Preferences file: the server to talk to and how feeds are requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefsConfig {
    pub server: ServerPrefs,
    #[serde(default)]
    pub display: DisplayPrefs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerPrefs {
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub workspace: String,
}

/// Optional parameters appended to folder feeds when `send_params` is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPrefs {
    pub max_items: i64,
    pub filter: String,
    pub types: String,
    pub order_by: String,
    pub send_params: bool,
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        Self {
            max_items: -1,
            filter: "*".to_string(),
            types: String::new(),
            order_by: String::new(),
            send_params: false,
        }
    }
}

impl DisplayPrefs {
    /// Query pairs that differ from the server defaults, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        if !self.send_params {
            return Vec::new();
        }

        let mut pairs = Vec::new();
        if !self.filter.is_empty() && self.filter != "*" {
            pairs.push(("filter", self.filter.clone()));
        }
        if self.max_items > 0 {
            pairs.push(("maxItems", self.max_items.to_string()));
        }
        if !self.order_by.is_empty() {
            pairs.push(("orderBy", self.order_by.clone()));
        }
        if !self.types.is_empty() {
            pairs.push(("types", self.types.clone()));
        }
        pairs
    }
}

impl PrefsConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CmisError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parses preferences, expanding `${VAR}` from the environment first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CmisError::InvalidConfigValue {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CmisError::config(e.to_string()))
    }

    /// Unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| CmisError::config(format!("invalid substitution pattern: {e}")))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn with_server(mut self, server: &Server) -> Self {
        self.server = ServerPrefs {
            name: server.name.clone(),
            url: server.url.clone(),
            user: server.user.clone(),
            password: server.password.clone(),
            workspace: server.workspace.clone(),
        };
        self
    }
}

impl ConnectionSettings for PrefsConfig {
    fn url(&self) -> &str {
        &self.server.url
    }

    fn user(&self) -> &str {
        &self.server.user
    }

    fn password(&self) -> &str {
        &self.server.password
    }

    fn workspace(&self) -> &str {
        &self.server.workspace
    }
}

impl ConnectionSettings for Server {
    fn url(&self) -> &str {
        &self.url
    }

    fn user(&self) -> &str {
        &self.user
    }

    fn password(&self) -> &str {
        &self.password
    }

    fn workspace(&self) -> &str {
        &self.workspace
    }
}

impl Validate for PrefsConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("server.url", &self.server.url)?;
        validation::validate_max_items("display.max_items", self.display.max_items)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_prefs_with_defaults() {
        let toml_content = r#"
[server]
url = "https://cmis.example.com/alfresco/service/cmis"
user = "admin"
"#;

        let prefs = PrefsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(prefs.url(), "https://cmis.example.com/alfresco/service/cmis");
        assert_eq!(prefs.user(), "admin");
        assert_eq!(prefs.password(), "");
        assert_eq!(prefs.workspace(), "");
        assert_eq!(prefs.display, DisplayPrefs::default());
        assert_eq!(prefs.display.max_items, -1);
        assert_eq!(prefs.display.filter, "*");
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CMIS_TEST_PASSWORD", "s3cret");

        let toml_content = r#"
[server]
url = "http://localhost:8080/cmis"
password = "${CMIS_TEST_PASSWORD}"
workspace = "${CMIS_TEST_UNSET_WORKSPACE}"
"#;

        let prefs = PrefsConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(prefs.password(), "s3cret");
        assert_eq!(prefs.workspace(), "${CMIS_TEST_UNSET_WORKSPACE}");

        std::env::remove_var("CMIS_TEST_PASSWORD");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let prefs = PrefsConfig::from_toml_str("[server]\nurl = \"cmis.example.com\"\n").unwrap();
        assert!(prefs.validate().is_err());

        let prefs = PrefsConfig::from_toml_str(
            "[server]\nurl = \"http://host/cmis\"\n[display]\nmax_items = 0\n",
        )
        .unwrap();
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_missing_server_section_is_a_parse_error() {
        assert!(PrefsConfig::from_toml_str("[display]\nfilter = \"*\"\n").is_err());
    }

    #[test]
    fn test_query_pairs_only_when_enabled() {
        let mut display = DisplayPrefs {
            max_items: 20,
            filter: "cmis:name".to_string(),
            types: String::new(),
            order_by: "cmis:name ASC".to_string(),
            send_params: false,
        };
        assert!(display.query_pairs().is_empty());

        display.send_params = true;
        assert_eq!(
            display.query_pairs(),
            vec![
                ("filter", "cmis:name".to_string()),
                ("maxItems", "20".to_string()),
                ("orderBy", "cmis:name ASC".to_string()),
            ]
        );

        let defaults = DisplayPrefs {
            send_params: true,
            ..DisplayPrefs::default()
        };
        assert!(defaults.query_pairs().is_empty());
    }

    #[test]
    fn test_prefs_from_file_and_back() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nname = \"dev\"\nurl = \"http://dev/cmis\"\n")
            .unwrap();

        let prefs = PrefsConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(prefs.server.name, "dev");

        let rendered = prefs.to_toml_string().unwrap();
        let reparsed = PrefsConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed.url(), "http://dev/cmis");
    }

    #[test]
    fn test_with_server_overrides_connection() {
        let server = Server {
            id: 3,
            name: "prod".to_string(),
            url: "https://prod/cmis".to_string(),
            user: "ops".to_string(),
            password: "pw".to_string(),
            workspace: "main".to_string(),
        };
        let prefs = PrefsConfig::default().with_server(&server);
        assert_eq!(prefs.url(), "https://prod/cmis");
        assert_eq!(prefs.workspace(), "main");
        assert_eq!(prefs.display.filter, "*");
    }
}
