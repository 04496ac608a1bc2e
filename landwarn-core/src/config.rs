use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const CONFIG_PATH_VAR: &str = "LANDWARN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "landwarn.toml";
const ENV_PREFIX: &str = "LANDWARN_";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Alert server root, e.g. `http://10.0.2.2:8000/`. Required, though it
    /// may arrive via override instead of the file.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_role() -> String {
    "user".to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_db_path() -> String {
    "landwarn.db".to_string()
}

fn default_user_agent() -> String {
    concat!("landwarn/", env!("CARGO_PKG_VERSION")).to_string()
}

impl AppConfig {
    /// Loads from the path in `LANDWARN_CONFIG` (default `landwarn.toml` in
    /// the working directory), then applies `LANDWARN_`-prefixed field
    /// overrides from the environment, e.g. `LANDWARN_USER_ID`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let raw = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
            path: path.clone(),
        })?;

        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_overrides(|field| {
            std::env::var(format!("{}{}", ENV_PREFIX, field.to_ascii_uppercase())).ok()
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces fields whose snake_case name `lookup` resolves. Separated
    /// from the environment so tests can feed a plain closure.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("base_url") {
            self.base_url = value;
        }
        if let Some(value) = lookup("user_id") {
            self.user_id = value;
        }
        if let Some(value) = lookup("role") {
            self.role = value;
        }
        if let Some(value) = lookup("poll_interval_secs") {
            self.poll_interval_secs = parse_secs("poll_interval_secs", &value)?;
        }
        if let Some(value) = lookup("request_timeout_secs") {
            self.request_timeout_secs = parse_secs("request_timeout_secs", &value)?;
        }
        if let Some(value) = lookup("db_path") {
            self.db_path = value;
        }
        if let Some(value) = lookup("user_agent") {
            self.user_agent = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "user_id".to_string(),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "base_url".to_string(),
            });
        }

        let parsed = Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: self.base_url.clone(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url.clone(),
            });
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs".to_string(),
                value: self.poll_interval_secs.to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                value: self.request_timeout_secs.to_string(),
            });
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Only signed-in accounts with the end-user role receive alerts;
    /// operator and admin accounts watch the dashboard instead.
    pub fn can_receive_alerts(&self) -> bool {
        !self.user_id.trim().is_empty() && self.role == "user"
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            base_url = "http://10.0.2.2:8000/"
            user_id = "user-42"
        "#
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = AppConfig::from_toml(minimal_toml()).unwrap();

        assert_eq!(config.user_id, "user-42");
        assert_eq!(config.role, "user");
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.db_path, "landwarn.db");
        assert!(config.user_agent.starts_with("landwarn/"));
    }

    #[test]
    fn test_full_config_overrides_defaults() {
        let config = AppConfig::from_toml(
            r#"
                base_url = "https://alerts.example.org"
                user_id = "user-42"
                role = "admin"
                poll_interval_secs = 5
                request_timeout_secs = 10
                db_path = "/var/lib/landwarn/seen.db"
                user_agent = "landwarn-test/0.0"
            "#,
        )
        .unwrap();

        assert_eq!(config.role, "admin");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.db_path, "/var/lib/landwarn/seen.db");
    }

    #[test]
    fn test_overrides_replace_only_resolved_fields() {
        let mut config = AppConfig::from_toml(minimal_toml()).unwrap();
        config
            .apply_overrides(|field| match field {
                "user_id" => Some("user-99".to_string()),
                "poll_interval_secs" => Some("60".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.user_id, "user-99");
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.base_url, "http://10.0.2.2:8000/");
        assert_eq!(config.role, "user");
    }

    #[test]
    fn test_non_numeric_override_rejected() {
        let mut config = AppConfig::from_toml(minimal_toml()).unwrap();
        let result = config
            .apply_overrides(|field| (field == "poll_interval_secs").then(|| "soon".to_string()));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "poll_interval_secs"
        ));
    }

    #[test]
    fn test_absent_required_fields_reported_missing() {
        let result = AppConfig::from_toml(r#"base_url = "http://10.0.2.2:8000/""#);
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { ref field }) if field == "user_id"
        ));

        let result = AppConfig::from_toml(r#"user_id = "user-42""#);
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { ref field }) if field == "base_url"
        ));
    }

    #[test]
    fn test_blank_user_id_rejected() {
        let result = AppConfig::from_toml(
            r#"
                base_url = "http://10.0.2.2:8000/"
                user_id = "   "
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { ref field }) if field == "user_id"
        ));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        for bad in ["not a url", "ftp://alerts.example.org"] {
            let result = AppConfig::from_toml(&format!(
                r#"
                    base_url = "{bad}"
                    user_id = "user-42"
                "#
            ));
            assert!(matches!(
                result,
                Err(ConfigError::InvalidValue { ref field, .. }) if field == "base_url"
            ));
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = AppConfig::from_toml(
            r#"
                base_url = "http://10.0.2.2:8000/"
                user_id = "user-42"
                poll_interval_secs = 0
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "poll_interval_secs"
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = AppConfig::from_toml("base_url = [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_reported_with_path() {
        let result = AppConfig::from_file("/nonexistent/landwarn.toml");
        assert!(matches!(
            result,
            Err(ConfigError::FileNotFound { ref path }) if path == "/nonexistent/landwarn.toml"
        ));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_nanos();
        let path = std::env::temp_dir().join(format!("landwarn_config_{}.toml", nanos));
        std::fs::write(&path, minimal_toml())?;

        let config = AppConfig::from_file(path.to_str().unwrap_or_default())?;
        assert_eq!(config.user_id, "user-42");

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn test_alert_eligibility_follows_role() {
        let mut config = AppConfig::from_toml(minimal_toml()).unwrap();
        assert!(config.can_receive_alerts());

        config.role = "admin".to_string();
        assert!(!config.can_receive_alerts());
    }
}
