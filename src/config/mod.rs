// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, GalleryConfig, HealthConfig, ImmichConfig, LoggingConfig, PerformanceConfig,
    ServerConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file (if
    /// present), then `RELAY_*` environment variables with `__` between
    /// section and key (e.g. `RELAY_IMMICH__URL`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.backlog", 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("immich.url", "http://immich-server:2283")?
            .set_default("immich.request_timeout", 30)?
            .set_default("gallery.public_scheme", "https")?
            .set_default("gallery.title", "Shared gallery")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !self.immich.url.starts_with("http://") {
            return Err(config::ConfigError::Message(format!(
                "immich.url must be a plain http:// URL, got '{}'",
                self.immich.url
            )));
        }
        if !matches!(self.gallery.public_scheme.as_str(), "http" | "https") {
            return Err(config::ConfigError::Message(format!(
                "gallery.public_scheme must be http or https, got '{}'",
                self.gallery.public_scheme
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(name: &str, contents: &str) -> String {
        let dir = std::env::temp_dir().join(format!("gallery-relay-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.toml"));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path.with_extension("").to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.workers, None);
        assert_eq!(config.logging.access_log_format, "combined");
        assert!(config.performance.keep_alive);
        assert_eq!(config.immich.request_timeout, 30);
        assert_eq!(config.gallery.public_scheme, "https");
        assert!(config.health.enabled);
        assert_eq!(config.health.liveness_path, "/healthz");
        assert_eq!(config.get_socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_config(
            "overrides",
            r#"
[server]
port = 8080
workers = 2

[immich]
url = "http://10.0.0.5:2283"

[health]
enabled = false
"#,
        );
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.workers, Some(2));
        assert_eq!(config.immich.url, "http://10.0.0.5:2283");
        assert!(!config.health.enabled);
        assert_eq!(config.health.readiness_path, "/readyz");
    }

    #[test]
    fn test_https_upstream_rejected() {
        let path = write_config(
            "https-upstream",
            r#"
[immich]
url = "https://immich.example.com"
"#,
        );
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_invalid_public_scheme_rejected() {
        let path = write_config(
            "bad-scheme",
            r#"
[gallery]
public_scheme = "ftp"
"#,
        );
        assert!(Config::load_from(&path).is_err());
    }
}
