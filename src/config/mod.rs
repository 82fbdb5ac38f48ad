// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DownloadMediaType, HealthConfig, HttpConfig, LoggingConfig, Mode, PerformanceConfig,
    ProxyConfig, ServerConfig, StorageConfig,
};

/// Environment variable prefix, e.g. `FILEBRIDGE_STORAGE__ROOT_DIR`
pub const ENV_PREFIX: &str = "FILEBRIDGE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("mode", "file_server")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("storage.root_dir", "/home/files/upload")?
            .set_default("proxy.upstream_base_url", "http://127.0.0.1:8081/api/files")?
            .set_default("proxy.download_media_type", "mapped")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "filebridge")?
            .set_default("http.enable_cors", true)?
            .set_default("http.allowed_origin", "*")?
            .build()?;

        settings.try_deserialize()
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
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(cfg.mode, Mode::FileServer);
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.storage.root_dir, "/home/files/upload");
        assert_eq!(cfg.proxy.download_media_type, DownloadMediaType::Mapped);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.health.enabled);
        assert_eq!(cfg.http.cors_origin(), Some("*"));
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8081);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        fs::write(
            &path,
            r#"
mode = "web_proxy"

[server]
port = 8080

[proxy]
upstream_base_url = "http://file-server:8081/api/files"
download_media_type = "octet_stream"

[http]
allowed_origin = "http://localhost:4200"
"#,
        )
        .unwrap();

        let stem = dir.path().join("proxy");
        let cfg = Config::load_from(&stem.to_string_lossy()).unwrap();
        assert_eq!(cfg.mode, Mode::WebProxy);
        assert_eq!(cfg.mode.route_prefix(), "/api/web/files");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.proxy.upstream_base_url, "http://file-server:8081/api/files");
        assert_eq!(cfg.proxy.download_media_type, DownloadMediaType::OctetStream);
        assert_eq!(cfg.http.cors_origin(), Some("http://localhost:4200"));
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        cfg.server.host = "not an ip".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
