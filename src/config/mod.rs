use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub importer: ImporterConfig,
}

/// Settings for the remote project import endpoint.
#[derive(Debug, Clone, Default)]
pub struct ImporterConfig {
    /// Endpoint URL with embedded `user:password@` credentials.
    pub api_server: Option<String>,
    pub insecure_ssl: bool,
    pub force_ports: bool,
    pub limit_hosts: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("SCANBRIDGE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SCANBRIDGE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            max_upload_bytes: env::var("SCANBRIDGE_MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "52428800".to_string())
                .parse()
                .unwrap_or(52_428_800),
            importer: ImporterConfig {
                api_server: env::var("LAIR_API_SERVER").ok().filter(|s| !s.is_empty()),
                insecure_ssl: env_flag("LAIR_INSECURE_SSL", true),
                force_ports: env_flag("LAIR_FORCE_PORTS", false),
                limit_hosts: env_flag("LAIR_LIMIT_HOSTS", false),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            max_upload_bytes: 52_428_800,
            importer: ImporterConfig {
                insecure_ssl: true,
                ..ImporterConfig::default()
            },
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
