use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the platform.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub github: ProviderConfig,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let github = ProviderConfig {
            api_base_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| ProviderConfig::DEFAULT_API_URL.to_string()),
            user_agent: env::var("GITHUB_USER_AGENT")
                .unwrap_or_else(|_| ProviderConfig::DEFAULT_USER_AGENT.to_string()),
            per_page: numeric_var("GITHUB_PER_PAGE", 100)?,
            max_pages: numeric_var("GITHUB_MAX_PAGES", 10)?,
            timeout_secs: numeric_var("GITHUB_TIMEOUT_SECS", 15)?,
        };

        let notifications = NotificationConfig {
            from_address: env::var("NOTIFY_FROM_EMAIL")
                .unwrap_or_else(|_| NotificationConfig::DEFAULT_FROM_ADDRESS.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| NotificationConfig::DEFAULT_FRONTEND_URL.to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            github,
            notifications,
        })
    }
}

fn numeric_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var: name }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the external code-hosting provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_base_url: String,
    pub user_agent: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";
    pub const DEFAULT_USER_AGENT: &'static str = "CareerLaunch-App";

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_URL.to_string(),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            per_page: 100,
            max_pages: 10,
            timeout_secs: 15,
        }
    }
}

/// Addressing used when rendering outbound notifications.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub from_address: String,
    pub frontend_url: String,
}

impl NotificationConfig {
    pub const DEFAULT_FROM_ADDRESS: &'static str = "no-reply@careerlaunch.app";
    pub const DEFAULT_FRONTEND_URL: &'static str = "http://localhost:5173";
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            from_address: Self::DEFAULT_FROM_ADDRESS.to_string(),
            frontend_url: Self::DEFAULT_FRONTEND_URL.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
