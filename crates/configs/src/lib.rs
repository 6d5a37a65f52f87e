use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

const REDIS_SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Connection string for the key-value store backing the address records.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 { 5 }
fn default_response_timeout() -> u64 { 5 }

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.into(),
            connect_timeout_secs: default_connect_timeout(),
            response_timeout_secs: default_response_timeout(),
        }
    }
}

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, then environment overrides, then validation.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.redis.normalize_from_env();
        self.redis.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl RedisConfig {
    /// `REDIS_URL` wins over the file; an empty value falls back to the default.
    pub fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("REDIS_URL") {
            if !url.trim().is_empty() {
                self.url = url;
            }
        }
        if self.url.trim().is_empty() {
            self.url = DEFAULT_REDIS_URL.into();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.url.to_lowercase();
        if !REDIS_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            return Err(anyhow!(
                "redis.url must start with one of {}",
                REDIS_SCHEMES.join(", ")
            ));
        }
        if self.connect_timeout_secs == 0 || self.response_timeout_secs == 0 {
            return Err(anyhow!("redis timeouts must be positive seconds"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration { Duration::from_secs(self.connect_timeout_secs) }
    pub fn response_timeout(&self) -> Duration { Duration::from_secs(self.response_timeout_secs) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_redis() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.redis.url, "redis://localhost:6379/0");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.redis.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() -> Result<()> {
        let cfg = parse("[redis]\nurl = \"redis://cache:6380/2\"\n")?;
        assert_eq!(cfg.redis.url, "redis://cache:6380/2");
        assert_eq!(cfg.server.host, "127.0.0.1");

        let cfg = parse("[server]\nport = 9000\n")?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.redis.url, DEFAULT_REDIS_URL);
        Ok(())
    }

    #[test]
    fn loads_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("address_book_cfg_{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\nport = 8000\n\n[redis]\nurl = \"redis://redis:6379/3\"\nresponse_timeout_secs = 2\n")?;
        let cfg = load_from_file(path.to_str().unwrap_or_default())?;
        let _ = std::fs::remove_file(&path);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.redis.url, "redis://redis:6379/3");
        assert_eq!(cfg.redis.response_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.redis.connect_timeout(), Duration::from_secs(5));
        Ok(())
    }

    // env vars are process-wide, so every override case lives in this one test
    #[test]
    fn environment_overrides_file_values() -> Result<()> {
        const VARS: [&str; 4] = ["REDIS_URL", "SERVER_HOST", "SERVER_PORT", "TOKIO_WORKER_THREADS"];
        for var in VARS {
            std::env::remove_var(var);
        }

        let mut cfg = parse("[server]\nport = 9000\n\n[redis]\nurl = \"\"\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.redis.url, DEFAULT_REDIS_URL);
        assert_eq!(cfg.server.port, 9000);

        std::env::set_var("REDIS_URL", "redis://from-env:6390/4");
        std::env::set_var("SERVER_PORT", "8181");
        let mut cfg = parse("[redis]\nurl = \"redis://from-file:6379/1\"\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.redis.url, "redis://from-env:6390/4");
        assert_eq!(cfg.server.port, 8181);

        std::env::set_var("REDIS_URL", "  ");
        let mut cfg = AppConfig::default();
        cfg.redis.url = String::new();
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.redis.url, DEFAULT_REDIS_URL);

        std::env::set_var("REDIS_URL", "memcached://localhost:11211");
        let res = AppConfig::default().normalize_and_validate();

        for var in VARS {
            std::env::remove_var(var);
        }
        assert!(res.is_err());
        Ok(())
    }

    #[test]
    fn rejects_non_redis_scheme() {
        let mut cfg = RedisConfig { url: "postgres://localhost/db".into(), ..Default::default() };
        assert!(cfg.validate().is_err());
        cfg.url = "rediss://user:pw@host:6380/1".into();
        assert!(cfg.validate().is_ok());
        cfg.response_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_port_is_invalid() {
        let mut s = ServerConfig { host: " ".into(), port: 0, worker_threads: None };
        assert!(s.normalize().is_err());
        s.port = 8081;
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
        assert_eq!(s.bind_addr().unwrap().port(), 8081);
    }
}
