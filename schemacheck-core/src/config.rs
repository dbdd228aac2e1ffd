//! Listener configuration: env HOST/PORT, overridable by the caller (CLI flags win over env).

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Reads HOST and PORT; unset or unparsable values fall back to the defaults.
    pub fn from_env(default_host: &str, default_port: u16) -> Self {
        Self::from_lookup(default_host, default_port, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        default_host: &str,
        default_port: u16,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let host = lookup("HOST").unwrap_or_else(|| default_host.to_string());
        let port = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_port);
        Self { host, port }
    }

    /// Apply explicit overrides (e.g. `--host` / `--port`).
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 8080)
    }
}
