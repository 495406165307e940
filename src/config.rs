use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    // Site database
    pub database_path: String,
    pub busy_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/site.db".to_string()),
            busy_timeout_ms: std::env::var("SQLITE_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        })
    }
}
