use std::env;
use std::path::PathBuf;

/// Settings read from the environment (and `.env`, if present).
///
/// Command-line flags override these in `Args`.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: Option<String>,
    pub catalog: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_url = non_empty_var("QUIZ_DB_URL");
        let catalog = non_empty_var("QUIZ_CATALOG").map(PathBuf::from);
        let rust_log = non_empty_var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Self {
            db_url,
            catalog,
            rust_log,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
