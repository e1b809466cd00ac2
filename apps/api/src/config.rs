use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::scoring::FeatureMode;
use crate::search::handlers::MAX_PER_PAGE;

/// Which classifier backend scores candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Heuristic,
    /// No classifier; ranking and prediction answer 503.
    Disabled,
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" => Ok(ClassifierKind::Heuristic),
            "none" | "disabled" => Ok(ClassifierKind::Disabled),
            other => Err(format!("unknown classifier '{other}' (expected heuristic|none)")),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassifierKind::Heuristic => "heuristic",
            ClassifierKind::Disabled => "none",
        })
    }
}

/// Application configuration loaded from environment variables.
/// Only malformed values are errors; everything has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary store. Unset means the snapshot serves every read.
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub feature_mode: FeatureMode,
    pub classifier: ClassifierKind,
    pub per_page: i64,
    pub db_acquire_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            data_dir: PathBuf::from("data"),
            port: 8080,
            rust_log: "info".to_string(),
            feature_mode: FeatureMode::Categorical,
            classifier: ClassifierKind::Heuristic,
            per_page: 10,
            db_acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let per_page = parse_or("PER_PAGE", lookup("PER_PAGE"), defaults.per_page)?;
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(anyhow!("PER_PAGE must be between 1 and {MAX_PER_PAGE}"));
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            port: parse_or("PORT", lookup("PORT"), defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            feature_mode: parse_or("FEATURE_MODE", lookup("FEATURE_MODE"), defaults.feature_mode)?,
            classifier: parse_or("CLASSIFIER", lookup("CLASSIFIER"), defaults.classifier)?,
            per_page,
            db_acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                lookup("DB_ACQUIRE_TIMEOUT_SECS"),
                defaults.db_acquire_timeout.as_secs(),
            )?),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.feature_mode, FeatureMode::Categorical);
        assert_eq!(config.classifier, ClassifierKind::Heuristic);
        assert_eq!(config.per_page, 10);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_reads_every_variable() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/talent"),
            ("DATA_DIR", "/srv/snapshot"),
            ("PORT", "9000"),
            ("FEATURE_MODE", "ranking"),
            ("CLASSIFIER", "none"),
            ("PER_PAGE", "25"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "2"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/talent"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/snapshot"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.feature_mode, FeatureMode::Ranking);
        assert_eq!(config.classifier, ClassifierKind::Disabled);
        assert_eq!(config.per_page, 25);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_blank_database_url_means_no_primary() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("FEATURE_MODE", "fuzzy")]).is_err());
        assert!(config_from(&[("CLASSIFIER", "xgboost")]).is_err());
        assert!(config_from(&[("PER_PAGE", "0")]).is_err());
        assert!(config_from(&[("PER_PAGE", "200")]).is_err());
        assert_eq!(config_from(&[("PER_PAGE", "100")]).unwrap().per_page, MAX_PER_PAGE);
    }
}
