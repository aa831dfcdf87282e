use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
/// Ten years. Longer lifetimes are clamped.
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    pub paths: DataPaths,
    pub extract: ExtractConfig,
}

/// The single credential pair accepted by `POST /auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// Token lifetime in seconds. Set via TOKEN_EXPIRY_SECONDS. Default: 3600.
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub file_cosing: PathBuf,
    pub file_sephora: PathBuf,
    pub file_skincare: PathBuf,
    pub open_beauty_facts_url: String,
    pub api_max_pages: u32,
    pub scrape_url: String,
    pub http_timeout_secs: u64,
}

impl AuthConfig {
    pub fn uses_default_credentials(&self) -> bool {
        self.username == DEFAULT_USERNAME && self.password == DEFAULT_PASSWORD
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let cfg = from_lookup(|key| std::env::var(key).ok());

    if cfg.auth.uses_default_credentials() {
        let env_mode = std::env::var("APP_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "API_USERNAME/API_PASSWORD are still the default pair. \
                 Set real credentials before running in production."
            );
        }
        tracing::warn!("API_USERNAME/API_PASSWORD not set, using the default development pair");
    }

    Ok(cfg)
}

/// Builds the configuration from an arbitrary key lookup so tests never touch
/// the process environment.
pub fn from_lookup<F>(get: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let raw_dir: PathBuf = get("DATA_RAW_DIR")
        .unwrap_or_else(|| "data/raw".into())
        .into();

    let database_url = get("DATABASE_URL").unwrap_or_else(|| {
        let user = get("DB_USER").unwrap_or_else(|| "postgres".into());
        let password = get("DB_PASSWORD").unwrap_or_default();
        let host = get("DB_HOST").unwrap_or_else(|| "localhost".into());
        let port = get("DB_PORT").unwrap_or_else(|| "5432".into());
        let name = get("DB_NAME").unwrap_or_else(|| "cosmetics_regulatory_db".into());
        if password.is_empty() {
            format!("postgres://{}@{}:{}/{}", user, host, port, name)
        } else {
            format!(
                "postgres://{}:{}@{}:{}/{}",
                user,
                urlencoding::encode(&password),
                host,
                port,
                name
            )
        }
    });

    Config {
        port: parse_or(&get, "API_PORT", 5000),
        database_url,
        db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5),
        auth: AuthConfig {
            username: get("API_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.into()),
            password: get("API_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.into()),
            token_ttl_secs: token_ttl(&get),
        },
        paths: DataPaths {
            processed_dir: get("DATA_PROCESSED_DIR")
                .unwrap_or_else(|| "data/processed".into())
                .into(),
            log_dir: get("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.into()).into(),
            raw_dir: raw_dir.clone(),
        },
        extract: ExtractConfig {
            file_cosing: get("FILE_COSING")
                .map(PathBuf::from)
                .unwrap_or_else(|| raw_dir.join("COSING_Annex_III_v2.xls")),
            file_sephora: get("FILE_SEPHORA")
                .map(PathBuf::from)
                .unwrap_or_else(|| raw_dir.join("product_info.csv")),
            file_skincare: get("FILE_SKINCARE")
                .map(PathBuf::from)
                .unwrap_or_else(|| raw_dir.join("cosmetics.csv")),
            open_beauty_facts_url: get("OPEN_BEAUTY_FACTS_URL")
                .unwrap_or_else(|| "https://world.openfoodfacts.org/cgi/search.pl".into()),
            api_max_pages: parse_or(&get, "API_MAX_PAGES", 3),
            scrape_url: get("SCRAPE_URL").unwrap_or_else(|| {
                "https://en.wikipedia.org/wiki/Ingredients_of_cosmetics".into()
            }),
            http_timeout_secs: parse_or(&get, "HTTP_TIMEOUT_SECONDS", 30),
        },
    }
}

fn token_ttl<F>(get: &F) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let ttl = parse_or(get, "TOKEN_EXPIRY_SECONDS", DEFAULT_TOKEN_TTL_SECS);
    if ttl > MAX_TOKEN_TTL_SECS {
        tracing::warn!(
            "TOKEN_EXPIRY_SECONDS={} is too large, using {}",
            ttl,
            MAX_TOKEN_TTL_SECS
        );
        return MAX_TOKEN_TTL_SECS;
    }
    ttl
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has unparsable value '{}', using {}", key, raw, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = from_lookup(lookup(&[]));
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert!(cfg.auth.uses_default_credentials());
        assert_eq!(
            cfg.database_url,
            "postgres://postgres@localhost:5432/cosmetics_regulatory_db"
        );
        assert_eq!(cfg.extract.api_max_pages, 3);
        assert_eq!(cfg.extract.file_sephora, PathBuf::from("data/raw/product_info.csv"));
    }

    #[test]
    fn test_database_url_from_parts_encodes_password() {
        let cfg = from_lookup(lookup(&[
            ("DB_USER", "etl"),
            ("DB_PASSWORD", "p@ss/word"),
            ("DB_HOST", "db"),
            ("DB_NAME", "catalog"),
        ]));
        assert_eq!(cfg.database_url, "postgres://etl:p%40ss%2Fword@db:5432/catalog");
    }

    #[test]
    fn test_database_url_wins_over_parts() {
        let cfg = from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("DB_HOST", "ignored"),
        ]));
        assert_eq!(cfg.database_url, "postgres://x/y");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let cfg = from_lookup(lookup(&[
            ("TOKEN_EXPIRY_SECONDS", "one hour"),
            ("API_PORT", " 8080 "),
        ]));
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn test_token_ttl_is_clamped() {
        let cfg = from_lookup(lookup(&[("TOKEN_EXPIRY_SECONDS", "10000000000000")]));
        assert_eq!(cfg.auth.token_ttl_secs, MAX_TOKEN_TTL_SECS);

        let cfg = from_lookup(lookup(&[("TOKEN_EXPIRY_SECONDS", "18446744073709551615")]));
        assert_eq!(cfg.auth.token_ttl_secs, MAX_TOKEN_TTL_SECS);

        let cfg = from_lookup(lookup(&[("TOKEN_EXPIRY_SECONDS", "0")]));
        assert_eq!(cfg.auth.token_ttl_secs, 0);
    }

    #[test]
    fn test_file_paths_follow_raw_dir() {
        let cfg = from_lookup(lookup(&[("DATA_RAW_DIR", "/srv/raw")]));
        assert_eq!(
            cfg.extract.file_cosing,
            PathBuf::from("/srv/raw/COSING_Annex_III_v2.xls")
        );
        assert_eq!(cfg.paths.raw_dir, PathBuf::from("/srv/raw"));
    }

    #[test]
    fn test_log_dir_from_environment() {
        assert_eq!(from_lookup(lookup(&[])).paths.log_dir, PathBuf::from("logs"));
        let cfg = from_lookup(lookup(&[("LOG_DIR", "/var/log/cosmetics")]));
        assert_eq!(cfg.paths.log_dir, PathBuf::from("/var/log/cosmetics"));
    }
}
