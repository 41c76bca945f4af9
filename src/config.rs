use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_CALORIE_LIMIT: i64 = 2000;
pub const DEFAULT_TOTAL_CALORIES: i64 = 0;
/// Upper bound for a single entry's calories and for the calorie limit.
pub const MAX_CALORIES: i64 = 1_000_000;
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/tracker.json";

/// Values the tracker falls back to when storage has nothing recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub default_calorie_limit: i64,
    pub default_total_calories: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            default_calorie_limit: DEFAULT_CALORIE_LIMIT,
            default_total_calories: DEFAULT_TOTAL_CALORIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub tracker: TrackerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: resolve_port(),
            data_path: resolve_data_path(),
            tracker: TrackerConfig {
                default_calorie_limit: resolve_default_limit(),
                ..TrackerConfig::default()
            },
        }
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_DATA_PATH)
}

pub fn resolve_port() -> u16 {
    parse_var("PORT", DEFAULT_PORT)
}

pub fn resolve_default_limit() -> i64 {
    let limit = parse_var("CALORIE_LIMIT", DEFAULT_CALORIE_LIMIT);
    if !(0..=MAX_CALORIES).contains(&limit) {
        warn!("CALORIE_LIMIT must be within 0..={MAX_CALORIES}, using {DEFAULT_CALORIE_LIMIT}");
        return DEFAULT_CALORIE_LIMIT;
    }
    limit
}

fn parse_var<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("invalid {name}={value:?}, using {default}");
            default
        }),
        Err(_) => default,
    }
}
