use std::{collections::HashMap, env, time::Duration};

use thiserror::Error;

use crate::subscriptions::{COUNT_DEADLINE, TOGGLE_DEADLINE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got `{value}`")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be greater than zero")]
    ZeroDeadline { var: &'static str },
    #[error("count deadline ({count:?}) must be shorter than toggle deadline ({toggle:?})")]
    DeadlineOrder { count: Duration, toggle: Duration },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub port: u16,
    pub count_deadline: Duration,
    pub toggle_deadline: Duration,
    pub jwt_secret: Option<String>,
    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let db_path = get("NL_DATABASE_URL").unwrap_or_else(|| "newsletter.db".to_string());
        let bind_addr = get("NL_BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or("NL_PORT", get("NL_PORT"), 8080u16)?;

        let count_deadline = deadline_ms(
            "NL_COUNT_TIMEOUT_MS",
            get("NL_COUNT_TIMEOUT_MS"),
            COUNT_DEADLINE,
        )?;
        let toggle_deadline = deadline_ms(
            "NL_TOGGLE_TIMEOUT_MS",
            get("NL_TOGGLE_TIMEOUT_MS"),
            TOGGLE_DEADLINE,
        )?;
        // the count runs inside the toggle, so its deadline has to fit
        if count_deadline >= toggle_deadline {
            return Err(ConfigError::DeadlineOrder {
                count: count_deadline,
                toggle: toggle_deadline,
            });
        }

        Ok(Self {
            db_path,
            bind_addr,
            port,
            count_deadline,
            toggle_deadline,
            jwt_secret: get("NL_JWT_SECRET"),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: get("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        None => Ok(default),
    }
}

fn deadline_ms(
    var: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let ms = parse_or(var, value, default.as_millis() as u64)?;
    if ms == 0 {
        return Err(ConfigError::ZeroDeadline { var });
    }
    Ok(Duration::from_millis(ms))
}
