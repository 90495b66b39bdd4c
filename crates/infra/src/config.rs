//! Process configuration, read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `127.0.0.1:8000` |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | `postgres://localhost:5432/fruit_supply_db` |
//! | `TASK_BROKER_URL` | `redis://localhost:6379/0` |
//! | `TASK_RESULT_BACKEND` | value of `TASK_BROKER_URL` |
//! | `TASK_QUEUE_NAME` | `fruitsupply` |
//! | `TASK_RESULT_TTL_SECS` | `86400` |
//! | `RESET_SCHEDULE_INVENTORY_ID` | unset (no schedule) |
//! | `RESET_SCHEDULE_QUANTITY` | `100` |
//! | `RESET_SCHEDULE_HOUR` | `22` |
//! | `RESET_SCHEDULE_MINUTE` | `40` |
//! | `RESET_SCHEDULE_TIMEZONE` | `Asia/Kolkata` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use fruitsupply_core::DocumentId;

use crate::scheduler::ResetSchedule;
use crate::tasks::DEFAULT_RESULT_TTL;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/fruit_supply_db";
pub const DEFAULT_BROKER_URL: &str = "redis://localhost:6379/0";
pub const DEFAULT_QUEUE_NAME: &str = "fruitsupply";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres + Redis when true; in-memory store and queue otherwise.
    pub use_persistent_stores: bool,
    pub database_url: String,
    pub task_broker_url: String,
    pub task_result_backend: String,
    pub task_queue_name: String,
    /// How long task results stay readable in the result backend.
    pub task_result_ttl: Duration,
    /// `None` when `RESET_SCHEDULE_INVENTORY_ID` is unset.
    pub reset_schedule: Option<ResetSchedule>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR)?;
        let use_persistent_stores =
            parse_or("USE_PERSISTENT_STORES", get("USE_PERSISTENT_STORES"), "false")?;

        let task_broker_url = get("TASK_BROKER_URL").unwrap_or_else(|| DEFAULT_BROKER_URL.to_string());
        let task_result_backend = get("TASK_RESULT_BACKEND").unwrap_or_else(|| task_broker_url.clone());

        let ttl_default = DEFAULT_RESULT_TTL.as_secs().to_string();
        let task_result_ttl: u64 = parse_or("TASK_RESULT_TTL_SECS", get("TASK_RESULT_TTL_SECS"), &ttl_default)?;
        if task_result_ttl == 0 {
            return Err(ConfigError::invalid("TASK_RESULT_TTL_SECS", "0", "must be at least 1"));
        }

        let reset_schedule = match get("RESET_SCHEDULE_INVENTORY_ID") {
            None => None,
            Some(raw_id) => {
                let inventory_id = raw_id
                    .parse::<DocumentId>()
                    .map_err(|e| ConfigError::invalid("RESET_SCHEDULE_INVENTORY_ID", &raw_id, e))?;
                let hour: u32 = parse_or("RESET_SCHEDULE_HOUR", get("RESET_SCHEDULE_HOUR"), "22")?;
                let minute: u32 =
                    parse_or("RESET_SCHEDULE_MINUTE", get("RESET_SCHEDULE_MINUTE"), "40")?;
                if hour > 23 {
                    return Err(ConfigError::invalid("RESET_SCHEDULE_HOUR", &hour.to_string(), "must be 0-23"));
                }
                if minute > 59 {
                    return Err(ConfigError::invalid("RESET_SCHEDULE_MINUTE", &minute.to_string(), "must be 0-59"));
                }

                Some(ResetSchedule {
                    inventory_id,
                    quantity: parse_or("RESET_SCHEDULE_QUANTITY", get("RESET_SCHEDULE_QUANTITY"), "100")?,
                    hour,
                    minute,
                    timezone: parse_or::<Tz>(
                        "RESET_SCHEDULE_TIMEZONE",
                        get("RESET_SCHEDULE_TIMEZONE"),
                        "Asia/Kolkata",
                    )?,
                })
            }
        };

        Ok(Self {
            bind_addr,
            use_persistent_stores,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            task_broker_url,
            task_result_backend,
            task_queue_name: get("TASK_QUEUE_NAME").unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string()),
            task_result_ttl: Duration::from_secs(task_result_ttl),
            reset_schedule,
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value.as_deref().unwrap_or(default).trim();
    raw.parse::<T>().map_err(|e| ConfigError::invalid(var, raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert!(!cfg.use_persistent_stores);
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.task_result_backend, DEFAULT_BROKER_URL);
        assert_eq!(cfg.task_queue_name, "fruitsupply");
        assert_eq!(cfg.task_result_ttl, Duration::from_secs(86_400));
        assert!(cfg.reset_schedule.is_none());
    }

    #[test]
    fn result_backend_follows_broker() {
        let cfg = config(&[("TASK_BROKER_URL", "redis://cache:6379/2")]).unwrap();
        assert_eq!(cfg.task_result_backend, "redis://cache:6379/2");

        let cfg = config(&[
            ("TASK_BROKER_URL", "redis://cache:6379/2"),
            ("TASK_RESULT_BACKEND", "redis://results:6379/0"),
        ])
        .unwrap();
        assert_eq!(cfg.task_result_backend, "redis://results:6379/0");
    }

    #[test]
    fn schedule_uses_defaults_once_id_is_set() {
        let id = DocumentId::new();
        let raw = id.to_string();
        let cfg = config(&[("RESET_SCHEDULE_INVENTORY_ID", raw.as_str())]).unwrap();

        let schedule = cfg.reset_schedule.unwrap();
        assert_eq!(schedule.inventory_id, id);
        assert_eq!(schedule.quantity, 100);
        assert_eq!((schedule.hour, schedule.minute), (22, 40));
        assert_eq!(schedule.timezone, chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn bad_values_are_rejected() {
        let id = DocumentId::new().to_string();
        let id = id.as_str();
        assert!(config(&[("USE_PERSISTENT_STORES", "yes please")]).is_err());
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("RESET_SCHEDULE_INVENTORY_ID", "abc")]).is_err());
        assert!(config(&[("RESET_SCHEDULE_INVENTORY_ID", id), ("RESET_SCHEDULE_HOUR", "24")]).is_err());
        assert!(config(&[("RESET_SCHEDULE_INVENTORY_ID", id), ("RESET_SCHEDULE_QUANTITY", "-1")]).is_err());

        let err = config(&[("RESET_SCHEDULE_INVENTORY_ID", id), ("RESET_SCHEDULE_TIMEZONE", "Mars/Base")])
            .unwrap_err();
        assert!(err.to_string().starts_with("RESET_SCHEDULE_TIMEZONE"));
    }

    #[test]
    fn result_ttl_is_configurable() {
        let cfg = config(&[("TASK_RESULT_TTL_SECS", "600")]).unwrap();
        assert_eq!(cfg.task_result_ttl, Duration::from_secs(600));
        assert!(config(&[("TASK_RESULT_TTL_SECS", "0")]).is_err());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("RESET_SCHEDULE_INVENTORY_ID", "  "), ("TASK_QUEUE_NAME", "")]).unwrap();
        assert!(cfg.reset_schedule.is_none());
        assert_eq!(cfg.task_queue_name, DEFAULT_QUEUE_NAME);
    }
}
