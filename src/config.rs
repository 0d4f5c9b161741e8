use rusqlite::Connection;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::repository;

pub const KEY_ANNUAL_INTERVENTION_TARGET: &str = "annual_intervention_target";
pub const DEFAULT_ANNUAL_INTERVENTION_TARGET: u32 = 50;

/// Settings the indicator engine is computed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Interventions expected per year; denominator of the registration KPI.
    pub annual_intervention_target: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annual_intervention_target: DEFAULT_ANNUAL_INTERVENTION_TARGET,
        }
    }
}

impl EngineConfig {
    /// Load from `app_config`, falling back to defaults for unset keys.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = repository::get_config(conn, KEY_ANNUAL_INTERVENTION_TARGET)? {
            config.annual_intervention_target = parse_target(&raw)?;
        }
        Ok(config)
    }
}

/// Validate a config value before it is stored. Unknown keys are accepted
/// as free-form settings.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    if key == KEY_ANNUAL_INTERVENTION_TARGET {
        parse_target(value)?;
    }
    Ok(())
}

fn parse_target(raw: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        Error::Config(format!(
            "{KEY_ANNUAL_INTERVENTION_TARGET} must be a non-negative integer, got '{raw}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_and_overrides() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("storage/migrations/001_initial.sql"))
            .unwrap();

        assert_eq!(EngineConfig::load(&conn).unwrap(), EngineConfig::default());

        repository::set_config(&conn, KEY_ANNUAL_INTERVENTION_TARGET, " 80 ").unwrap();
        assert_eq!(
            EngineConfig::load(&conn).unwrap().annual_intervention_target,
            80
        );

        repository::set_config(&conn, KEY_ANNUAL_INTERVENTION_TARGET, "lots").unwrap();
        assert!(matches!(EngineConfig::load(&conn), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_config_value() {
        let key = KEY_ANNUAL_INTERVENTION_TARGET;
        assert!(validate_config_value(key, "0").is_ok());
        assert!(validate_config_value(key, "-3").is_err());
        assert!(validate_config_value("display_name", "anything").is_ok());
    }
}
