// src/config/service.rs
use std::env;

pub const ENV_HISTORY_CAP: &str = "MOODMETER_HISTORY_CAP";
pub const DEFAULT_HISTORY_CAP: usize = 500;

/// Service knobs read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub history_capacity: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let history_capacity = env::var(ENV_HISTORY_CAP)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_HISTORY_CAP);

        Self { history_capacity }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn reads_history_cap_with_fallback() {
        env::remove_var(ENV_HISTORY_CAP);
        assert_eq!(ServiceConfig::from_env(), ServiceConfig::default());

        env::set_var(ENV_HISTORY_CAP, "42");
        assert_eq!(ServiceConfig::from_env().history_capacity, 42);

        env::set_var(ENV_HISTORY_CAP, "zero");
        assert_eq!(ServiceConfig::from_env().history_capacity, DEFAULT_HISTORY_CAP);

        env::set_var(ENV_HISTORY_CAP, "0");
        assert_eq!(ServiceConfig::from_env().history_capacity, DEFAULT_HISTORY_CAP);

        env::remove_var(ENV_HISTORY_CAP);
    }
}
