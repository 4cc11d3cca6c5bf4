use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Runtime knobs for the worker pool and the UI-thread looper.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use encore_core::RuntimeConfig;
///
/// let cfg = RuntimeConfig::from_json(r#"{ "worker_threads": 2 }"#).unwrap();
/// assert_eq!(cfg.worker_threads, 2);
/// assert_eq!(cfg.thread_name, "encore-worker");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub thread_name: String,
    /// Upper bound for one blocking wait in `Looper::run_until_idle`.
    pub pump_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            thread_name: "encore-worker".into(),
            pump_timeout_ms: 250,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    pub fn pump_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.pump_timeout_ms)
    }
}
