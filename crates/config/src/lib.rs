use core::time::Duration;

use contend_sync::BufferStyle;
use contend_testing::{HarnessConfig, ScenarioConfig, Strategy};
use derive_more::derive::From;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, From)]
pub enum ConfigError {
    #[from(ignore)]
    IOError(std::io::Error),

    #[from(ignore)]
    DeserializationFailed(toml::de::Error),

    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::DeserializationFailed(value)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(reason) => write!(f, "invalid configuration: {reason}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// value_from_path returns the regular `toml::Value` object which implements the
/// `serde::DeserializeOwned` trait which allows you to directly manipulate the value object
/// instead of a defined type.
pub fn value_from_path<V: Into<std::path::PathBuf>>(target: V) -> ConfigResult<toml::Value> {
    from_path(target)
}

pub fn from_path<T, V>(target: V) -> ConfigResult<T>
where
    T: DeserializeOwned,
    V: Into<std::path::PathBuf>,
{
    let target_path = target.into();
    tracing::debug!("loading configuration from {}", target_path.display());
    let config_content = std::fs::read_to_string(target_path)?;
    from_str(&config_content)
}

pub fn from_str<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config_obj: T = toml::from_str(content)?;
    Ok(config_obj)
}

/// Reads and validates a [`LabConfig`] file.
///
/// # Errors
///
/// I/O and TOML errors as they come, [`ConfigError::Invalid`] when a value
/// is out of range.
pub fn load_lab_config<V: Into<std::path::PathBuf>>(target: V) -> ConfigResult<LabConfig> {
    let config: LabConfig = from_path(target)?;
    config.validate()?;
    Ok(config)
}

/// Settings for both lab runs. Every field has a default, so an empty file
/// is a valid configuration.
///
/// ```toml
/// [counter]
/// workers = 4
/// increments = 10000
/// strategies = ["unsynchronized", "atomic"]
/// timeout_ms = 5000
///
/// [buffer]
/// style = "semaphore"
/// capacity = 5
/// items = 10
/// producer_delay_ms = 100
/// consumer_delay_ms = 500
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub counter: CounterSection,
    pub buffer: BufferSection,
}

impl LabConfig {
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        self.counter.validate()?;
        self.buffer.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSection {
    pub workers: usize,
    pub increments: usize,
    pub strategies: Vec<Strategy>,
    pub timeout_ms: Option<u64>,
}

impl Default for CounterSection {
    fn default() -> Self {
        Self {
            workers: 2,
            increments: 10_000,
            strategies: Strategy::ALL.to_vec(),
            timeout_ms: None,
        }
    }
}

impl CounterSection {
    fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("counter.workers must be at least 1".into()));
        }
        if self.increments == 0 {
            return Err(ConfigError::Invalid(
                "counter.increments must be at least 1".into(),
            ));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid(
                "counter.strategies must name at least one strategy".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn harness_config(&self) -> HarnessConfig {
        let config = HarnessConfig::new()
            .workers(self.workers)
            .increments(self.increments);
        match self.timeout_ms {
            Some(millis) => config.timeout(Duration::from_millis(millis)),
            None => config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSection {
    pub style: BufferStyle,
    pub capacity: usize,
    pub items: usize,
    pub producer_delay_ms: u64,
    pub consumer_delay_ms: u64,
    pub timeout_ms: Option<u64>,
}

impl Default for BufferSection {
    fn default() -> Self {
        Self {
            style: BufferStyle::Monitor,
            capacity: 5,
            items: 10,
            producer_delay_ms: 100,
            consumer_delay_ms: 500,
            timeout_ms: None,
        }
    }
}

impl BufferSection {
    fn validate(&self) -> ConfigResult<()> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("buffer.capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Scenario settings for a paced producer/consumer run.
    #[must_use]
    pub fn scenario_config(&self) -> ScenarioConfig {
        let config = ScenarioConfig::new()
            .items(self.items)
            .producer_delay(Duration::from_millis(self.producer_delay_ms))
            .consumer_delay(Duration::from_millis(self.consumer_delay_ms));
        match self.timeout_ms {
            Some(millis) => config.timeout(Duration::from_millis(millis)),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: LabConfig = from_str("").unwrap();
        assert_eq!(config, LabConfig::default());
        assert_eq!(config.buffer.capacity, 5);
        assert_eq!(config.counter.strategies.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_override_defaults() {
        let config: LabConfig = from_str(
            r#"
            [counter]
            workers = 8
            strategies = ["atomic", "semaphore"]
            timeout_ms = 250

            [buffer]
            style = "semaphore"
            capacity = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.counter.workers, 8);
        assert_eq!(config.counter.increments, 10_000);
        assert_eq!(
            config.counter.strategies,
            vec![Strategy::Atomic, Strategy::Semaphore]
        );
        assert_eq!(
            config.counter.harness_config().get_timeout(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(config.buffer.style, BufferStyle::Semaphore);
        assert_eq!(config.buffer.scenario_config().get_items(), 10);
    }

    #[test]
    fn out_of_range_values_are_invalid() {
        let config: LabConfig = from_str("[buffer]\ncapacity = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(reason)) if reason.contains("capacity")
        ));

        let config: LabConfig = from_str("[counter]\nstrategies = []\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_strategy_fails_deserialization() {
        let result: ConfigResult<LabConfig> = from_str("[counter]\nstrategies = [\"spin\"]\n");
        assert!(matches!(result, Err(ConfigError::DeserializationFailed(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_lab_config("/definitely/not/here/contend.toml");
        assert!(matches!(result, Err(ConfigError::IOError(_))));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("contend-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[counter]\nworkers = 3\n").unwrap();

        let config = load_lab_config(&path).unwrap();
        assert_eq!(config.counter.workers, 3);

        let value = value_from_path(&path).unwrap();
        assert_eq!(value["counter"]["workers"].as_integer(), Some(3));
        std::fs::remove_file(&path).unwrap();
    }
}
