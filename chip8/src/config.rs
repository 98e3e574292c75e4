//! Run configuration: defaults, then an optional TOML file, then flags

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use chip8_vm::constants::{DEFAULT_CLOCK_HZ, MAX_CLOCK_HZ};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("clock_hz must be between 1 and {max}, got {got}")]
    ClockRate { got: u32, max: u32 },
    #[error("'{0}' is not on the keypad")]
    UnknownKey(char),
}

/// Characters used by the text display
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub on: char,
    pub off: char,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { on: '█', off: ' ' }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Instructions per second
    pub clock_hz: u32,
    /// Stop after this many cycles
    pub cycles: Option<u64>,
    /// Seed for `RND`; random when absent
    pub seed: Option<u64>,
    /// Print every instruction to stderr
    pub trace: bool,
    /// Sleep between cycles to match `clock_hz`
    pub realtime: bool,
    /// Redraw the terminal whenever the frame changes
    pub watch: bool,
    /// Keyboard keys held down for the whole run, see `keymap`.
    /// Runs aren't interactive: these keys are never released.
    pub keys: String,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            cycles: None,
            seed: None,
            trace: false,
            realtime: true,
            watch: false,
            keys: String::new(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rejects settings the run loop can't honour
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(1..=MAX_CLOCK_HZ).contains(&self.clock_hz) {
            return Err(ConfigError::ClockRate {
                got: self.clock_hz,
                max: MAX_CLOCK_HZ,
            });
        }
        Ok(self)
    }

    /// Keypad indices for `keys`
    pub fn held_keys(&self) -> Result<Vec<u8>, ConfigError> {
        self.keys
            .chars()
            .map(|key| crate::keymap::keymap(key).ok_or(ConfigError::UnknownKey(key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.clock_hz, 500);
        assert!(config.realtime);
    }

    #[test]
    fn test_parses_all_keys() {
        let config: Config = toml::from_str(
            r##"
            clock_hz = 1000
            cycles = 200
            seed = 42
            trace = true
            realtime = false
            watch = true
            keys = "qw"

            [display]
            on = "#"
            off = "."
            "##,
        )
        .unwrap();
        assert_eq!(config.clock_hz, 1000);
        assert_eq!(config.cycles, Some(200));
        assert_eq!(config.seed, Some(42));
        assert!(config.trace && config.watch && !config.realtime);
        assert_eq!(config.held_keys().unwrap(), vec![0x4, 0x5]);
        assert_eq!(config.display, DisplayConfig { on: '#', off: '.' });
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(toml::from_str::<Config>("speed = 3").is_err());
    }

    #[test]
    fn test_rejects_clock_rates_out_of_range() {
        for clock_hz in [0, MAX_CLOCK_HZ + 1, 2_000_000_000] {
            let config = Config {
                clock_hz,
                ..Config::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ClockRate { got, .. }) if got == clock_hz
            ));
        }
        let fastest = Config {
            clock_hz: MAX_CLOCK_HZ,
            ..Config::default()
        };
        assert!(fastest.validate().is_ok());
    }

    #[test]
    fn test_rejects_unmapped_keys() {
        let config = Config {
            keys: "qp".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.held_keys(), Err(ConfigError::UnknownKey('p'))));
    }
}
