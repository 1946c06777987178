use std::path::PathBuf;

/// Runtime configuration for the terminal front-end.
///
/// Only presentation and reproducibility knobs live here; gameplay values
/// are fixed in `constants`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Tick period in milliseconds
    pub frame_ms: u64,
    /// Seed for the simulation RNG; `None` draws one from the OS
    pub seed: Option<u64>,
    /// File receiving log output (the terminal itself is taken by the game)
    pub log_file: PathBuf,
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
}

pub const MIN_FRAME_MS: u64 = 5;
pub const MAX_FRAME_MS: u64 = 200;

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // 50 ticks per second
            frame_ms: 20,
            seed: None,
            log_file: PathBuf::from("musou.log"),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("frame_ms must be between 5 and 200, got {0}")]
    FrameRate(u64),
    #[error("log file path is empty")]
    EmptyLogPath,
}

impl GameConfig {
    /// Load config from the process environment.
    ///
    /// Nothing is logged here: the log destination is itself configured, so
    /// the caller emits the returned warnings once a subscriber is installed.
    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    /// Invalid values keep their default and add a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        if let Some(ms) = lookup("MUSOU_FRAME_MS") {
            match ms.parse::<u64>() {
                Ok(parsed) if (MIN_FRAME_MS..=MAX_FRAME_MS).contains(&parsed) => {
                    config.frame_ms = parsed;
                }
                Ok(_) => warnings.push(format!(
                    "MUSOU_FRAME_MS must be {}-{}, using default",
                    MIN_FRAME_MS, MAX_FRAME_MS
                )),
                Err(_) => warnings.push(format!("Invalid MUSOU_FRAME_MS '{}', using default", ms)),
            }
        }

        if let Some(seed) = lookup("MUSOU_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                warnings.push(format!("Invalid MUSOU_SEED '{}', seeding from entropy", seed));
            }
        }

        if let Some(path) = lookup("MUSOU_LOG_FILE") {
            if path.trim().is_empty() {
                warnings.push("MUSOU_LOG_FILE is empty, using default".to_string());
            } else {
                config.log_file = PathBuf::from(path);
            }
        }

        if let Some(level) = lookup("MUSOU_LOG_LEVEL") {
            config.log_level = level;
        }

        (config, warnings)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FRAME_MS..=MAX_FRAME_MS).contains(&self.frame_ms) {
            return Err(ConfigError::FrameRate(self.frame_ms));
        }
        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogPath);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.frame_ms, 20);
        assert_eq!(config.seed, None);
        assert_eq!(config.log_file, PathBuf::from("musou.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reads_valid_values() {
        let (config, warnings) = GameConfig::from_lookup(lookup_from(&[
            ("MUSOU_FRAME_MS", "33"),
            ("MUSOU_SEED", "42"),
            ("MUSOU_LOG_FILE", "/tmp/musou-test.log"),
            ("MUSOU_LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.frame_ms, 33);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_file, PathBuf::from("/tmp/musou-test.log"));
        assert_eq!(config.log_level, "debug");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let (config, warnings) = GameConfig::from_lookup(lookup_from(&[
            ("MUSOU_FRAME_MS", "0"),
            ("MUSOU_SEED", "not-a-number"),
            ("MUSOU_LOG_FILE", "   "),
        ]));
        assert_eq!(config, GameConfig::default());
        // One warning per rejected variable, kept for the caller to log
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("MUSOU_FRAME_MS"));
        assert!(warnings[1].contains("not-a-number"));
        assert!(warnings[2].contains("MUSOU_LOG_FILE"));
    }

    #[test]
    fn test_unparsable_frame_rate_is_reported() {
        let (config, warnings) =
            GameConfig::from_lookup(lookup_from(&[("MUSOU_FRAME_MS", "fast")]));
        assert_eq!(config.frame_ms, 20);
        assert_eq!(warnings, vec!["Invalid MUSOU_FRAME_MS 'fast', using default".to_string()]);
    }

    #[test]
    fn test_empty_environment_has_no_warnings() {
        let (config, warnings) = GameConfig::from_lookup(|_| None);
        assert_eq!(config, GameConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validate_rejects_out_of_range_frame() {
        let config = GameConfig {
            frame_ms: 1000,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::FrameRate(1000)));
    }
}
