//! Tiebreaker configuration.
//!
//! The cascade can be overridden with `PLAYOFF_TIEBREAKER_CASCADE`, a comma
//! separated list of method names such as
//! `most_touchdowns,fewer_turnovers,higher_seed`.

use super::tiebreaker::TiebreakerMethod;
use serde::{Deserialize, Serialize};

/// Environment variable holding the tiebreaker cascade
pub const TIEBREAKER_CASCADE_VAR: &str = "PLAYOFF_TIEBREAKER_CASCADE";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Ordered list of tiebreakers tried when two totals are equal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakerConfiguration {
    cascade: Vec<TiebreakerMethod>,
}

impl Default for TiebreakerConfiguration {
    fn default() -> Self {
        Self {
            cascade: vec![
                TiebreakerMethod::HighestSinglePositionScore,
                TiebreakerMethod::SecondHighestPositionScore,
                TiebreakerMethod::MostTouchdowns,
                TiebreakerMethod::FewerTurnovers,
                TiebreakerMethod::HigherSeed,
            ],
        }
    }
}

impl TiebreakerConfiguration {
    /// Create a configuration with a custom cascade.
    ///
    /// The cascade is not validated here; call [`Self::validate`].
    pub fn new(cascade: Vec<TiebreakerMethod>) -> Self {
        Self { cascade }
    }

    pub fn cascade(&self) -> &[TiebreakerMethod] {
        &self.cascade
    }

    /// Load the cascade from `PLAYOFF_TIEBREAKER_CASCADE`.
    ///
    /// Falls back to the default cascade when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns error if a method name is unknown or the result fails
    /// [`Self::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let Ok(raw) = std::env::var(TIEBREAKER_CASCADE_VAR) else {
            return Ok(Self::default());
        };

        let cascade = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.parse::<TiebreakerMethod>()
                    .map_err(|reason| ConfigError::Invalid {
                        var: TIEBREAKER_CASCADE_VAR.to_string(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self::new(cascade);
        config.validate()?;
        Ok(config)
    }

    /// Validate the cascade
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cascade.is_empty() {
            return Err(ConfigError::Invalid {
                var: TIEBREAKER_CASCADE_VAR.to_string(),
                reason: "Must list at least one tiebreaker".to_string(),
            });
        }

        if self.cascade.contains(&TiebreakerMethod::CoWinners) {
            return Err(ConfigError::Invalid {
                var: TIEBREAKER_CASCADE_VAR.to_string(),
                reason: "co_winners is the fallback outcome, not a tiebreaker".to_string(),
            });
        }

        for (idx, method) in self.cascade.iter().enumerate() {
            if self.cascade[..idx].contains(method) {
                return Err(ConfigError::Invalid {
                    var: TIEBREAKER_CASCADE_VAR.to_string(),
                    reason: format!("{method} is listed more than once"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // SAFETY: every test touching the environment is #[serial]
    fn set_cascade(value: Option<&str>) {
        unsafe {
            match value {
                Some(v) => std::env::set_var(TIEBREAKER_CASCADE_VAR, v),
                None => std::env::remove_var(TIEBREAKER_CASCADE_VAR),
            }
        }
    }

    #[test]
    fn test_default_cascade_is_valid() {
        let config = TiebreakerConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cascade().len(), 5);
        assert_eq!(
            config.cascade().first(),
            Some(&TiebreakerMethod::HighestSinglePositionScore)
        );
        assert_eq!(config.cascade().last(), Some(&TiebreakerMethod::HigherSeed));
    }

    #[test]
    fn test_validation_rejects_empty_cascade() {
        let err = TiebreakerConfiguration::new(vec![]).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validation_rejects_co_winners() {
        let config = TiebreakerConfiguration::new(vec![
            TiebreakerMethod::MostTouchdowns,
            TiebreakerMethod::CoWinners,
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicates() {
        let config = TiebreakerConfiguration::new(vec![
            TiebreakerMethod::HigherSeed,
            TiebreakerMethod::MostTouchdowns,
            TiebreakerMethod::HigherSeed,
        ]);
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("higher_seed"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_when_unset() {
        set_cascade(None);
        let config = TiebreakerConfiguration::from_env().unwrap();
        assert_eq!(config, TiebreakerConfiguration::default());
    }

    #[test]
    #[serial]
    fn test_from_env_parses_cascade() {
        set_cascade(Some("most_touchdowns, higher_seed"));
        let config = TiebreakerConfiguration::from_env().unwrap();
        set_cascade(None);

        assert_eq!(
            config.cascade(),
            &[TiebreakerMethod::MostTouchdowns, TiebreakerMethod::HigherSeed]
        );
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_method() {
        set_cascade(Some("most_touchdowns,coin_flip"));
        let result = TiebreakerConfiguration::from_env();
        set_cascade(None);

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains(TIEBREAKER_CASCADE_VAR));
        assert!(msg.contains("coin_flip"));
    }
}
