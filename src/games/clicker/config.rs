//! Tunable constants for a run, with JSON overrides.
//!
//! Every field has a default matching the shipped game, and
//! `#[serde(default)]` lets an override document name only the fields it
//! changes (e.g. `{"countdown_initial": 90}`).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Timing and penalty for one bomb-style penalty mini-game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// How long the bomb arms before the defuse window opens (ms).
    pub arming_ms: u32,
    /// Length of the defuse window (ms).
    pub armed_ms: u32,
    /// Seconds taken off the countdown when the window expires.
    pub penalty_secs: u32,
}

impl CycleConfig {
    pub const fn bomb() -> Self {
        Self {
            arming_ms: 3_000,
            armed_ms: 1_000,
            penalty_secs: 3,
        }
    }

    pub const fn dual_bomb() -> Self {
        Self {
            arming_ms: 5_000,
            armed_ms: 1_000,
            penalty_secs: 5,
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self::bomb()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub cooldown_initial: u32,
    pub min_cooldown: u32,
    pub countdown_initial: u32,

    pub add_point_cost: u64,
    pub reduce_cooldown_cost: u64,
    pub add_time_cost: u64,
    pub win_cost: u64,

    /// Seconds granted by one time upgrade.
    pub extra_time: u32,
    pub max_click_power: u32,
    pub max_time_upgrades: u32,
    pub max_win_uses: u32,

    /// Seconds lost when the main button is pressed during its cooldown.
    pub early_click_penalty: u32,
    /// The countdown plays the warning cue once it is at or below this.
    pub warning_threshold: u32,

    pub bomb: CycleConfig,
    pub dual_bomb: CycleConfig,

    pub death_max: u32,
    /// Percent added to the death meter every second.
    pub death_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cooldown_initial: 5,
            min_cooldown: 1,
            countdown_initial: 60,
            add_point_cost: 2,
            reduce_cooldown_cost: 5,
            add_time_cost: 100,
            win_cost: 1_000,
            extra_time: 10,
            max_click_power: 50,
            max_time_upgrades: 3,
            max_win_uses: 1,
            early_click_penalty: 5,
            warning_threshold: 10,
            bomb: CycleConfig::bomb(),
            dual_bomb: CycleConfig::dual_bomb(),
            death_max: 100,
            death_rate: 1,
        }
    }
}

/// Upper bound for any configured duration in seconds.
pub const MAX_DURATION_SECS: u32 = 3_600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("min_cooldown must be at least 1 second")]
    MinCooldownZero,
    #[error("cooldown_initial ({initial}) is below min_cooldown ({min})")]
    CooldownBelowMinimum { initial: u32, min: u32 },
    #[error("countdown_initial must be greater than zero")]
    CountdownZero,
    #[error("max_click_power must be at least 1")]
    ClickPowerZero,
    #[error("{which} durations must be greater than zero")]
    CycleDurationZero { which: &'static str },
    #[error("death_max must be greater than zero")]
    DeathMaxZero,
    #[error("death_rate must be between 1 and death_max ({max})")]
    DeathRateOutOfRange { max: u32 },
    #[error("{field} must be at most {max} seconds")]
    TooLong { field: &'static str, max: u32 },
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_cooldown == 0 {
            return Err(ConfigError::MinCooldownZero);
        }
        if self.cooldown_initial < self.min_cooldown {
            return Err(ConfigError::CooldownBelowMinimum {
                initial: self.cooldown_initial,
                min: self.min_cooldown,
            });
        }
        if self.countdown_initial == 0 {
            return Err(ConfigError::CountdownZero);
        }
        if self.max_click_power == 0 {
            return Err(ConfigError::ClickPowerZero);
        }
        for (which, cycle) in [("bomb", &self.bomb), ("dual_bomb", &self.dual_bomb)] {
            if cycle.arming_ms == 0 || cycle.armed_ms == 0 {
                return Err(ConfigError::CycleDurationZero { which });
            }
        }
        if self.death_max == 0 {
            return Err(ConfigError::DeathMaxZero);
        }
        if self.death_rate == 0 || self.death_rate > self.death_max {
            return Err(ConfigError::DeathRateOutOfRange {
                max: self.death_max,
            });
        }
        for (field, secs) in [
            ("countdown_initial", self.countdown_initial),
            ("extra_time", self.extra_time),
            ("cooldown_initial", self.cooldown_initial),
        ] {
            if secs > MAX_DURATION_SECS {
                return Err(ConfigError::TooLong {
                    field,
                    max: MAX_DURATION_SECS,
                });
            }
        }
        Ok(())
    }

    /// Number of cooldown reductions available in a run.
    pub fn cooldown_upgrade_slots(&self) -> u32 {
        self.cooldown_initial - self.min_cooldown
    }

    /// Resolve an optional override document. Missing or invalid overrides
    /// fall back to the defaults.
    pub fn from_override(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(config) => {
                info!("config override applied");
                config
            }
            Err(e) => {
                warn!(error = %e, "ignoring invalid config override");
                Self::default()
            }
        }
    }
}

/// localStorage key holding an optional JSON override.
pub const STORAGE_KEY: &str = "minute_clicker_config";

/// Read the override from localStorage. Only works in the browser.
pub fn load_config() -> GameConfig {
    let json = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten());
    GameConfig::from_override(json.as_deref())
}
