//! Configuration module - simulation tuning and environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::time::DEFAULT_FRAME_RATE;

/// Tuning parameters for one race. Fixed for the lifetime of a `Race`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Viewport width in pixels
    pub screen_width: f32,
    /// Viewport height in pixels
    pub screen_height: f32,
    /// Track scale
    pub pixels_per_meter: f32,
    /// Pool length in meters
    pub pool_length_meters: f32,
    /// Starting position along the track (pixels)
    pub start_offset: f32,

    /// Seconds a swimmer can hold their breath
    pub max_breath_time: f32,
    /// Breath remaining (seconds) below which drag rises and the HUD warns
    pub low_breath_threshold: f32,

    /// Strokes closer together than this (seconds) are mashing
    pub fast_cadence_threshold: f32,
    /// Ideal seconds between strokes
    pub stroke_target_interval: f32,
    /// Width of the timing window around the ideal interval
    pub stroke_timing_sigma: f32,
    /// Efficiency of the first stroke of a race
    pub first_stroke_efficiency: f32,
    /// Thrust ratio for repeating the same arm
    pub same_side_ratio: f32,
    pub base_thrust: f32,
    pub stroke_stamina_cost: f32,
    pub stroke_fatigue_cost: f32,

    /// Backward velocity impulse applied when mashing
    pub mash_impulse: f32,
    /// Seconds the cadence penalty stays active
    pub penalty_window: f32,
    pub mash_fatigue_cost: f32,

    pub kick_thrust: f32,
    pub kick_stamina_cost: f32,

    /// Velocity multiplier applied when taking a breath
    pub breath_damping: f32,
    pub breath_stamina_restore: f32,

    /// Passive stamina regeneration per second
    pub stamina_regen_rate: f32,
    /// Passive fatigue decay per second
    pub fatigue_decay_rate: f32,
    /// Fractional velocity decay per second
    pub base_drag: f32,
    /// Extra drag while breath is below `low_breath_threshold`
    pub low_breath_drag: f32,

    /// Cosmetic sink speed for drowned swimmers (pixels per second)
    pub sink_rate: f32,
    /// Upper bound on a single frame step (seconds)
    pub max_frame_dt: f32,

    /// Camera keeps the leader this far from the left edge
    pub camera_lead_margin: f32,
    /// Extra room past the finish line the camera may scroll to
    pub camera_trail_margin: f32,

    /// Optional hard stop for the race clock (seconds)
    pub max_race_time: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            screen_width: 1000.0,
            screen_height: 600.0,
            pixels_per_meter: 20.0,
            pool_length_meters: 40.0,
            start_offset: 20.0,
            max_breath_time: 17.0,
            low_breath_threshold: 5.0,
            fast_cadence_threshold: 0.25,
            stroke_target_interval: 0.5,
            stroke_timing_sigma: 0.1,
            first_stroke_efficiency: 0.8,
            same_side_ratio: 0.6,
            base_thrust: 80.0,
            stroke_stamina_cost: 0.03,
            stroke_fatigue_cost: 0.01,
            mash_impulse: 50.0,
            penalty_window: 0.5,
            mash_fatigue_cost: 0.05,
            kick_thrust: 15.0,
            kick_stamina_cost: 0.05,
            breath_damping: 0.8,
            breath_stamina_restore: 0.1,
            stamina_regen_rate: 0.05,
            fatigue_decay_rate: 0.02,
            base_drag: 2.0,
            low_breath_drag: 1.0,
            sink_rate: 20.0,
            max_frame_dt: 0.1,
            camera_lead_margin: 200.0,
            camera_trail_margin: 100.0,
            max_race_time: None,
        }
    }
}

impl SimConfig {
    /// Finish line position in pixels
    pub fn finish_line(&self) -> f32 {
        self.pool_length_meters * self.pixels_per_meter
    }

    /// Defaults with optional `SWIM_*` environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = parse_var("SWIM_POOL_LENGTH_METERS")? {
            config.pool_length_meters = v;
        }
        if let Some(v) = parse_var("SWIM_MAX_BREATH_TIME")? {
            config.max_breath_time = v;
        }
        if let Some(v) = parse_var("SWIM_FAST_CADENCE_THRESHOLD")? {
            config.fast_cadence_threshold = v;
        }
        if let Some(v) = parse_var::<f32>("SWIM_MAX_RACE_TIME")? {
            config.max_race_time = Some(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject parameter sets the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("pixels_per_meter", self.pixels_per_meter),
            ("pool_length_meters", self.pool_length_meters),
            ("max_breath_time", self.max_breath_time),
            ("stroke_timing_sigma", self.stroke_timing_sigma),
            ("max_frame_dt", self.max_frame_dt),
            ("screen_width", self.screen_width),
            ("fast_cadence_threshold", self.fast_cadence_threshold),
            ("mash_impulse", self.mash_impulse),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }

        let non_negative = [
            ("base_thrust", self.base_thrust),
            ("stroke_stamina_cost", self.stroke_stamina_cost),
            ("stroke_fatigue_cost", self.stroke_fatigue_cost),
            ("penalty_window", self.penalty_window),
            ("mash_fatigue_cost", self.mash_fatigue_cost),
            ("kick_thrust", self.kick_thrust),
            ("kick_stamina_cost", self.kick_stamina_cost),
            ("breath_stamina_restore", self.breath_stamina_restore),
            ("stamina_regen_rate", self.stamina_regen_rate),
            ("fatigue_decay_rate", self.fatigue_decay_rate),
            ("base_drag", self.base_drag),
            ("low_breath_drag", self.low_breath_drag),
            ("low_breath_threshold", self.low_breath_threshold),
            ("sink_rate", self.sink_rate),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be negative",
                });
            }
        }

        // ratios that scale a stroke down, never up
        let unit_ratios = [
            ("same_side_ratio", self.same_side_ratio, false),
            ("first_stroke_efficiency", self.first_stroke_efficiency, false),
            ("breath_damping", self.breath_damping, true),
        ];
        for (field, value, zero_ok) in unit_ratios {
            let low_ok = if zero_ok { value >= 0.0 } else { value > 0.0 };
            if !(low_ok && value <= 1.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must lie within the unit interval",
                });
            }
        }

        if self.start_offset < 0.0 || self.start_offset >= self.finish_line() {
            return Err(ConfigError::Invalid {
                field: "start_offset",
                reason: "must lie between the wall and the finish line",
            });
        }

        if let Some(limit) = self.max_race_time {
            if !(limit > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "max_race_time",
                    reason: "must be greater than zero when set",
                });
            }
        }

        Ok(())
    }
}

/// Host settings loaded from environment variables
#[derive(Clone, Debug)]
pub struct HostConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Frames simulated per second by the live session
    pub frame_rate: u32,
    /// Frames between snapshot broadcasts
    pub snapshot_every: u32,
    /// Run this key script headless instead of a live session
    pub replay_script: Option<PathBuf>,
}

impl HostConfig {
    /// Load host configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let frame_rate = parse_var::<u32>("FRAME_RATE")?.unwrap_or(DEFAULT_FRAME_RATE);
        if frame_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "FRAME_RATE",
                reason: "must be greater than zero",
            });
        }

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            frame_rate,
            snapshot_every: parse_var::<u32>("SNAPSHOT_EVERY")?.unwrap_or(6).max(1),
            replay_script: env::var("REPLAY_SCRIPT").ok().map(PathBuf::from),
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Parse { name: &'static str, value: String },

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error("A race needs at least one swimmer")]
    EmptyRoster,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_finish_line() {
        let config = SimConfig::default();
        assert!((config.finish_line() - 800.0).abs() < 1e-4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sigma() {
        let config = SimConfig {
            stroke_timing_sigma: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "stroke_timing_sigma",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_start_past_finish() {
        let config = SimConfig {
            start_offset: 900.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_mash_impulse() {
        let config = SimConfig {
            mash_impulse: -50.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "mash_impulse",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_same_side_ratio_above_one() {
        let config = SimConfig {
            same_side_ratio: 1.5,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "same_side_ratio",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_rates() {
        let config = SimConfig {
            stamina_regen_rate: -0.05,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "stamina_regen_rate",
                ..
            })
        ));

        let config = SimConfig {
            breath_damping: 1.2,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            fast_cadence_threshold: 0.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var() {
        let name = "SWIM_RACE_TEST_PARSE_VAR";
        env::remove_var(name);
        assert_eq!(parse_var::<f32>(name).unwrap(), None);

        env::set_var(name, " 12.5 ");
        assert_eq!(parse_var::<f32>(name).unwrap(), Some(12.5));

        env::set_var(name, "twelve");
        assert!(matches!(
            parse_var::<f32>(name),
            Err(ConfigError::Parse { name: "SWIM_RACE_TEST_PARSE_VAR", .. })
        ));
        env::remove_var(name);
    }

    // one test owns the SWIM_* variables so parallel tests never see them half-set
    #[test]
    fn test_sim_config_from_env() {
        env::set_var("SWIM_POOL_LENGTH_METERS", "25");
        env::set_var("SWIM_MAX_RACE_TIME", "90");
        let config = SimConfig::from_env().unwrap();
        assert!((config.finish_line() - 500.0).abs() < 1e-4);
        assert_eq!(config.max_race_time, Some(90.0));

        env::set_var("SWIM_MAX_BREATH_TIME", "long");
        assert!(matches!(
            SimConfig::from_env(),
            Err(ConfigError::Parse { name: "SWIM_MAX_BREATH_TIME", .. })
        ));

        env::set_var("SWIM_MAX_BREATH_TIME", "-1");
        assert!(matches!(
            SimConfig::from_env(),
            Err(ConfigError::Invalid { field: "max_breath_time", .. })
        ));

        for name in [
            "SWIM_POOL_LENGTH_METERS",
            "SWIM_MAX_RACE_TIME",
            "SWIM_MAX_BREATH_TIME",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_host_config_from_env() {
        env::set_var("FRAME_RATE", "30");
        env::set_var("SNAPSHOT_EVERY", "0");
        let host = HostConfig::from_env().unwrap();
        assert_eq!(host.frame_rate, 30);
        assert_eq!(host.snapshot_every, 1);

        env::set_var("FRAME_RATE", "0");
        assert!(matches!(
            HostConfig::from_env(),
            Err(ConfigError::Invalid { field: "FRAME_RATE", .. })
        ));

        env::set_var("FRAME_RATE", "fast");
        assert!(matches!(
            HostConfig::from_env(),
            Err(ConfigError::Parse { name: "FRAME_RATE", .. })
        ));

        env::remove_var("FRAME_RATE");
        env::remove_var("SNAPSHOT_EVERY");
        assert_eq!(HostConfig::from_env().unwrap().frame_rate, DEFAULT_FRAME_RATE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "pool_length_meters": 10.0 }"#).unwrap();
        assert!((config.finish_line() - 200.0).abs() < 1e-4);
        assert!((config.max_breath_time - 17.0).abs() < 1e-6);
        assert_eq!(config.max_race_time, None);
    }
}
