//! Headless replay of scripted key presses at a fixed frame step

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, SimConfig};
use crate::game::snapshot::{RaceSnapshot, RaceSummary, SnapshotBuilder};
use crate::game::{Entrant, Key, Race};

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

/// One scripted key press
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedKey {
    /// Host time in seconds
    pub at: f32,
    pub key: Key,
}

/// A replay script as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
    /// Stop after this many seconds even if the race is still on
    pub duration: f32,
    /// Alternate tuning; defaults apply when absent
    #[serde(default)]
    pub config: Option<SimConfig>,
    /// Alternate roster; the two-lane reference roster when absent
    #[serde(default)]
    pub roster: Option<Vec<Entrant>>,
    #[serde(default)]
    pub events: Vec<ScriptedKey>,
}

/// Result of a replay run
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub frames: u64,
    pub summary: RaceSummary,
    pub final_snapshot: RaceSnapshot,
}

impl ReplayScript {
    /// Read and validate a script file
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ReplayError> {
        let script: Self = serde_json::from_str(raw)?;
        script.validate()?;
        Ok(script)
    }

    /// Frame step must be positive and key times non-decreasing
    pub fn validate(&self) -> Result<(), ReplayError> {
        if !(self.frame_dt > 0.0) {
            return Err(ReplayError::Invalid("frame_dt must be greater than zero"));
        }
        if !(self.duration >= 0.0) {
            return Err(ReplayError::Invalid("duration must not be negative"));
        }

        for (index, pair) in self.events.windows(2).enumerate() {
            if pair[1].at < pair[0].at {
                return Err(ReplayError::NonMonotonic {
                    index: index + 1,
                    at: pair[1].at,
                });
            }
        }
        Ok(())
    }

    /// Drive a fresh race through the script.
    ///
    /// Keys stamped at or before a frame's start time are applied before that
    /// frame is stepped. Stops when the race leaves the playing phase or the
    /// script duration elapses.
    pub fn run(&self) -> Result<ReplayOutcome, ReplayError> {
        self.validate()?;

        let config = self.config.clone().unwrap_or_default();
        let roster = self
            .roster
            .clone()
            .unwrap_or_else(Entrant::default_roster);
        let mut race = Race::new(config, roster)?;

        info!(
            race_id = %race.id(),
            events = self.events.len(),
            duration = self.duration,
            "Replaying script"
        );

        let mut pending = self.events.iter().peekable();
        let mut frames: u64 = 0;
        loop {
            let clock = frames as f32 * self.frame_dt;
            if race.is_over() || clock >= self.duration {
                break;
            }

            while let Some(event) = pending.next_if(|e| e.at <= clock) {
                race.handle_key(event.key, event.at);
            }

            for event in race.tick(self.frame_dt) {
                debug!(frame = frames, ?event, "Replay event");
            }
            frames += 1;
        }

        let now = frames as f32 * self.frame_dt;
        let summary = RaceSummary::from_race(&race);
        info!(race_id = %race.id(), frames, phase = ?summary.phase, "Replay finished");

        Ok(ReplayOutcome {
            frames,
            final_snapshot: SnapshotBuilder::new(1).build(&race, now),
            summary,
        })
    }
}

/// Replay errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read replay script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed replay script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Script events out of order: event {index} at {at}s precedes the one before it")]
    NonMonotonic { index: usize, at: f32 },

    #[error("Invalid replay script: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::snapshot::Placing;
    use crate::game::RacePhase;

    fn rhythm(left: char, right: char, strokes: usize, breathe: char) -> Vec<ScriptedKey> {
        let mut events: Vec<ScriptedKey> = (1..=strokes)
            .map(|k| ScriptedKey {
                at: 0.5 * k as f32,
                key: Key(if k % 2 == 0 { left } else { right }),
            })
            .collect();
        events.extend((0..6).map(|j| ScriptedKey {
            at: 4.25 + 4.0 * j as f32,
            key: Key(breathe),
        }));
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        events
    }

    fn script(events: Vec<ScriptedKey>) -> ReplayScript {
        ReplayScript {
            frame_dt: 1.0 / 60.0,
            duration: 30.0,
            config: None,
            roster: None,
            events,
        }
    }

    #[test]
    fn test_steady_rhythm_wins() {
        let outcome = script(rhythm('a', 'd', 59, 'w')).run().unwrap();

        assert_eq!(
            outcome.summary.phase,
            RacePhase::Won {
                winner: 0,
                name: "Red".to_string()
            }
        );
        let red = &outcome.summary.results[0];
        assert_eq!(red.placing, Placing::Winner);
        let finish = red.finish_time.unwrap();
        assert!(finish > 9.0 && finish < 13.0, "finish at {finish}");
        assert_eq!(outcome.summary.results[1].placing, Placing::StillSwimming);
        assert_eq!(outcome.final_snapshot.swimmers[0].position, 800.0);
    }

    #[test]
    fn test_idle_swimmers_drown() {
        let outcome = script(Vec::new()).run().unwrap();
        assert_eq!(outcome.summary.phase, RacePhase::AllDrowned);
        assert!(outcome.frames > 1000 && outcome.frames < 1030);
    }

    #[test]
    fn test_duration_cuts_run_short() {
        let mut short = script(Vec::new());
        short.duration = 1.0;
        let outcome = short.run().unwrap();
        assert_eq!(outcome.frames, 60);
        assert_eq!(outcome.summary.phase, RacePhase::Playing);
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{
            "duration": 2.0,
            "config": { "pool_length_meters": 2.0 },
            "events": [ { "at": 0.0, "key": "a" }, { "at": 0.5, "key": "d" } ]
        }"#;
        let script = ReplayScript::from_json(raw).unwrap();
        assert!((script.frame_dt - 1.0 / 60.0).abs() < 1e-9);

        let outcome = script.run().unwrap();
        assert_eq!(outcome.summary.results[0].placing, Placing::Winner);
    }

    #[test]
    fn test_out_of_order_events_rejected() {
        let raw = r#"{ "duration": 1.0, "events": [ { "at": 0.5, "key": "a" }, { "at": 0.2, "key": "d" } ] }"#;
        assert!(matches!(
            ReplayScript::from_json(raw),
            Err(ReplayError::NonMonotonic { index: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_config_surfaces() {
        let raw = r#"{ "duration": 1.0, "config": { "max_frame_dt": 0.0 } }"#;
        let script = ReplayScript::from_json(raw).unwrap();
        assert!(matches!(
            script.run(),
            Err(ReplayError::Config(ConfigError::Invalid { .. }))
        ));
    }
}
