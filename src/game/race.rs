//! Race state machine: roster, frame stepping and win detection

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{ConfigError, SimConfig};

use super::camera::Camera;
use super::controls::Key;
use super::swimmer::{Entrant, Swimmer, SwimmerOutcome};

/// Race phase. Leaves `Playing` at most once per race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RacePhase {
    Playing,
    Won { winner: usize, name: String },
    AllDrowned,
    /// Race clock hit `max_race_time` with nobody finished
    TimeExpired,
}

/// Something that happened during a frame or on input
#[derive(Debug, Clone, PartialEq)]
pub enum RaceEvent {
    Finished { swimmer: usize, finish_time: f32 },
    Drowned { swimmer: usize },
    PhaseChanged(RacePhase),
    Restarted,
}

/// The race orchestrator. Owns every swimmer; nothing else mutates them.
pub struct Race {
    id: Uuid,
    config: Arc<SimConfig>,
    camera: Camera,
    roster: Vec<Entrant>,
    swimmers: Vec<Swimmer>,
    phase: RacePhase,
    /// Sum of clamped frame steps since the last restart
    race_time: f32,
    frame: u64,
}

impl Race {
    /// Create a race ready to play
    pub fn new(config: SimConfig, roster: Vec<Entrant>) -> Result<Self, ConfigError> {
        config.validate()?;
        if roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        let config = Arc::new(config);
        let swimmers = Self::line_up(&roster, &config);
        let race = Self {
            id: Uuid::new_v4(),
            camera: Camera::new(&config),
            config,
            roster,
            swimmers,
            phase: RacePhase::Playing,
            race_time: 0.0,
            frame: 0,
        };

        info!(race_id = %race.id, swimmers = race.swimmers.len(), "Race created");
        Ok(race)
    }

    fn line_up(roster: &[Entrant], config: &Arc<SimConfig>) -> Vec<Swimmer> {
        roster
            .iter()
            .cloned()
            .map(|entrant| Swimmer::new(entrant, Arc::clone(config)))
            .collect()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> &RacePhase {
        &self.phase
    }

    pub fn race_time(&self) -> f32 {
        self.race_time
    }

    /// Frames simulated since the last restart
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn swimmers(&self) -> &[Swimmer] {
        &self.swimmers
    }

    /// Direct access for scenario setup in tests and tools
    pub fn swimmers_mut(&mut self) -> &mut [Swimmer] {
        &mut self.swimmers
    }

    pub fn is_over(&self) -> bool {
        self.phase != RacePhase::Playing
    }

    pub fn winner_index(&self) -> Option<usize> {
        match self.phase {
            RacePhase::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }

    /// Current horizontal draw offset
    pub fn camera_offset(&self) -> f32 {
        self.camera.offset(self.swimmers.iter().map(|s| s.position))
    }

    /// Put every swimmer back on the wall and start over
    pub fn restart(&mut self) {
        self.swimmers = Self::line_up(&self.roster, &self.config);
        self.phase = RacePhase::Playing;
        self.race_time = 0.0;
        self.frame = 0;
        info!(race_id = %self.id, "Race restarted");
    }

    /// Route a key press. `at` is the host's monotonic clock in seconds.
    ///
    /// The restart key restarts a finished race; any other key goes to every
    /// swimmer while the race is playing and is dropped once it is frozen.
    pub fn handle_key(&mut self, key: Key, at: f32) -> Option<RaceEvent> {
        if self.is_over() {
            if key == Key::RESTART {
                self.restart();
                return Some(RaceEvent::Restarted);
            }
            return None;
        }

        for swimmer in &mut self.swimmers {
            swimmer.handle_input(key, at);
        }
        None
    }

    /// Advance one frame. `dt` is clamped to `[0, max_frame_dt]`; NaN counts as 0.
    /// Does nothing once the race has left `Playing`.
    pub fn tick(&mut self, dt: f32) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }

        let dt = if dt > 0.0 {
            dt.min(self.config.max_frame_dt)
        } else {
            0.0
        };
        self.frame += 1;
        self.race_time += dt;

        let mut finishers = Vec::new();
        for (idx, swimmer) in self.swimmers.iter_mut().enumerate() {
            match swimmer.update(dt, self.race_time) {
                Some(SwimmerOutcome::Finished) => {
                    debug!(
                        race_id = %self.id,
                        swimmer = %swimmer.name(),
                        race_time = self.race_time,
                        "Swimmer finished"
                    );
                    finishers.push(idx);
                    events.push(RaceEvent::Finished {
                        swimmer: idx,
                        finish_time: self.race_time,
                    });
                }
                Some(SwimmerOutcome::Drowned) => {
                    debug!(
                        race_id = %self.id,
                        swimmer = %swimmer.name(),
                        race_time = self.race_time,
                        "Swimmer drowned"
                    );
                    events.push(RaceEvent::Drowned { swimmer: idx });
                }
                None => {}
            }
        }

        if let Some(next) = self.evaluate(&finishers) {
            info!(race_id = %self.id, phase = ?next, race_time = self.race_time, "Race phase changed");
            self.phase = next.clone();
            events.push(RaceEvent::PhaseChanged(next));
        }

        events
    }

    fn evaluate(&self, finishers: &[usize]) -> Option<RacePhase> {
        if let Some(winner) = self.pick_winner(finishers) {
            return Some(RacePhase::Won {
                winner,
                name: self.swimmers[winner].name().to_string(),
            });
        }

        if self.swimmers.iter().all(Swimmer::is_drowned) {
            return Some(RacePhase::AllDrowned);
        }

        match self.config.max_race_time {
            Some(limit) if self.race_time >= limit => Some(RacePhase::TimeExpired),
            _ => None,
        }
    }

    /// Lowest finish time, then earliest crossing within the frame, then roster order
    fn pick_winner(&self, finishers: &[usize]) -> Option<usize> {
        let key = |idx: usize| {
            let swimmer = &self.swimmers[idx];
            (
                swimmer.finish_time().unwrap_or(f32::INFINITY),
                swimmer.crossing_lag().unwrap_or(f32::INFINITY),
            )
        };

        finishers.iter().copied().min_by(|&a, &b| {
            let (time_a, lag_a) = key(a);
            let (time_b, lag_b) = key(b);
            time_a
                .total_cmp(&time_b)
                .then(lag_a.total_cmp(&lag_b))
                .then(a.cmp(&b))
        })
    }
}
