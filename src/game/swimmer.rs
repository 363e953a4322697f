//! Swimmer state and its transition rules
//!
//! A swimmer consumes key events and frame steps. Resources are clamped at
//! the point of mutation, so stamina and fatigue stay in [0, 1], breath stays
//! in [0, max_breath_time] and position stays in [0, finish_line].
//!
//! Timestamps passed to [`Swimmer::handle_input`] and race times passed to
//! [`Swimmer::update`] must be monotonically non-decreasing; they are not
//! validated here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

use super::controls::{Action, ControlScheme, Key, Side};
use super::physics::SwimPhysics;

/// Display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Identity and bindings of one roster slot. Survives restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,
    pub color: Rgb,
    /// Vertical lane offset, cosmetic only
    pub lane_y: f32,
    pub controls: ControlScheme,
}

impl Entrant {
    pub fn new(name: impl Into<String>, color: Rgb, lane_y: f32, controls: ControlScheme) -> Self {
        Self {
            name: name.into(),
            color,
            lane_y,
            controls,
        }
    }

    /// The two-lane reference roster: Red on WASD, Blue on IJKL
    pub fn default_roster() -> Vec<Entrant> {
        vec![
            Entrant::new("Red", Rgb(255, 50, 50), 150.0, ControlScheme::wasd()),
            Entrant::new("Blue", Rgb(50, 50, 255), 350.0, ControlScheme::ijkl()),
        ]
    }
}

/// Lifecycle of a swimmer. Both non-swimming states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SwimmerStatus {
    Swimming,
    Drowned {
        /// Cosmetic sink depth in pixels
        sink_offset: f32,
    },
    Finished {
        /// Race time at which the finish was detected
        finish_time: f32,
        /// Seconds into the finishing frame at which the line was crossed
        crossing_lag: f32,
    },
}

/// Terminal transition produced by a frame step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwimmerOutcome {
    Drowned,
    Finished,
}

/// Input to the pure transition function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwimmerEvent {
    Key { key: Key, at: f32 },
    Frame { dt: f32, race_time: f32 },
}

/// Status label shown above a swimmer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum HudCue {
    Drowned,
    Finished { finish_time: f32 },
    TooFast,
    Breathe,
    None,
}

/// One racer's full simulation state
#[derive(Debug, Clone)]
pub struct Swimmer {
    pub entrant: Entrant,
    config: Arc<SimConfig>,

    // Kinematics
    pub position: f32,
    /// Thrust/drag accumulator, negative only during a cadence penalty
    pub velocity: f32,

    // Resources
    pub stamina: f32,
    pub fatigue: f32,
    /// Seconds of breath left
    pub breath: f32,

    // Stroke timing
    pub last_stroke_time: Option<f32>,
    pub last_stroke_side: Option<Side>,
    pub stroke_count: u32,
    pub penalty_timer: f32,

    pub status: SwimmerStatus,
}

impl Swimmer {
    /// Fresh swimmer at the start wall
    pub fn new(entrant: Entrant, config: Arc<SimConfig>) -> Self {
        Self {
            position: config.start_offset,
            velocity: 0.0,
            stamina: 1.0,
            fatigue: 0.0,
            breath: config.max_breath_time,
            last_stroke_time: None,
            last_stroke_side: None,
            stroke_count: 0,
            penalty_timer: 0.0,
            status: SwimmerStatus::Swimming,
            entrant,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.entrant.name
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_swimming(&self) -> bool {
        matches!(self.status, SwimmerStatus::Swimming)
    }

    pub fn is_drowned(&self) -> bool {
        matches!(self.status, SwimmerStatus::Drowned { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, SwimmerStatus::Finished { .. })
    }

    pub fn sink_offset(&self) -> f32 {
        match self.status {
            SwimmerStatus::Drowned { sink_offset } => sink_offset,
            _ => 0.0,
        }
    }

    pub fn finish_time(&self) -> Option<f32> {
        match self.status {
            SwimmerStatus::Finished { finish_time, .. } => Some(finish_time),
            _ => None,
        }
    }

    pub fn crossing_lag(&self) -> Option<f32> {
        match self.status {
            SwimmerStatus::Finished { crossing_lag, .. } => Some(crossing_lag),
            _ => None,
        }
    }

    /// Breath left as a fraction of a full breath
    pub fn breath_fraction(&self) -> f32 {
        self.breath / self.config.max_breath_time
    }

    pub fn penalty_active(&self) -> bool {
        self.penalty_timer > 0.0
    }

    pub fn breath_low(&self) -> bool {
        self.breath < self.config.low_breath_threshold
    }

    /// Distance covered from the start wall, in meters
    pub fn distance_meters(&self) -> f32 {
        self.position / self.config.pixels_per_meter
    }

    pub fn hud_cue(&self) -> HudCue {
        match self.status {
            SwimmerStatus::Drowned { .. } => HudCue::Drowned,
            SwimmerStatus::Finished { finish_time, .. } => HudCue::Finished { finish_time },
            SwimmerStatus::Swimming if self.penalty_active() => HudCue::TooFast,
            SwimmerStatus::Swimming if self.breath_low() => HudCue::Breathe,
            SwimmerStatus::Swimming => HudCue::None,
        }
    }

    /// Pure transition: consume `self` and an event, return the next state
    pub fn transition(mut self, event: SwimmerEvent) -> Self {
        self.apply(event);
        self
    }

    /// Apply an event in place
    pub fn apply(&mut self, event: SwimmerEvent) -> Option<SwimmerOutcome> {
        match event {
            SwimmerEvent::Key { key, at } => {
                self.handle_input(key, at);
                None
            }
            SwimmerEvent::Frame { dt, race_time } => self.update(dt, race_time),
        }
    }

    /// Dispatch a key press. Keys outside this swimmer's scheme are ignored.
    pub fn handle_input(&mut self, key: Key, at: f32) -> Option<Action> {
        if !self.is_swimming() {
            return None;
        }

        let action = self.entrant.controls.action_for(key)?;
        match action {
            Action::Stroke(side) => self.stroke(side, at),
            Action::Kick => self.kick(),
            Action::Breathe => self.breathe(),
        }
        Some(action)
    }

    fn stroke(&mut self, side: Side, at: f32) {
        let config = &self.config;
        let gap = self.last_stroke_time.map(|last| at - last);
        let mashing = gap.is_some_and(|gap| gap < config.fast_cadence_threshold);

        if mashing {
            self.velocity -= config.mash_impulse;
            self.penalty_timer = config.penalty_window;
            self.fatigue = SwimPhysics::unit(self.fatigue + config.mash_fatigue_cost);
        } else {
            self.velocity += SwimPhysics::stroke_thrust(
                gap,
                self.last_stroke_side,
                side,
                self.stamina,
                self.fatigue,
                config,
            );
        }

        self.last_stroke_time = Some(at);
        self.last_stroke_side = Some(side);
        self.stroke_count += 1;

        self.stamina = SwimPhysics::unit(self.stamina - config.stroke_stamina_cost);
        self.fatigue = SwimPhysics::unit(self.fatigue + config.stroke_fatigue_cost);
    }

    fn kick(&mut self) {
        self.velocity += self.config.kick_thrust * self.stamina;
        self.stamina = SwimPhysics::unit(self.stamina - self.config.kick_stamina_cost);
    }

    fn breathe(&mut self) {
        self.breath = self.config.max_breath_time;
        self.velocity *= self.config.breath_damping;
        self.stamina = SwimPhysics::unit(self.stamina + self.config.breath_stamina_restore);
    }

    /// Advance one frame. `dt` must already be clamped by the caller.
    pub fn update(&mut self, dt: f32, race_time: f32) -> Option<SwimmerOutcome> {
        let dt = dt.max(0.0);

        match &mut self.status {
            SwimmerStatus::Finished { .. } => return None,
            SwimmerStatus::Drowned { sink_offset } => {
                self.velocity = 0.0;
                *sink_offset += self.config.sink_rate * dt;
                return None;
            }
            SwimmerStatus::Swimming => {}
        }

        let config = Arc::clone(&self.config);

        // Breath hold
        self.breath -= dt;
        if self.breath <= 0.0 {
            self.breath = 0.0;
            self.velocity = 0.0;
            self.status = SwimmerStatus::Drowned { sink_offset: 0.0 };
            return Some(SwimmerOutcome::Drowned);
        }

        // Recovery
        self.stamina = SwimPhysics::unit(self.stamina + config.stamina_regen_rate * dt);
        self.fatigue = SwimPhysics::unit(self.fatigue - config.fatigue_decay_rate * dt);
        if self.penalty_timer > 0.0 {
            self.penalty_timer = (self.penalty_timer - dt).max(0.0);
        }

        // Drag
        let drag = SwimPhysics::drag_coefficient(self.breath, &config);
        self.velocity = SwimPhysics::apply_drag(self.velocity, drag, dt);
        if self.velocity < 0.0 && !self.penalty_active() {
            self.velocity = 0.0;
        }

        // Move, never behind the start wall
        self.position = (self.position + self.velocity * dt).max(0.0);

        let finish_line = config.finish_line();
        if self.position >= finish_line {
            let overshoot = self.position - finish_line;
            let crossing_lag = if self.velocity > 0.0 {
                (dt - overshoot / self.velocity).clamp(0.0, dt)
            } else {
                0.0
            };
            self.position = finish_line;
            self.status = SwimmerStatus::Finished {
                finish_time: race_time,
                crossing_lag,
            };
            return Some(SwimmerOutcome::Finished);
        }

        None
    }
}
