//! Stroke thrust and water drag formulas

use crate::config::SimConfig;

use super::controls::Side;

/// Physics system for stroke thrust, drag and resource bookkeeping
pub struct SwimPhysics;

impl SwimPhysics {
    /// Timing efficiency of a stroke taken `gap` seconds after the previous one.
    /// Gaussian around the ideal interval, in (0, 1]. `None` is the first stroke.
    pub fn timing_efficiency(gap: Option<f32>, config: &SimConfig) -> f32 {
        match gap {
            Some(gap) => {
                let off = gap - config.stroke_target_interval;
                let sigma = config.stroke_timing_sigma;
                (-(off * off) / (2.0 * sigma * sigma)).exp()
            }
            None => config.first_stroke_efficiency,
        }
    }

    /// Full bonus for alternating arms, reduced for repeating one
    pub fn alternation_bonus(previous: Option<Side>, side: Side, config: &SimConfig) -> f32 {
        if previous == Some(side) {
            config.same_side_ratio
        } else {
            1.0
        }
    }

    /// Thrust multiplier from stamina. Stays positive at zero stamina.
    pub fn stamina_factor(stamina: f32) -> f32 {
        0.5 + 0.5 * stamina
    }

    /// Thrust multiplier from fatigue. Never reaches zero.
    pub fn fatigue_factor(fatigue: f32) -> f32 {
        1.0 - 0.5 * fatigue
    }

    /// Forward thrust of a correctly-paced stroke
    pub fn stroke_thrust(
        gap: Option<f32>,
        previous: Option<Side>,
        side: Side,
        stamina: f32,
        fatigue: f32,
        config: &SimConfig,
    ) -> f32 {
        config.base_thrust
            * Self::timing_efficiency(gap, config)
            * Self::alternation_bonus(previous, side, config)
            * Self::stamina_factor(stamina)
            * Self::fatigue_factor(fatigue)
    }

    /// Drag coefficient for the current breath level
    pub fn drag_coefficient(breath: f32, config: &SimConfig) -> f32 {
        if breath < config.low_breath_threshold {
            config.base_drag + config.low_breath_drag
        } else {
            config.base_drag
        }
    }

    /// Velocity after decaying over `dt` seconds
    pub fn apply_drag(velocity: f32, drag: f32, dt: f32) -> f32 {
        velocity * (-drag * dt).exp()
    }

    /// Clamp a resource to the unit interval
    pub fn unit(value: f32) -> f32 {
        value.clamp(0.0, 1.0)
    }
}
