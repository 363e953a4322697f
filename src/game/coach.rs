//! Coaching tips for the HUD

use serde::{Deserialize, Serialize};

use super::swimmer::Swimmer;

/// Idle time after which the swimmer is told to stroke again
const STROKE_NOW_AFTER: f32 = 0.9;
const LOW_BREATH_FRACTION: f32 = 0.35;
const LOW_STAMINA: f32 = 0.35;
const HIGH_FATIGUE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tip {
    TooFast,
    StrokeNow,
    Breathe,
    GlideToRecover,
    SlowCadence,
    StopMashing,
    /// Shown when nothing else applies
    KeepRhythm,
}

impl Tip {
    pub fn message(self) -> &'static str {
        match self {
            Tip::TooFast => "Too fast: pause 0.3-0.5s",
            Tip::StrokeNow => "Stroke now",
            Tip::Breathe => "Breathe",
            Tip::GlideToRecover => "Glide 1s to recover",
            Tip::SlowCadence => "Slow cadence",
            Tip::StopMashing => "Penalty: stop mashing",
            Tip::KeepRhythm => "Alternate arms, breathe every 3-5 strokes",
        }
    }
}

/// Tips for a swimmer at host time `now`. Empty once the swimmer is out of the race.
pub fn tips(swimmer: &Swimmer, now: f32) -> Vec<Tip> {
    if !swimmer.is_swimming() {
        return Vec::new();
    }

    let mut tips = Vec::new();

    if let Some(last) = swimmer.last_stroke_time {
        let idle = now - last;
        if idle < swimmer.config().fast_cadence_threshold {
            tips.push(Tip::TooFast);
        } else if idle > STROKE_NOW_AFTER {
            tips.push(Tip::StrokeNow);
        }
    }

    if swimmer.breath_fraction() < LOW_BREATH_FRACTION {
        tips.push(Tip::Breathe);
    }
    if swimmer.stamina < LOW_STAMINA {
        tips.push(Tip::GlideToRecover);
    }
    if swimmer.fatigue > HIGH_FATIGUE {
        tips.push(Tip::SlowCadence);
    }
    if swimmer.penalty_active() {
        tips.push(Tip::StopMashing);
    }

    if tips.is_empty() {
        tips.push(Tip::KeepRhythm);
    }
    tips
}
