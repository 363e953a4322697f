//! Read-only race views for rendering and end-of-race reporting

use serde::{Deserialize, Serialize};

use super::coach::{self, Tip};
use super::race::{Race, RacePhase};
use super::swimmer::{HudCue, Rgb, Swimmer, SwimmerStatus};

/// Per-swimmer render view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwimmerSnapshot {
    pub name: String,
    pub color: Rgb,
    pub lane_y: f32,
    pub position: f32,
    pub velocity: f32,
    pub stamina: f32,
    pub fatigue: f32,
    pub breath_fraction: f32,
    pub penalty_active: bool,
    pub stroke_count: u32,
    pub status: SwimmerStatus,
    pub cue: HudCue,
    pub tips: Vec<Tip>,
}

impl SwimmerSnapshot {
    pub fn capture(swimmer: &Swimmer, now: f32) -> Self {
        Self {
            name: swimmer.entrant.name.clone(),
            color: swimmer.entrant.color,
            lane_y: swimmer.entrant.lane_y,
            position: swimmer.position,
            velocity: swimmer.velocity,
            stamina: swimmer.stamina,
            fatigue: swimmer.fatigue,
            breath_fraction: swimmer.breath_fraction(),
            penalty_active: swimmer.is_swimming() && swimmer.penalty_active(),
            stroke_count: swimmer.stroke_count,
            status: swimmer.status,
            cue: swimmer.hud_cue(),
            tips: coach::tips(swimmer, now),
        }
    }
}

/// Whole-race render view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub frame: u64,
    pub phase: RacePhase,
    pub race_time: f32,
    pub camera_offset: f32,
    pub swimmers: Vec<SwimmerSnapshot>,
}

/// Decides which frames are broadcast and builds snapshots
pub struct SnapshotBuilder {
    frames_since_snapshot: u32,
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            frames_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.frames_since_snapshot += 1;
        if self.frames_since_snapshot >= self.snapshot_interval {
            self.frames_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for phase changes)
    pub fn force_next(&mut self) {
        self.frames_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot; `now` is the host clock used for cadence tips
    pub fn build(&self, race: &Race, now: f32) -> RaceSnapshot {
        RaceSnapshot {
            frame: race.frame(),
            phase: race.phase().clone(),
            race_time: race.race_time(),
            camera_offset: race.camera_offset(),
            swimmers: race
                .swimmers()
                .iter()
                .map(|s| SwimmerSnapshot::capture(s, now))
                .collect(),
        }
    }
}

/// How a swimmer's race ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placing {
    Winner,
    Finished,
    Drowned,
    StillSwimming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwimmerResult {
    pub name: String,
    pub placing: Placing,
    pub finish_time: Option<f32>,
    pub strokes: u32,
    pub distance_meters: f32,
    /// Distance over finish time, or over race time when unfinished
    pub avg_speed: f32,
}

/// End-of-race report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub phase: RacePhase,
    pub race_time: f32,
    pub results: Vec<SwimmerResult>,
}

impl RaceSummary {
    pub fn from_race(race: &Race) -> Self {
        let winner = race.winner_index();
        let results = race
            .swimmers()
            .iter()
            .enumerate()
            .map(|(idx, swimmer)| {
                let placing = match swimmer.status {
                    SwimmerStatus::Finished { .. } if winner == Some(idx) => Placing::Winner,
                    SwimmerStatus::Finished { .. } => Placing::Finished,
                    SwimmerStatus::Drowned { .. } => Placing::Drowned,
                    SwimmerStatus::Swimming => Placing::StillSwimming,
                };
                let distance_meters = swimmer.distance_meters();
                let elapsed = swimmer.finish_time().unwrap_or(race.race_time());
                let avg_speed = if elapsed > 0.0 {
                    distance_meters / elapsed
                } else {
                    0.0
                };

                SwimmerResult {
                    name: swimmer.name().to_string(),
                    placing,
                    finish_time: swimmer.finish_time(),
                    strokes: swimmer.stroke_count,
                    distance_meters,
                    avg_speed,
                }
            })
            .collect();

        Self {
            phase: race.phase().clone(),
            race_time: race.race_time(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::controls::Key;
    use crate::game::swimmer::Entrant;

    fn race() -> Race {
        Race::new(SimConfig::default(), Entrant::default_roster()).unwrap()
    }

    #[test]
    fn test_should_send_interval() {
        let mut builder = SnapshotBuilder::new(3);
        let sent: Vec<bool> = (0..6).map(|_| builder.should_send()).collect();
        assert_eq!(sent, vec![false, false, true, false, false, true]);

        builder.force_next();
        assert!(builder.should_send());
    }

    #[test]
    fn test_snapshot_mirrors_race() {
        let mut race = race();
        race.handle_key(Key('a'), 0.0);
        race.tick(0.05);

        let snapshot = SnapshotBuilder::new(1).build(&race, 0.05);
        assert_eq!(snapshot.frame, 1);
        assert_eq!(snapshot.phase, RacePhase::Playing);
        assert_eq!(snapshot.swimmers.len(), 2);
        assert_eq!(snapshot.swimmers[0].name, "Red");
        assert_eq!(snapshot.swimmers[0].stroke_count, 1);
        assert!(snapshot.swimmers[0].position > snapshot.swimmers[1].position);
        assert_eq!(snapshot.swimmers[1].tips, vec![Tip::KeepRhythm]);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\""));
    }

    #[test]
    fn test_summary_marks_winner() {
        let mut race = race();
        let finish = race.config().finish_line();
        race.swimmers_mut()[1].position = finish - 0.5;
        race.swimmers_mut()[1].velocity = 40.0;
        race.tick(0.1);

        let summary = RaceSummary::from_race(&race);
        assert_eq!(summary.results[0].placing, Placing::StillSwimming);
        assert_eq!(summary.results[1].placing, Placing::Winner);
        assert_eq!(summary.results[1].finish_time, Some(race.race_time()));
        assert!((summary.results[1].distance_meters - 40.0).abs() < 1e-4);
        assert!(summary.results[1].avg_speed > 0.0);
    }
}
