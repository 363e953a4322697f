//! Race simulation modules

pub mod camera;
pub mod coach;
pub mod controls;
pub mod physics;
pub mod race;
pub mod session;
pub mod snapshot;
pub mod swimmer;

pub use camera::Camera;
pub use controls::{Action, ControlScheme, Key, Side};
pub use race::{Race, RaceEvent, RacePhase};
pub use session::{RaceSession, SessionCommand, SessionHandle, SessionMsg};
pub use snapshot::{RaceSnapshot, RaceSummary, SnapshotBuilder};
pub use swimmer::{Entrant, HudCue, Rgb, Swimmer, SwimmerEvent, SwimmerOutcome, SwimmerStatus};
