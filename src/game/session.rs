//! Real-time race session: frame loop, key routing and snapshot broadcast

use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::util::time::{frame_duration, FrameClock};

use super::controls::Key;
use super::race::{Race, RaceEvent};
use super::snapshot::{RaceSnapshot, RaceSummary, SnapshotBuilder};

/// Command sent from the host to a running session
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Key press stamped with the host clock (seconds)
    Key { key: Key, at: f32 },
    Restart,
    Shutdown,
}

/// Message broadcast by a running session
#[derive(Debug, Clone)]
pub enum SessionMsg {
    Snapshot(RaceSnapshot),
    /// Race left the playing phase
    RaceOver(RaceSummary),
    Restarted,
    /// Session loop exited
    Closed(RaceSummary),
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub snapshot_tx: broadcast::Sender<SessionMsg>,
    clock: FrameClock,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SessionMsg> {
        self.snapshot_tx.subscribe()
    }

    /// Seconds since the session was created; the timestamp base for keys
    pub fn clock_secs(&self) -> f32 {
        self.clock.now_secs()
    }

    /// Send a key stamped with the session clock
    pub async fn press(&self, key: Key) -> bool {
        let at = self.clock_secs();
        self.send(SessionCommand::Key { key, at }).await
    }

    pub async fn restart(&self) -> bool {
        self.send(SessionCommand::Restart).await
    }

    pub async fn shutdown(&self) -> bool {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, command: SessionCommand) -> bool {
        match self.command_tx.send(command).await {
            Ok(()) => true,
            Err(_) => {
                warn!(session_id = %self.id, "Session is gone, command dropped");
                false
            }
        }
    }
}

/// The session task. Owns one race and is its only driver.
pub struct RaceSession {
    id: Uuid,
    race: Race,
    command_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: broadcast::Sender<SessionMsg>,
    snapshot_builder: SnapshotBuilder,
    frame_rate: u32,
    clock: FrameClock,
}

impl RaceSession {
    /// Create a session around `race`, broadcasting every `snapshot_every` frames
    pub fn new(race: Race, frame_rate: u32, snapshot_every: u32) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let clock = FrameClock::new();
        let id = race.id();

        let handle = SessionHandle {
            id,
            command_tx,
            snapshot_tx: snapshot_tx.clone(),
            clock: clock.clone(),
        };

        let session = Self {
            id,
            race,
            command_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_every),
            frame_rate,
            clock,
        };

        (session, handle)
    }

    /// Run the frame loop until shutdown or until every handle is dropped
    pub async fn run(mut self) -> RaceSummary {
        info!(session_id = %self.id, frame_rate = self.frame_rate, "Race session started");

        let mut frame_interval = interval(frame_duration(self.frame_rate));
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = frame_interval.tick() => {
                    self.run_frame();
                }
                command = self.command_rx.recv() => match command {
                    Some(SessionCommand::Key { key, at }) => {
                        if let Some(RaceEvent::Restarted) = self.race.handle_key(key, at) {
                            self.on_restart();
                        }
                    }
                    Some(SessionCommand::Restart) => {
                        self.race.restart();
                        self.on_restart();
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                },
            }
        }

        let summary = RaceSummary::from_race(&self.race);
        let _ = self.snapshot_tx.send(SessionMsg::Closed(summary.clone()));
        info!(session_id = %self.id, phase = ?summary.phase, "Race session closed");
        summary
    }

    fn run_frame(&mut self) {
        if self.race.is_over() {
            return;
        }

        let dt = self.clock.lap(self.race.config().max_frame_dt);
        let events = self.race.tick(dt);
        let phase_changed = events
            .iter()
            .any(|e| matches!(e, RaceEvent::PhaseChanged(_)));

        if phase_changed {
            self.snapshot_builder.force_next();
        }

        if self.snapshot_builder.should_send() {
            let now = self.clock.now_secs();
            let snapshot = self.snapshot_builder.build(&self.race, now);
            let _ = self.snapshot_tx.send(SessionMsg::Snapshot(snapshot));
        }

        if phase_changed {
            let summary = RaceSummary::from_race(&self.race);
            let _ = self.snapshot_tx.send(SessionMsg::RaceOver(summary));
        }
    }

    fn on_restart(&mut self) {
        // first frame after a restart must not include the time spent frozen
        self.clock.lap(0.0);
        self.snapshot_builder.force_next();
        let _ = self.snapshot_tx.send(SessionMsg::Restarted);
    }
}
