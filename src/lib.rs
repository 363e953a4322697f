//! Swim Race - two-lane real-time swimming race simulation
//!
//! Swimmers advance by alternating correctly-timed strokes while managing
//! stamina, fatigue and a breath-hold countdown that drowns them if it runs
//! out. The core is a frame-stepped state machine ([`game::Race`]) with two
//! host drivers: a real-time tokio session and a headless replay runner.

pub mod config;
pub mod game;
pub mod replay;
pub mod util;
