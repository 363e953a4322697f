//! Horizontal camera tracking the race leader

use crate::config::SimConfig;

/// Stateless camera. The offset is recomputed from positions every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub lead_margin: f32,
    pub trail_margin: f32,
    pub viewport_width: f32,
    pub track_length: f32,
}

impl Camera {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            lead_margin: config.camera_lead_margin,
            trail_margin: config.camera_trail_margin,
            viewport_width: config.screen_width,
            track_length: config.finish_line(),
        }
    }

    /// Furthest the view may scroll. Zero when the whole track fits.
    pub fn max_scroll(&self) -> f32 {
        (self.track_length - self.viewport_width + self.trail_margin).max(0.0)
    }

    /// Horizontal draw offset (non-positive) keeping the leader in view
    pub fn offset<I>(&self, positions: I) -> f32
    where
        I: IntoIterator<Item = f32>,
    {
        let Some(leader) = positions.into_iter().reduce(f32::max) else {
            return 0.0;
        };
        let scroll = (leader - self.lead_margin).clamp(0.0, self.max_scroll());
        -scroll
    }
}
