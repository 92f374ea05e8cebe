//! Per-frame counters for the debug overlay

use std::collections::VecDeque;

/// Frames averaged for the FPS readout
const FRAME_WINDOW: usize = 10;

/// Rolling average of recent frame times
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    samples: VecDeque<f64>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self { samples: VecDeque::with_capacity(FRAME_WINDOW) }
    }

    /// Record one frame's elapsed time in seconds
    pub fn push(&mut self, elapsed: f64) {
        if self.samples.len() == FRAME_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn fps(&self) -> f64 {
        let avg = self.average();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub fps: f64,
    /// Triangles handed to the draw stage (after all clipping)
    pub triangles: usize,
    pub projection_ms: f64,
    pub clipping_ms: f64,
    pub draw_ms: f64,
    /// Current stage configuration, one word per toggle
    pub modes: String,
}

impl FrameStats {
    /// Lines for the on-screen overlay
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{:.0} FPS", self.fps),
            format!("Tris: {}", self.triangles),
            format!("Projection: {:.1}ms", self.projection_ms),
            format!("Clipping: {:.1}ms", self.clipping_ms),
            format!("Draw: {:.1}ms", self.draw_ms),
            self.modes.clone(),
        ]
    }
}
