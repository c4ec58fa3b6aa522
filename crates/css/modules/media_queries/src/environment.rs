use serde::{Deserialize, Serialize};

/// The virtual device that media queries are answered against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaEnvironment {
    /// Viewport width in CSS pixels.
    pub width: f32,
    /// Viewport height in CSS pixels.
    pub height: f32,
    /// Pixels per `em`; `1024px` wide at 16px/em is `64em`.
    pub em_size: f32,
    /// Bits per color component (`color` feature).
    pub color_bits: u32,
    /// Bits per pixel on a monochrome device, 0 on a color screen.
    pub monochrome_bits: u32,
    /// Whether scripts run on this page (`scripting` feature).
    pub scripting: bool,
}

impl Default for MediaEnvironment {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            em_size: 16.0,
            color_bits: 8,
            monochrome_bits: 0,
            scripting: false,
        }
    }
}

impl MediaEnvironment {
    /// Same screen with the scripting flag replaced.
    #[must_use]
    pub const fn with_scripting(mut self, scripting: bool) -> Self {
        self.scripting = scripting;
        self
    }

    /// Viewport width in `em`.
    pub fn width_em(&self) -> f32 {
        self.width / self.em_size
    }

    /// Viewport height in `em`.
    pub fn height_em(&self) -> f32 {
        self.height / self.em_size
    }

    /// `orientation: landscape` holds when the viewport is at least as wide as it is tall.
    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }
}
