//! Tray icon states and their procedurally drawn images.

/// Width and height of the tray icon in pixels.
pub const ICON_SIZE: u32 = 22;

const MIN_RADIUS: u32 = 3;
const MAX_RADIUS: u32 = 8;
const IDLE_RADIUS: f32 = 7.0;

const RECORDING_RGB: [u8; 3] = [0xE5, 0x39, 0x35];
const IDLE_RGB: [u8; 3] = [0x80, 0x80, 0x80];

/// Tray icon states corresponding to the recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready to start recording.
    Idle,
    /// Currently recording; the disc grows with the input level.
    Recording {
        /// Disc radius in pixels.
        radius: u32,
    },
}

impl TrayIconState {
    /// Recording state for a normalized input `level`.
    pub fn recording(level: f32) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let span = (MAX_RADIUS - MIN_RADIUS) as f32;

        Self::Recording {
            radius: MIN_RADIUS + (level * span).round() as u32,
        }
    }

    /// Whether this state shows an active recording.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Hover text for the icon.
    pub fn tooltip(&self) -> &'static str {
        match self {
            Self::Idle => "Pochi - Ready",
            Self::Recording { .. } => "Pochi - Recording...",
        }
    }

    /// RGBA pixels, `ICON_SIZE` x `ICON_SIZE`, row-major.
    ///
    /// Idle is a grey ring, recording a filled red disc. Edges are
    /// anti-aliased by pixel coverage.
    pub fn rgba(&self) -> Vec<u8> {
        let center = ICON_SIZE as f32 / 2.0;
        let mut pixels = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);

        for y in 0..ICON_SIZE {
            for x in 0..ICON_SIZE {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                let distance = (dx * dx + dy * dy).sqrt();

                let (rgb, coverage) = match self {
                    Self::Idle => (IDLE_RGB, 1.0 - (distance - IDLE_RADIUS).abs()),
                    Self::Recording { radius } => {
                        (RECORDING_RGB, *radius as f32 + 0.5 - distance)
                    }
                };
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;

                pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], alpha]);
            }
        }

        pixels
    }
}

/// Elapsed time as `MM:SS`, minutes unbounded.
pub fn timer_title(elapsed: std::time::Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
