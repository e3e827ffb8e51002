//! Core emulator primitives and traits.

pub mod cpu_6507;
pub mod logging;
pub mod types {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u32>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Mutable view of one row of pixels, or `None` past the bottom edge.
        pub fn row_mut(&mut self, y: u32) -> Option<&mut [u32]> {
            if y >= self.height {
                return None;
            }
            let start = (y * self.width) as usize;
            self.pixels.get_mut(start..start + self.width as usize)
        }
    }
}

use serde_json::Value;

/// A media slot exposed by a system, such as the 2600 cartridge port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPointInfo {
    /// Identifier passed to [`System::mount`].
    pub id: String,
    /// Human readable label.
    pub name: String,
    /// Accepted file extensions without the dot (`["a26", "bin"]`).
    pub extensions: Vec<String>,
    /// The system cannot run until this slot is filled.
    pub required: bool,
}

/// Whole-machine interface used by the frontends.
pub trait System {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Power-on reset. Mounted media stays mounted.
    fn reset(&mut self);

    /// Run until the next frame boundary and return the picture.
    fn step_frame(&mut self) -> Result<types::Frame, Self::Error>;

    /// Machine state as JSON. ROM contents are never part of it.
    fn save_state(&self) -> Value;

    /// Restore a state produced by [`System::save_state`]. The media it was
    /// taken with must already be mounted.
    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error>;

    fn supports_save_states(&self) -> bool {
        false
    }

    fn mount_points(&self) -> Vec<MountPointInfo>;

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error>;

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error>;

    fn is_mounted(&self, mount_point_id: &str) -> bool;
}
