//! Atari 2600 cartridge ROM
//!
//! A cartridge is a flat read-only image mapped into the cartridge window
//! (4K at $1000-$1FFF on a stock console). 2K images mirror into both halves
//! of a 4K window, since A11 is simply not connected on those boards. Any other
//! image shorter than the window leaves the tail unmapped, and reads there
//! return [`CARTRIDGE_SENTINEL`].

use thiserror::Error;

/// Value returned for reads past the end of a non-mirrored image.
pub const CARTRIDGE_SENTINEL: u8 = 0xFF;

/// Smallest image size that is mirrored across the window.
const MIN_MIRRORED_SIZE: usize = 2048;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("Empty ROM image")]
    Empty,
    #[error("ROM image of {size} bytes does not fit the {window}-byte cartridge window")]
    TooLarge { size: usize, window: usize },
}

#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Vec<u8>,
    mirrored: bool,
}

impl Cartridge {
    /// Load `image` for a cartridge window of `window` bytes.
    pub fn load(image: &[u8], window: usize) -> Result<Self, CartridgeError> {
        if image.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if image.len() > window {
            return Err(CartridgeError::TooLarge {
                size: image.len(),
                window,
            });
        }

        let mirrored = image.len() >= MIN_MIRRORED_SIZE && window % image.len() == 0;
        Ok(Self {
            rom: image.to_vec(),
            mirrored,
        })
    }

    /// Read the byte at `offset` within the cartridge window.
    pub fn read(&self, offset: u16) -> u8 {
        let offset = offset as usize;
        if self.mirrored {
            self.rom[offset % self.rom.len()]
        } else {
            self.rom.get(offset).copied().unwrap_or(CARTRIDGE_SENTINEL)
        }
    }

    pub fn size(&self) -> usize {
        self.rom.len()
    }

    #[cfg(test)]
    fn is_mirrored(&self) -> bool {
        self.mirrored
    }
}
