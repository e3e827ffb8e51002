//! Scanline output
//!
//! The TIA has no framebuffer, so the system hands each finished visible
//! scanline to a [`ScanlineSink`]. Pixels arrive already converted to
//! 0xAARRGGBB.
//!
//! ```text
//! Atari2600System --push_scanline--> FrameRenderer  (same thread, builds a Frame)
//!                                \-> LineHandoff    (bounded channel to another thread)
//! ```

use std::sync::mpsc::{self, Receiver, SyncSender};

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::Frame;

use crate::tia::VISIBLE_WIDTH;

/// Black in 0xAARRGGBB.
pub const BLACK: u32 = 0xFF00_0000;

/// Receiver of completed visible scanlines.
pub trait ScanlineSink {
    /// `line` counts from the first visible row of the frame.
    fn push_scanline(&mut self, line: u16, pixels: &[u32]);
}

impl<S: ScanlineSink + ?Sized> ScanlineSink for &mut S {
    fn push_scanline(&mut self, line: u16, pixels: &[u32]) {
        (**self).push_scanline(line, pixels);
    }
}

/// Collects scanlines into a [`Frame`].
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    frame: Frame,
}

impl FrameRenderer {
    pub fn new(height: u16) -> Self {
        let mut renderer = Self {
            frame: Frame::new(VISIBLE_WIDTH as u32, height as u32),
        };
        renderer.clear(BLACK);
        renderer
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn clear(&mut self, color: u32) {
        self.frame.pixels.fill(color);
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }
}

impl ScanlineSink for FrameRenderer {
    fn push_scanline(&mut self, line: u16, pixels: &[u32]) {
        // Lines below the frame are dropped
        if let Some(row) = self.frame.row_mut(line as u32) {
            let n = row.len().min(pixels.len());
            row[..n].copy_from_slice(&pixels[..n]);
        }
    }
}

/// A scanline in flight between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanline {
    pub line: u16,
    pub pixels: Vec<u32>,
}

/// Sending half of a bounded single-producer, single-consumer scanline
/// channel. The emulation thread blocks when the consumer falls `capacity`
/// lines behind.
pub struct LineHandoff {
    sender: SyncSender<Scanline>,
    disconnected: bool,
}

impl LineHandoff {
    pub fn channel(capacity: usize) -> (Self, Receiver<Scanline>) {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        (
            Self {
                sender,
                disconnected: false,
            },
            receiver,
        )
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl ScanlineSink for LineHandoff {
    fn push_scanline(&mut self, line: u16, pixels: &[u32]) {
        if self.disconnected {
            return;
        }
        let scanline = Scanline {
            line,
            pixels: pixels.to_vec(),
        };
        if self.sender.send(scanline).is_err() {
            log(LogCategory::TIA, LogLevel::Debug, || {
                "TIA: scanline receiver dropped, discarding further lines".to_string()
            });
            self.disconnected = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_frame_renderer_starts_black() {
        let renderer = FrameRenderer::new(192);
        let frame = renderer.frame();
        assert_eq!(frame.width, 160);
        assert_eq!(frame.height, 192);
        assert!(frame.pixels.iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_frame_renderer_places_rows() {
        let mut renderer = FrameRenderer::new(4);
        renderer.push_scanline(2, &[0xFFFF_0000; 160]);

        let frame = renderer.frame();
        assert_eq!(frame.pixels[2 * 160], 0xFFFF_0000);
        assert_eq!(frame.pixels[2 * 160 + 159], 0xFFFF_0000);
        assert_eq!(frame.pixels[160], BLACK);
    }

    #[test]
    fn test_frame_renderer_drops_lines_past_bottom() {
        let mut renderer = FrameRenderer::new(4);
        renderer.push_scanline(4, &[0xFFFF_FFFF; 160]);
        assert!(renderer.frame().pixels.iter().all(|&p| p == BLACK));
    }

    #[test]
    fn test_short_line_fills_row_prefix() {
        let mut renderer = FrameRenderer::new(2);
        renderer.push_scanline(0, &[0xFF12_3456; 4]);
        let frame = renderer.into_frame();
        assert_eq!(frame.pixels[3], 0xFF12_3456);
        assert_eq!(frame.pixels[4], BLACK);
    }

    #[test]
    fn test_line_handoff_crosses_threads() {
        let (mut handoff, receiver) = LineHandoff::channel(2);
        let consumer = thread::spawn(move || receiver.iter().collect::<Vec<_>>());

        for line in 0..10u16 {
            handoff.push_scanline(line, &[line as u32; 160]);
        }
        drop(handoff);

        let lines = consumer.join().unwrap();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[9].line, 9);
        assert_eq!(lines[9].pixels[0], 9);
    }

    #[test]
    fn test_line_handoff_survives_dropped_receiver() {
        let (mut handoff, receiver) = LineHandoff::channel(1);
        drop(receiver);
        handoff.push_scanline(0, &[0; 160]);
        assert!(handoff.is_disconnected());
        handoff.push_scanline(1, &[0; 160]);
    }
}
