//! Per-scanline object generators
//!
//! Each moving object (two players, two missiles, the ball) renders into a
//! 160-entry boolean line buffer whenever its registers change. The pixel
//! stage then only has to look up one entry per object per color clock.

use serde::{Deserialize, Serialize};

use crate::serde_arrays;

pub const VISIBLE_WIDTH: usize = 160;

/// Number of playfield cells across the visible line.
pub const PLAYFIELD_CELLS: usize = 40;
/// Color clocks per playfield cell.
const CELL_WIDTH: usize = VISIBLE_WIDTH / PLAYFIELD_CELLS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Object {
    P0,
    P1,
    M0,
    M1,
    BL,
}

impl Object {
    pub const ALL: [Object; 5] = [Object::P0, Object::P1, Object::M0, Object::M1, Object::BL];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Copy offsets and pixel scale for a NUSIZ number/size value.
pub fn nusiz_layout(nusiz: u8) -> (&'static [usize], usize) {
    match nusiz & 0x07 {
        0 => (&[0], 1),
        1 => (&[0, 16], 1),
        2 => (&[0, 32], 1),
        3 => (&[0, 16, 32], 1),
        4 => (&[0, 64], 1),
        5 => (&[0], 2),
        6 => (&[0, 32, 64], 1),
        _ => (&[0], 4),
    }
}

/// Offset from a player's position to the pixel a locked missile sits on.
pub fn player_centre(nusiz: u8) -> u16 {
    match nusiz_layout(nusiz).1 {
        1 => 3,
        2 => 6,
        _ => 10,
    }
}

/// Signed motion held in the high nibble of an HMxx register.
pub fn motion_offset(hm: u8) -> i16 {
    ((hm as i8) >> 4) as i16
}

/// Apply a motion offset to a position, clamped at the left edge.
pub fn apply_motion(position: u16, offset: i16) -> u16 {
    (position as i16 + offset).max(0) as u16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectGenerator {
    #[serde(with = "serde_arrays")]
    line: [bool; VISIBLE_WIDTH],
    position: u16,
    reset_this_line: bool,
}

impl Default for ObjectGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGenerator {
    pub fn new() -> Self {
        Self {
            line: [false; VISIBLE_WIDTH],
            position: 0,
            reset_this_line: false,
        }
    }

    pub fn is_set(&self, x: usize) -> bool {
        self.line[x]
    }

    pub fn line(&self) -> &[bool; VISIBLE_WIDTH] {
        &self.line
    }

    pub fn position(&self) -> u16 {
        self.position
    }

    pub fn set_position(&mut self, position: u16) {
        self.position = position % VISIBLE_WIDTH as u16;
    }

    /// Position capture from a RESxx strobe.
    pub fn reset_to(&mut self, position: u16) {
        self.set_position(position);
        self.reset_this_line = true;
    }

    #[cfg(test)]
    pub(crate) fn was_reset_this_line(&self) -> bool {
        self.reset_this_line
    }

    /// Start of the visible region: move by `offset` unless the object was
    /// repositioned on this line.
    pub fn commit_motion(&mut self, offset: i16) {
        if !self.reset_this_line {
            self.set_position(apply_motion(self.position, offset));
        }
    }

    pub fn end_scanline(&mut self) {
        self.reset_this_line = false;
    }

    fn origin(&self, motion: i16) -> usize {
        apply_motion(self.position, motion) as usize
    }

    fn plot(&mut self, x: usize) {
        self.line[x % VISIBLE_WIDTH] = true;
    }

    pub fn draw_player(&mut self, graphics: u8, nusiz: u8, reflect: bool, motion: i16) {
        self.line = [false; VISIBLE_WIDTH];
        if graphics == 0 {
            return;
        }

        let origin = self.origin(motion);
        let (copies, scale) = nusiz_layout(nusiz);
        for &copy in copies {
            for bit in 0..8 {
                let mask = if reflect { 0x01 << bit } else { 0x80 >> bit };
                if graphics & mask == 0 {
                    continue;
                }
                for s in 0..scale {
                    self.plot(origin + copy + bit * scale + s);
                }
            }
        }
    }

    pub fn draw_missile(&mut self, enabled: bool, nusiz: u8, motion: i16) {
        self.line = [false; VISIBLE_WIDTH];
        if !enabled {
            return;
        }

        let origin = self.origin(motion);
        let width = 1usize << ((nusiz >> 4) & 0x03);
        let (copies, _) = nusiz_layout(nusiz);
        for &copy in copies {
            for w in 0..width {
                self.plot(origin + copy + w);
            }
        }
    }

    pub fn draw_ball(&mut self, enabled: bool, ctrlpf: u8, motion: i16) {
        self.line = [false; VISIBLE_WIDTH];
        if !enabled {
            return;
        }

        let origin = self.origin(motion);
        let width = 1usize << ((ctrlpf >> 4) & 0x03);
        for w in 0..width {
            self.plot(origin + w);
        }
    }
}

/// The 40-cell playfield. The left half comes straight from PF0/PF1/PF2, the
/// right half repeats or mirrors it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playfield {
    #[serde(with = "serde_arrays")]
    cells: [bool; PLAYFIELD_CELLS],
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Playfield {
    pub fn new() -> Self {
        Self {
            cells: [false; PLAYFIELD_CELLS],
        }
    }

    pub fn recompute(&mut self, pf0: u8, pf1: u8, pf2: u8, reflect: bool) {
        let half = PLAYFIELD_CELLS / 2;
        for cell in 0..half {
            self.cells[cell] = half_cell(pf0, pf1, pf2, cell);
            let mirror = if reflect { half - 1 - cell } else { cell };
            self.cells[half + mirror] = self.cells[cell];
        }
    }

    pub fn is_set(&self, x: usize) -> bool {
        self.cells[x / CELL_WIDTH]
    }
}

/// PF0 bits 4-7, then PF1 bits 7-0, then PF2 bits 0-7.
fn half_cell(pf0: u8, pf1: u8, pf2: u8, cell: usize) -> bool {
    match cell {
        0..=3 => pf0 & (0x10 << cell) != 0,
        4..=11 => pf1 & (0x80 >> (cell - 4)) != 0,
        _ => pf2 & (0x01 << (cell - 12)) != 0,
    }
}
