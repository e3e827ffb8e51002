//! TIA (Television Interface Adapter) - video and audio chip for the Atari 2600
//!
//! The TIA has no framebuffer. It produces one pixel per color clock while the
//! beam sweeps the visible part of a scanline, so the CPU has to rewrite the
//! object registers line by line ("racing the beam").
//!
//! # Scanline layout
//!
//! ```text
//! counter  0 ......... 67 | 68 ....................... 227
//!          horizontal blank | visible, 160 pixels
//! ```
//!
//! Every register write that changes an object's shape, position or enable
//! state re-renders that object's 160-entry line buffer immediately, so a
//! change made mid-line is visible on the rest of the same line. The pixel
//! stage only looks the current offset up in each buffer, picks a color by
//! priority and latches any collisions.

mod objects;
mod palette;
mod registers;

use serde::{Deserialize, Serialize};

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::serde_arrays;
use objects::{motion_offset, player_centre, ObjectGenerator, Playfield};

pub use objects::{Object, VISIBLE_WIDTH};
pub use palette::{convert_line, ntsc_to_argb};
pub use registers::{
    ReadRegister, TiaError, WriteRegister, READ_REGISTER_COUNT, WRITE_REGISTER_COUNT,
};

/// Color clocks per scanline.
pub const LINE_TOTAL: u16 = 228;
/// First color clock of the visible region.
pub const HSYNC: u16 = 68;

/// Idle level of INPT4/INPT5 (fire buttons are active low).
const INPUT_RELEASED: u8 = 0x80;

const P0: usize = Object::P0 as usize;
const P1: usize = Object::P1 as usize;
const M0: usize = Object::M0 as usize;
const M1: usize = Object::M1 as usize;
const BL: usize = Object::BL as usize;
/// Playfield slot in the per-pixel hit array.
const PF: usize = 5;

/// Collision latch bits: (register, bit, object, object).
const COLLISION_PAIRS: [(ReadRegister, u8, usize, usize); 15] = [
    (ReadRegister::CXM0P, 0x80, M0, P1),
    (ReadRegister::CXM0P, 0x40, M0, P0),
    (ReadRegister::CXM1P, 0x80, M1, P0),
    (ReadRegister::CXM1P, 0x40, M1, P1),
    (ReadRegister::CXP0FB, 0x80, P0, PF),
    (ReadRegister::CXP0FB, 0x40, P0, BL),
    (ReadRegister::CXP1FB, 0x80, P1, PF),
    (ReadRegister::CXP1FB, 0x40, P1, BL),
    (ReadRegister::CXM0FB, 0x80, M0, PF),
    (ReadRegister::CXM0FB, 0x40, M0, BL),
    (ReadRegister::CXM1FB, 0x80, M1, PF),
    (ReadRegister::CXM1FB, 0x40, M1, BL),
    (ReadRegister::CXBLPF, 0x80, BL, PF),
    (ReadRegister::CXPPMM, 0x80, P0, P1),
    (ReadRegister::CXPPMM, 0x40, M0, M1),
];

fn hm_register(object: Object) -> WriteRegister {
    match object {
        Object::P0 => WriteRegister::HMP0,
        Object::P1 => WriteRegister::HMP1,
        Object::M0 => WriteRegister::HMM0,
        Object::M1 => WriteRegister::HMM1,
        Object::BL => WriteRegister::HMBL,
    }
}

/// TIA chip state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tia {
    #[serde(with = "serde_arrays")]
    write_regs: [u8; WRITE_REGISTER_COUNT],
    read_regs: [u8; READ_REGISTER_COUNT],

    /// Color clock within the current scanline, 0..LINE_TOTAL.
    counter: u16,
    wsync: bool,
    motion_pending: bool,

    objects: [ObjectGenerator; 5],
    playfield: Playfield,

    // Vertical delay copies, latched on the other player's GRP write
    old_grp0: u8,
    old_grp1: u8,
    old_enabl: bool,

    /// Color values of the current scanline's visible pixels.
    #[serde(with = "serde_arrays")]
    line: [u8; VISIBLE_WIDTH],
}

impl Default for Tia {
    fn default() -> Self {
        Self::new()
    }
}

impl Tia {
    pub fn new() -> Self {
        let mut read_regs = [0; READ_REGISTER_COUNT];
        read_regs[ReadRegister::INPT4.index()] = INPUT_RELEASED;
        read_regs[ReadRegister::INPT5.index()] = INPUT_RELEASED;

        Self {
            write_regs: [0; WRITE_REGISTER_COUNT],
            read_regs,
            counter: 0,
            wsync: false,
            motion_pending: false,
            objects: std::array::from_fn(|_| ObjectGenerator::new()),
            playfield: Playfield::new(),
            old_grp0: 0,
            old_grp1: 0,
            old_enabl: false,
            line: [0; VISIBLE_WIDTH],
        }
    }

    /// Power-on state. Input port levels are kept.
    pub fn reset(&mut self) {
        let inputs = self.read_regs;
        *self = Self::new();
        let first_input = ReadRegister::INPT0.index();
        self.read_regs[first_input..].copy_from_slice(&inputs[first_input..]);
    }

    fn reg(&self, reg: WriteRegister) -> u8 {
        self.write_regs[reg.index()]
    }

    fn flag(&self, reg: WriteRegister, mask: u8) -> bool {
        self.reg(reg) & mask != 0
    }

    /// Advance one color clock. Returns `true` on the tick that completes the
    /// scanline.
    pub fn tick(&mut self) -> bool {
        if self.counter == HSYNC {
            self.commit_motion();
            self.recompute_objects();
        }

        if self.counter >= HSYNC {
            let x = (self.counter - HSYNC) as usize;
            debug_assert!(x < VISIBLE_WIDTH);
            if x < VISIBLE_WIDTH {
                self.line[x] = self.pixel(x);
            }
        }

        self.counter += 1;
        if self.counter >= LINE_TOTAL {
            self.end_scanline();
            return true;
        }
        false
    }

    fn end_scanline(&mut self) {
        self.counter = 0;
        self.wsync = false;
        for object in &mut self.objects {
            object.end_scanline();
        }
        self.motion_pending = false;
    }

    /// Pending HMOVE offsets become positions once the blank region is over.
    /// Drawing from here on uses the moved positions with no offset.
    fn commit_motion(&mut self) {
        if !self.motion_pending {
            return;
        }
        for object in Object::ALL {
            let offset = motion_offset(self.reg(hm_register(object)));
            self.objects[object.index()].commit_motion(offset);
        }
        self.motion_pending = false;
    }

    /// Write a register. Side effects happen immediately.
    pub fn write(&mut self, reg: WriteRegister, val: u8) {
        use WriteRegister::*;

        self.write_regs[reg.index()] = val;

        match reg {
            WSYNC => self.wsync = true,
            RSYNC => {
                log(LogCategory::TIA, LogLevel::Trace, || {
                    format!("TIA: RSYNC at color clock {}", self.counter)
                });
                self.counter = 0;
            }

            NUSIZ0 => self.recompute_pair(Object::P0, Object::M0),
            NUSIZ1 => self.recompute_pair(Object::P1, Object::M1),
            REFP0 | VDELP0 | HMP0 => self.recompute(Object::P0),
            REFP1 | VDELP1 | HMP1 => self.recompute(Object::P1),
            ENAM0 | HMM0 | RESMP0 => self.recompute(Object::M0),
            ENAM1 | HMM1 | RESMP1 => self.recompute(Object::M1),
            ENABL | HMBL | VDELBL => self.recompute(Object::BL),

            CTRLPF => {
                self.recompute_playfield();
                self.recompute(Object::BL);
            }
            PF0 | PF1 | PF2 => self.recompute_playfield(),

            RESP0 => self.reset_position(Object::P0),
            RESP1 => self.reset_position(Object::P1),
            RESM0 => self.reset_position(Object::M0),
            RESM1 => self.reset_position(Object::M1),
            RESBL => self.reset_position(Object::BL),

            GRP0 => {
                self.old_grp1 = self.reg(GRP1);
                self.recompute_pair(Object::P0, Object::P1);
            }
            GRP1 => {
                self.old_grp0 = self.reg(GRP0);
                self.old_enabl = self.flag(ENABL, 0x02);
                self.recompute_pair(Object::P0, Object::P1);
                self.recompute(Object::BL);
            }

            HMOVE => {
                if self.counter < HSYNC {
                    self.motion_pending = true;
                    self.recompute_objects();
                } else {
                    log(LogCategory::TIA, LogLevel::Trace, || {
                        format!("TIA: HMOVE ignored at color clock {}", self.counter)
                    });
                }
            }
            HMCLR => {
                for object in Object::ALL {
                    self.write_regs[hm_register(object).index()] = 0;
                }
                self.motion_pending = false;
                self.recompute_objects();
            }
            CXCLR => {
                for latch in ReadRegister::COLLISIONS {
                    self.read_regs[latch.index()] = 0;
                }
            }

            // Stored only
            VSYNC | VBLANK | COLUP0 | COLUP1 | COLUPF | COLUBK | AUDC0 | AUDC1 | AUDF0
            | AUDF1 | AUDV0 | AUDV1 => {}
        }
    }

    /// Read a collision latch or input port.
    pub fn read(&self, reg: ReadRegister) -> u8 {
        self.read_regs[reg.index()]
    }

    /// Last value written to a register.
    pub fn register(&self, reg: WriteRegister) -> u8 {
        self.reg(reg)
    }

    /// Drive input port INPT0-INPT5.
    pub fn set_input_port(&mut self, port: u8, value: u8) -> Result<(), TiaError> {
        if port > 5 {
            return Err(TiaError::InvalidInputPort(port));
        }
        self.read_regs[ReadRegister::INPT0.index() + port as usize] = value;
        Ok(())
    }

    fn reset_position(&mut self, object: Object) {
        let position = self.counter.saturating_sub(HSYNC);
        self.objects[object.index()].reset_to(position);
        match object {
            Object::P0 => self.recompute_pair(Object::P0, Object::M0),
            Object::P1 => self.recompute_pair(Object::P1, Object::M1),
            _ => self.recompute(object),
        }
    }

    fn recompute_pair(&mut self, a: Object, b: Object) {
        self.recompute(a);
        self.recompute(b);
    }

    fn recompute_objects(&mut self) {
        for object in Object::ALL {
            self.recompute(object);
        }
    }

    fn recompute_playfield(&mut self) {
        use WriteRegister::*;
        let (pf0, pf1, pf2) = (self.reg(PF0), self.reg(PF1), self.reg(PF2));
        let reflect = self.flag(CTRLPF, 0x01);
        self.playfield.recompute(pf0, pf1, pf2, reflect);
    }

    fn recompute(&mut self, object: Object) {
        use WriteRegister::*;

        let motion = if self.motion_pending {
            motion_offset(self.reg(hm_register(object)))
        } else {
            0
        };

        match object {
            Object::P0 | Object::P1 => {
                let (grp, old, vdel, nusiz, refp) = if object == Object::P0 {
                    (GRP0, self.old_grp0, VDELP0, NUSIZ0, REFP0)
                } else {
                    (GRP1, self.old_grp1, VDELP1, NUSIZ1, REFP1)
                };
                let graphics = if self.flag(vdel, 0x01) {
                    old
                } else {
                    self.reg(grp)
                };
                let (nusiz, reflect) = (self.reg(nusiz), self.flag(refp, 0x08));
                self.objects[object.index()].draw_player(graphics, nusiz, reflect, motion);
            }
            Object::M0 | Object::M1 => {
                let (player, enam, resmp, nusiz) = if object == Object::M0 {
                    (P0, ENAM0, RESMP0, NUSIZ0)
                } else {
                    (P1, ENAM1, RESMP1, NUSIZ1)
                };
                let nusiz = self.reg(nusiz);
                if self.flag(resmp, 0x02) {
                    // Locked to the player and hidden
                    let centre = self.objects[player].position() + player_centre(nusiz);
                    let missile = &mut self.objects[object.index()];
                    missile.set_position(centre);
                    missile.draw_missile(false, nusiz, motion);
                } else {
                    let enabled = self.flag(enam, 0x02);
                    self.objects[object.index()].draw_missile(enabled, nusiz, motion);
                }
            }
            Object::BL => {
                let enabled = if self.flag(VDELBL, 0x01) {
                    self.old_enabl
                } else {
                    self.flag(ENABL, 0x02)
                };
                let ctrlpf = self.reg(CTRLPF);
                self.objects[BL].draw_ball(enabled, ctrlpf, motion);
            }
        }
    }

    fn pixel(&mut self, x: usize) -> u8 {
        use WriteRegister::*;

        let mut hits = [false; 6];
        for (hit, object) in hits.iter_mut().zip(&self.objects) {
            *hit = object.is_set(x);
        }
        hits[PF] = self.playfield.is_set(x);

        // Blanked pixels are black and do not collide
        if self.flag(VBLANK, 0x02) {
            return 0;
        }
        self.latch_collisions(&hits);

        let ctrlpf = self.reg(CTRLPF);
        let playfield_color = if ctrlpf & 0x02 != 0 {
            if x < VISIBLE_WIDTH / 2 {
                self.reg(COLUP0)
            } else {
                self.reg(COLUP1)
            }
        } else {
            self.reg(COLUPF)
        };

        let player0 = (hits[P0] || hits[M0]).then_some(self.reg(COLUP0));
        let player1 = (hits[P1] || hits[M1]).then_some(self.reg(COLUP1));
        let field = if hits[BL] {
            Some(self.reg(COLUPF))
        } else {
            hits[PF].then_some(playfield_color)
        };

        let order = if ctrlpf & 0x04 != 0 {
            [field, player0, player1]
        } else {
            [player0, player1, field]
        };
        order
            .into_iter()
            .flatten()
            .next()
            .unwrap_or_else(|| self.reg(COLUBK))
    }

    fn latch_collisions(&mut self, hits: &[bool; 6]) {
        if hits.iter().filter(|&&hit| hit).count() < 2 {
            return;
        }
        for (reg, bit, a, b) in COLLISION_PAIRS {
            if hits[a] && hits[b] {
                self.read_regs[reg.index()] |= bit;
            }
        }
    }

    /// CPU is halted until the end of the scanline.
    pub fn wait_for_sync(&self) -> bool {
        self.wsync
    }

    pub fn vsync(&self) -> bool {
        self.flag(WriteRegister::VSYNC, 0x02)
    }

    pub fn vblank(&self) -> bool {
        self.flag(WriteRegister::VBLANK, 0x02)
    }

    /// Color values of the visible pixels produced so far on this line.
    pub fn line_buffer(&self) -> &[u8; VISIBLE_WIDTH] {
        &self.line
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    pub fn object_position(&self, object: Object) -> u16 {
        self.objects[object.index()].position()
    }

    pub fn object_line(&self, object: Object) -> &[bool; VISIBLE_WIDTH] {
        self.objects[object.index()].line()
    }

    pub fn motion_pending(&self) -> bool {
        self.motion_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WriteRegister::*;

    fn tick_to(tia: &mut Tia, counter: u16) {
        while tia.counter() != counter {
            tia.tick();
        }
    }

    fn run_line(tia: &mut Tia) {
        while !tia.tick() {}
    }

    fn snapshot(tia: &Tia) -> Vec<bool> {
        let mut out = Vec::new();
        for object in Object::ALL {
            out.extend_from_slice(tia.object_line(object));
        }
        out.extend((0..VISIBLE_WIDTH).map(|x| tia.playfield.is_set(x)));
        out
    }

    fn set_pixels(line: &[bool; VISIBLE_WIDTH]) -> Vec<usize> {
        (0..VISIBLE_WIDTH).filter(|&x| line[x]).collect()
    }

    #[test]
    fn test_tia_creation() {
        let tia = Tia::new();
        assert_eq!(tia.counter(), 0);
        assert!(!tia.wait_for_sync());
        assert!(!tia.vsync());
        assert!(!tia.vblank());
        assert_eq!(tia.read(ReadRegister::INPT4), 0x80);
        assert_eq!(tia.read(ReadRegister::INPT5), 0x80);
        assert_eq!(tia.read(ReadRegister::CXPPMM), 0x00);
    }

    #[test]
    fn test_vsync_and_vblank_bits() {
        let mut tia = Tia::new();
        tia.write(VSYNC, 0x02);
        assert!(tia.vsync());
        tia.write(VSYNC, 0x00);
        assert!(!tia.vsync());

        tia.write(VBLANK, 0x02);
        assert!(tia.vblank());
        // Only bit 1 counts
        tia.write(VBLANK, 0xFD);
        assert!(!tia.vblank());
    }

    #[test]
    fn test_line_produces_visible_pixels_only() {
        let mut tia = Tia::new();
        tia.write(COLUBK, 0x0E);

        tick_to(&mut tia, HSYNC);
        assert!(tia.line_buffer().iter().all(|&c| c == 0));

        run_line(&mut tia);
        assert_eq!(tia.counter(), 0);
        assert!(tia.line_buffer().iter().all(|&c| c == 0x0E));
    }

    #[test]
    fn test_line_is_line_total_ticks() {
        let mut tia = Tia::new();
        for _ in 0..LINE_TOTAL - 1 {
            assert!(!tia.tick());
        }
        assert!(tia.tick());
        assert_eq!(tia.counter(), 0);
    }

    #[test]
    fn test_wsync_held_until_wrap() {
        let mut tia = Tia::new();
        tia.write(WSYNC, 0);
        for _ in 0..LINE_TOTAL - 1 {
            assert!(!tia.tick());
            assert!(tia.wait_for_sync());
        }
        assert!(tia.tick());
        assert!(!tia.wait_for_sync());
    }

    #[test]
    fn test_rsync_restarts_line() {
        let mut tia = Tia::new();
        tick_to(&mut tia, 100);
        tia.write(RSYNC, 0);
        assert_eq!(tia.counter(), 0);
    }

    #[test]
    fn test_resp_captures_position() {
        let mut tia = Tia::new();
        tia.write(GRP0, 0x80);
        tick_to(&mut tia, HSYNC + 20);
        tia.write(RESP0, 0);
        assert_eq!(tia.object_position(Object::P0), 20);
        assert_eq!(set_pixels(tia.object_line(Object::P0)), vec![20]);
    }

    #[test]
    fn test_resp_during_blank_is_left_edge() {
        let mut tia = Tia::new();
        tick_to(&mut tia, 30);
        tia.write(RESBL, 0);
        assert_eq!(tia.object_position(Object::BL), 0);
    }

    #[test]
    fn test_hmove_shifts_left_by_three() {
        let mut tia = Tia::new();
        tia.write(GRP0, 0x80);
        tick_to(&mut tia, HSYNC + 20);
        tia.write(RESP0, 0);
        run_line(&mut tia);

        let baseline = *tia.object_line(Object::P0);
        tia.write(HMP0, 0xD0);
        // No motion until HMOVE
        assert_eq!(*tia.object_line(Object::P0), baseline);

        tia.write(HMOVE, 0);
        assert!(tia.motion_pending());
        let moved = *tia.object_line(Object::P0);
        for x in 0..VISIBLE_WIDTH - 3 {
            assert_eq!(moved[x], baseline[x + 3], "pixel {x}");
        }

        // Committed when the visible region starts, then no further motion
        run_line(&mut tia);
        assert!(!tia.motion_pending());
        assert_eq!(tia.object_position(Object::P0), 17);
        run_line(&mut tia);
        assert_eq!(tia.object_position(Object::P0), 17);
    }

    #[test]
    fn test_hmove_clamps_at_left_edge() {
        let mut tia = Tia::new();
        tia.write(GRP0, 0x80);
        tick_to(&mut tia, HSYNC + 1);
        tia.write(RESP0, 0);
        run_line(&mut tia);

        tia.write(HMP0, 0xD0);
        tia.write(HMOVE, 0);
        assert_eq!(set_pixels(tia.object_line(Object::P0)), vec![0]);
    }

    #[test]
    fn test_hmove_in_visible_region_ignored() {
        let mut tia = Tia::new();
        tia.write(HMP0, 0x70);
        tick_to(&mut tia, HSYNC + 10);
        tia.write(HMOVE, 0);
        assert!(!tia.motion_pending());
    }

    #[test]
    fn test_reset_on_same_line_cancels_motion() {
        let mut tia = Tia::new();
        tia.write(HMBL, 0x70);
        tia.write(HMOVE, 0);
        tick_to(&mut tia, HSYNC + 50);
        tia.write(RESBL, 0);
        run_line(&mut tia);
        assert_eq!(tia.object_position(Object::BL), 50);
    }

    #[test]
    fn test_hmclr_in_visible_region_keeps_motion() {
        let mut tia = Tia::new();
        tia.write(GRP0, 0x80);
        tick_to(&mut tia, HSYNC + 20);
        tia.write(RESP0, 0);
        run_line(&mut tia);

        tia.write(HMP0, 0x30);
        tick_to(&mut tia, 9);
        tia.write(HMOVE, 0);
        tick_to(&mut tia, HSYNC + 60);
        tia.write(HMCLR, 0);
        assert_eq!(set_pixels(tia.object_line(Object::P0)), vec![23]);

        run_line(&mut tia);
        run_line(&mut tia);
        assert_eq!(tia.object_position(Object::P0), 23);
        assert_eq!(set_pixels(tia.object_line(Object::P0)), vec![23]);
    }

    #[test]
    fn test_hmclr_during_blank_cancels_motion() {
        let mut tia = Tia::new();
        tia.write(GRP0, 0x80);
        tick_to(&mut tia, HSYNC + 20);
        tia.write(RESP0, 0);
        run_line(&mut tia);

        tia.write(HMP0, 0x30);
        tia.write(HMOVE, 0);
        tick_to(&mut tia, HSYNC - 8);
        tia.write(HMCLR, 0);
        run_line(&mut tia);
        assert_eq!(tia.object_position(Object::P0), 20);
    }

    #[test]
    fn test_hmclr_zeroes_motion() {
        let mut tia = Tia::new();
        tia.write(HMP0, 0x70);
        tia.write(HMBL, 0x30);
        tia.write(HMOVE, 0);
        tia.write(HMCLR, 0);
        assert!(!tia.motion_pending());
        assert_eq!(tia.register(HMP0), 0);
        assert_eq!(tia.register(HMBL), 0);
    }

    #[test]
    fn test_collision_and_cxclr() {
        let mut tia = Tia::new();
        tia.write(PF0, 0xF0);
        tia.write(GRP0, 0xFF);
        run_line(&mut tia);

        assert_eq!(tia.read(ReadRegister::CXP0FB), 0x80);
        assert_eq!(tia.read(ReadRegister::CXM0FB), 0x00);

        tia.write(CXCLR, 0);
        for latch in ReadRegister::COLLISIONS {
            assert_eq!(tia.read(latch), 0, "{latch:?}");
        }
    }

    #[test]
    fn test_collisions_are_sticky() {
        let mut tia = Tia::new();
        tia.write(GRP0, 0x80);
        tia.write(GRP1, 0x80);
        run_line(&mut tia);
        assert_eq!(tia.read(ReadRegister::CXPPMM), 0x80);

        tia.write(GRP1, 0x00);
        run_line(&mut tia);
        assert_eq!(tia.read(ReadRegister::CXPPMM), 0x80);
    }

    #[test]
    fn test_missile_ball_collisions() {
        let mut tia = Tia::new();
        tia.write(ENAM0, 0x02);
        tia.write(ENAM1, 0x02);
        tia.write(ENABL, 0x02);
        run_line(&mut tia);

        assert_eq!(tia.read(ReadRegister::CXM0FB), 0x40);
        assert_eq!(tia.read(ReadRegister::CXM1FB), 0x40);
        assert_eq!(tia.read(ReadRegister::CXPPMM), 0x40);
        assert_eq!(tia.read(ReadRegister::CXBLPF), 0x00);
    }

    #[test]
    fn test_priority_orders() {
        let mut tia = Tia::new();
        tia.write(PF0, 0xF0);
        tia.write(GRP0, 0xFF);
        tia.write(COLUP0, 0x44);
        tia.write(COLUPF, 0x88);
        tia.write(COLUBK, 0x02);
        run_line(&mut tia);

        let line = tia.line_buffer();
        assert_eq!(line[0], 0x44);
        assert_eq!(line[10], 0x88);
        assert_eq!(line[50], 0x02);

        tia.write(CTRLPF, 0x04);
        run_line(&mut tia);
        assert_eq!(tia.line_buffer()[0], 0x88);
    }

    #[test]
    fn test_score_mode_colors_halves() {
        let mut tia = Tia::new();
        tia.write(PF0, 0x10);
        tia.write(CTRLPF, 0x02);
        tia.write(COLUP0, 0x44);
        tia.write(COLUP1, 0x66);
        run_line(&mut tia);

        assert_eq!(tia.line_buffer()[0], 0x44);
        assert_eq!(tia.line_buffer()[80], 0x66);
    }

    #[test]
    fn test_vblank_outputs_black() {
        let mut tia = Tia::new();
        tia.write(COLUBK, 0x0E);
        tia.write(VBLANK, 0x02);
        run_line(&mut tia);
        assert!(tia.line_buffer().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_no_collisions_under_vblank() {
        let mut tia = Tia::new();
        tia.write(PF0, 0xF0);
        tia.write(GRP0, 0xFF);
        tia.write(VBLANK, 0x02);
        run_line(&mut tia);
        for latch in ReadRegister::COLLISIONS {
            assert_eq!(tia.read(latch), 0, "{latch:?}");
        }

        tia.write(VBLANK, 0x00);
        run_line(&mut tia);
        assert_eq!(tia.read(ReadRegister::CXP0FB), 0x80);
    }

    #[test]
    fn test_vertical_delay_uses_old_graphics() {
        let mut tia = Tia::new();
        tia.write(VDELP0, 0x01);
        tia.write(GRP0, 0xFF);
        assert!(set_pixels(tia.object_line(Object::P0)).is_empty());

        tia.write(GRP1, 0x00);
        assert_eq!(set_pixels(tia.object_line(Object::P0)).len(), 8);
    }

    #[test]
    fn test_ball_vertical_delay() {
        let mut tia = Tia::new();
        tia.write(VDELBL, 0x01);
        tia.write(ENABL, 0x02);
        assert!(set_pixels(tia.object_line(Object::BL)).is_empty());

        tia.write(GRP1, 0x00);
        assert_eq!(set_pixels(tia.object_line(Object::BL)), vec![0]);
    }

    #[test]
    fn test_resmp_locks_missile_to_player() {
        let mut tia = Tia::new();
        tick_to(&mut tia, HSYNC + 40);
        tia.write(RESP0, 0);
        tia.write(ENAM0, 0x02);
        tia.write(RESMP0, 0x02);
        assert!(set_pixels(tia.object_line(Object::M0)).is_empty());
        assert_eq!(tia.object_position(Object::M0), 43);

        tia.write(RESMP0, 0x00);
        assert_eq!(set_pixels(tia.object_line(Object::M0)), vec![43]);
    }

    #[test]
    fn test_repeated_writes_are_idempotent() {
        for reg in WriteRegister::ALL.into_iter().filter(|r| !r.is_strobe()) {
            for val in [0x00, 0x5A, 0xD2, 0xFF] {
                let mut once = Tia::new();
                tick_to(&mut once, HSYNC + 30);
                once.write(RESP0, 0);
                let mut twice = once.clone();

                once.write(reg, val);
                twice.write(reg, val);
                twice.write(reg, val);
                assert_eq!(snapshot(&once), snapshot(&twice), "{reg} = {val:#04X}");
            }
        }
    }

    #[test]
    fn test_input_ports() {
        let mut tia = Tia::new();
        tia.set_input_port(4, 0x00).unwrap();
        assert_eq!(tia.read(ReadRegister::INPT4), 0x00);
        assert_eq!(
            tia.set_input_port(6, 0x80),
            Err(TiaError::InvalidInputPort(6))
        );

        tia.reset();
        assert_eq!(tia.read(ReadRegister::INPT4), 0x00);
    }

    #[test]
    fn test_audio_registers_stored() {
        let mut tia = Tia::new();
        tia.write(AUDC0, 0x0F);
        tia.write(AUDF1, 0x1F);
        tia.write(AUDV0, 0x08);
        assert_eq!(tia.register(AUDC0), 0x0F);
        assert_eq!(tia.register(AUDF1), 0x1F);
        assert_eq!(tia.register(AUDV0), 0x08);
    }

    #[test]
    fn test_reset() {
        let mut tia = Tia::new();
        tia.write(COLUP0, 0x42);
        tia.write(PF0, 0xF0);
        tick_to(&mut tia, 100);

        tia.reset();

        assert_eq!(tia.register(COLUP0), 0);
        assert_eq!(tia.counter(), 0);
        assert!(!tia.playfield.is_set(0));
    }
}
