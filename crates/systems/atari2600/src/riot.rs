//! RIOT (6532): RAM, I/O ports and interval timer
//!
//! The RIOT is addressed by offset within its bus window, which on a stock
//! console starts at $0080:
//!
//! ```text
//! $000-$07F   RAM (128 bytes)            CPU $0080-$00FF
//! $100-$17F   RAM again (stack mirror)   CPU $0180-$01FF
//! $200-$27F   I/O and timer, every 32    CPU $0280-$02FF
//! ```
//!
//! Anything else in the window is [`RiotError::OutOfRange`]; the bus turns
//! that into a zero read or an ignored write.
//!
//! I/O register select within the 32-byte block:
//!
//! ```text
//! read  $00 SWCHA   $01 SWACNT  $02 SWCHB  $03 SWBCNT
//!       $04 INTIM   $05 TIMINT (bit 7 = underflow, cleared by the read)
//! write $00 SWCHA   $01 SWACNT  $02 SWCHB  $03 SWBCNT
//!       $14 TIM1T   $15 TIM8T   $16 TIM64T $17 T1024T
//! ```
//!
//! Port A carries both joysticks and port B the console switches. Both are
//! active low.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use thiserror::Error;

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::serde_arrays;

pub const RAM_SIZE: usize = 128;

const STACK_MIRROR: u16 = 0x100;
const IO_BASE: u16 = 0x200;
const IO_END: u16 = 0x27F;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RiotError {
    #[error("RIOT offset {0:#05X} is outside RAM and I/O")]
    OutOfRange(u16),
}

/// Joystick direction, for [`Riot::set_joystick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joystick {
    Up,
    Down,
    Left,
    Right,
}

/// Console switches on port B, for [`Riot::set_console_switch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleSwitch {
    Reset,
    Select,
    /// Closed = black and white.
    BlackWhite,
    /// Closed (bit clear) = difficulty B, the novice setting.
    LeftDifficultyB,
    RightDifficultyB,
}

impl ConsoleSwitch {
    fn bit(self) -> u8 {
        match self {
            ConsoleSwitch::Reset => 0,
            ConsoleSwitch::Select => 1,
            ConsoleSwitch::BlackWhite => 3,
            ConsoleSwitch::LeftDifficultyB => 6,
            ConsoleSwitch::RightDifficultyB => 7,
        }
    }
}

mod serde_cell_bool {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::cell::Cell;

    pub fn serialize<S>(cell: &Cell<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        cell.get().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Cell<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(Cell::new)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Riot {
    #[serde(with = "serde_arrays")]
    ram: [u8; RAM_SIZE],

    timer: u8,
    /// CPU cycles per timer decrement (1, 8, 64 or 1024).
    interval: u16,
    /// Cycles left until the next decrement.
    countdown: u16,
    /// Set when the timer wraps past zero; reading TIMINT clears it.
    #[serde(with = "serde_cell_bool")]
    underflow: Cell<bool>,

    /// Joystick lines as driven by the controllers.
    swcha_in: u8,
    /// Port A output latch written by the CPU.
    swcha_out: u8,
    swacnt: u8,
    swchb_in: u8,
    swchb_out: u8,
    swbcnt: u8,
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Riot {
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            timer: 0,
            interval: 1024,
            countdown: 1024,
            underflow: Cell::new(false),
            swcha_in: 0xFF,
            swcha_out: 0,
            swacnt: 0,
            // Switches released, colour, difficulty B.
            swchb_in: 0x0B,
            swchb_out: 0,
            swbcnt: 0,
        }
    }

    /// Power-on state; controller and switch positions are kept.
    pub fn reset(&mut self) {
        let (swcha_in, swchb_in) = (self.swcha_in, self.swchb_in);
        *self = Self::new();
        self.swcha_in = swcha_in;
        self.swchb_in = swchb_in;
    }

    pub fn read(&self, offset: u16) -> Result<u8, RiotError> {
        match offset {
            0x000..=0x07F => Ok(self.ram[offset as usize]),
            0x100..=0x17F => Ok(self.ram[(offset - STACK_MIRROR) as usize]),
            IO_BASE..=IO_END => Ok(self.read_io(offset & 0x07)),
            _ => Err(out_of_range("read", offset)),
        }
    }

    pub fn write(&mut self, offset: u16, val: u8) -> Result<(), RiotError> {
        match offset {
            0x000..=0x07F => self.ram[offset as usize] = val,
            0x100..=0x17F => self.ram[(offset - STACK_MIRROR) as usize] = val,
            IO_BASE..=IO_END => self.write_io(offset & 0x1F, val),
            _ => return Err(out_of_range("write", offset)),
        }
        Ok(())
    }

    fn read_io(&self, reg: u16) -> u8 {
        match reg {
            0x00 => (self.swcha_out & self.swacnt) | (self.swcha_in & !self.swacnt),
            0x01 => self.swacnt,
            0x02 => (self.swchb_out & self.swbcnt) | (self.swchb_in & !self.swbcnt),
            0x03 => self.swbcnt,
            0x04 | 0x06 => self.timer,
            _ => {
                if self.underflow.replace(false) {
                    0x80
                } else {
                    0x00
                }
            }
        }
    }

    fn write_io(&mut self, reg: u16, val: u8) {
        match reg {
            0x00 => self.swcha_out = val,
            0x01 => self.swacnt = val,
            0x02 => self.swchb_out = val,
            0x03 => self.swbcnt = val,
            0x14 => self.start_timer(val, 1),
            0x15 => self.start_timer(val, 8),
            0x16 => self.start_timer(val, 64),
            0x17 => self.start_timer(val, 1024),
            _ => {}
        }
    }

    fn start_timer(&mut self, val: u8, interval: u16) {
        log(LogCategory::RIOT, LogLevel::Debug, || {
            format!("RIOT: timer set to {} at {} cycles per tick", val, interval)
        });
        self.timer = val;
        self.interval = interval;
        self.countdown = interval;
        self.underflow.set(false);
    }

    /// Advance the timer by one CPU cycle.
    pub fn clock(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return;
        }

        if self.timer == 0 {
            // Past zero the timer free-runs at one decrement per cycle.
            self.timer = 0xFF;
            self.interval = 1;
            self.underflow.set(true);
            log(LogCategory::RIOT, LogLevel::Trace, || "RIOT: timer underflow".to_string());
        } else {
            self.timer -= 1;
        }
        self.countdown = self.interval;
    }

    pub fn timer(&self) -> u8 {
        self.timer
    }

    /// Player 0 uses the high nibble of SWCHA, player 1 the low nibble.
    pub fn set_joystick(&mut self, player: u8, direction: Joystick, pressed: bool) {
        let bit = match direction {
            Joystick::Up => 0,
            Joystick::Down => 1,
            Joystick::Left => 2,
            Joystick::Right => 3,
        } + if player == 0 { 4 } else { 0 };
        set_active_low(&mut self.swcha_in, bit, pressed);
    }

    pub fn set_console_switch(&mut self, switch: ConsoleSwitch, closed: bool) {
        set_active_low(&mut self.swchb_in, switch.bit(), closed);
    }
}

fn out_of_range(access: &str, offset: u16) -> RiotError {
    log(LogCategory::RIOT, LogLevel::Debug, || {
        format!("RIOT: {} at offset {:#05X} outside RAM and I/O", access, offset)
    });
    RiotError::OutOfRange(offset)
}

fn set_active_low(port: &mut u8, bit: u8, active: bool) {
    if active {
        *port &= !(1 << bit);
    } else {
        *port |= 1 << bit;
    }
}
