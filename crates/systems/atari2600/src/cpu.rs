//! CPU wrapper for the Atari 2600 (6507 variant of the 6502)
//!
//! Adds the system's illegal-opcode policy on top of the core: a run of
//! `limit` consecutive illegal opcodes stops emulation.

use emu_core::cpu_6507::{Cpu6507, Memory6507, TickStatus};
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

use crate::Atari2600Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atari2600Cpu {
    pub core: Cpu6507,
    consecutive_illegal: u32,
    #[serde(skip)]
    illegal_limit: u32,
}

impl Atari2600Cpu {
    pub fn new(illegal_limit: u32) -> Self {
        Self {
            core: Cpu6507::new(),
            consecutive_illegal: 0,
            illegal_limit,
        }
    }

    pub fn set_illegal_limit(&mut self, limit: u32) {
        self.illegal_limit = limit;
    }

    /// Load PC from the reset vector.
    pub fn reset<M: Memory6507>(&mut self, bus: &mut M) {
        self.core.reset(bus);
        self.consecutive_illegal = 0;
    }

    /// Run one bus cycle.
    pub fn tick<M: Memory6507>(&mut self, bus: &mut M) -> Result<TickStatus, Atari2600Error> {
        let status = self.core.tick(bus);
        match status {
            TickStatus::InProgress => {}
            TickStatus::Completed { .. } => self.consecutive_illegal = 0,
            TickStatus::Illegal { opcode, address } => {
                self.consecutive_illegal += 1;
                if self.illegal_limit > 0 && self.consecutive_illegal >= self.illegal_limit {
                    log(LogCategory::CPU, LogLevel::Error, || {
                        format!(
                            "CPU: {} consecutive illegal opcodes, last {:02X} at {:04X}",
                            self.consecutive_illegal, opcode, address
                        )
                    });
                    return Err(Atari2600Error::IllegalOpcode { opcode, address });
                }
            }
        }
        Ok(status)
    }

    pub fn consecutive_illegal(&self) -> u32 {
        self.consecutive_illegal
    }
}
