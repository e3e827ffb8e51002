//! Atari 2600 memory bus
//!
//! The 6507 only brings out 13 address lines, so every address is masked to
//! $0000-$1FFF before decoding. The masked address is then matched against
//! three disjoint windows taken from a [`MemoryMap`]:
//!
//! ```text
//! $0000-$007F   TIA    (reads decode 4 bits, writes decode 6 bits)
//! $0080-$02FF   RIOT   RAM, stack mirror, I/O and timer
//! $1000-$1FFF   Cartridge ROM
//! ```
//!
//! Anything outside the windows reads as zero and ignores writes.

use emu_core::cpu_6507::Memory6507;
use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cartridge::{Cartridge, CartridgeError, CARTRIDGE_SENTINEL};
use crate::riot::Riot;
use crate::tia::{ReadRegister, Tia, WriteRegister};

/// Highest address the 6507 can put on its bus.
pub const ADDRESS_MASK: u16 = 0x1FFF;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("{name} range {start:#06X}-{end:#06X} is inverted")]
    InvertedRange {
        name: &'static str,
        start: u16,
        end: u16,
    },
    #[error("{name} range ends at {end:#06X}, outside the 13-bit address space")]
    OutOfAddressSpace { name: &'static str, end: u16 },
    #[error("{first} and {second} ranges overlap")]
    Overlap {
        first: &'static str,
        second: &'static str,
    },
}

/// Inclusive address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: u16,
    pub end: u16,
}

impl AddressRange {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, addr: u16) -> bool {
        (self.start..=self.end).contains(&addr)
    }

    pub fn len(&self) -> usize {
        (self.end as usize + 1).saturating_sub(self.start as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn overlaps(&self, other: &AddressRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Bus windows for the three chips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryMap {
    pub tia: AddressRange,
    pub riot: AddressRange,
    pub cartridge: AddressRange,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self {
            tia: AddressRange::new(0x0000, 0x007F),
            riot: AddressRange::new(0x0080, 0x02FF),
            cartridge: AddressRange::new(0x1000, 0x1FFF),
        }
    }
}

impl MemoryMap {
    fn named(&self) -> [(&'static str, AddressRange); 3] {
        [
            ("TIA", self.tia),
            ("RIOT", self.riot),
            ("Cartridge", self.cartridge),
        ]
    }

    pub fn validate(&self) -> Result<(), BusError> {
        let ranges = self.named();
        for (name, range) in ranges {
            if range.start > range.end {
                return Err(BusError::InvertedRange {
                    name,
                    start: range.start,
                    end: range.end,
                });
            }
            if range.end > ADDRESS_MASK {
                return Err(BusError::OutOfAddressSpace {
                    name,
                    end: range.end,
                });
            }
        }

        for (i, &(first, a)) in ranges.iter().enumerate() {
            for &(second, b) in &ranges[i + 1..] {
                if a.overlaps(&b) {
                    return Err(BusError::Overlap { first, second });
                }
            }
        }
        Ok(())
    }
}

/// Where a masked address lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Tia(u16),
    Riot(u16),
    Cartridge(u16),
    Unmapped,
}

/// Atari 2600 memory bus
#[derive(Debug, Serialize, Deserialize)]
pub struct Atari2600Bus {
    pub tia: Tia,
    pub riot: Riot,
    #[serde(skip)]
    pub cartridge: Option<Cartridge>,
    #[serde(skip)]
    map: MemoryMap,
}

impl Default for Atari2600Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Atari2600Bus {
    /// Bus with the stock memory map.
    pub fn new() -> Self {
        Self {
            tia: Tia::new(),
            riot: Riot::new(),
            cartridge: None,
            map: MemoryMap::default(),
        }
    }

    pub fn with_map(map: MemoryMap) -> Result<Self, BusError> {
        map.validate()?;
        Ok(Self {
            map,
            ..Self::new()
        })
    }

    pub fn map(&self) -> &MemoryMap {
        &self.map
    }

    pub(crate) fn set_map(&mut self, map: MemoryMap) -> Result<(), BusError> {
        map.validate()?;
        self.map = map;
        Ok(())
    }

    /// Load a ROM image sized for this bus's cartridge window.
    pub fn load_cartridge(&mut self, image: &[u8]) -> Result<(), CartridgeError> {
        self.cartridge = Some(Cartridge::load(image, self.map.cartridge.len())?);
        Ok(())
    }

    /// Reset TIA and RIOT. The cartridge stays inserted.
    pub fn reset(&mut self) {
        self.tia.reset();
        self.riot.reset();
    }

    fn decode(&self, addr: u16) -> Target {
        let addr = addr & ADDRESS_MASK;
        let map = &self.map;
        if map.tia.contains(addr) {
            Target::Tia(addr - map.tia.start)
        } else if map.riot.contains(addr) {
            Target::Riot(addr - map.riot.start)
        } else if map.cartridge.contains(addr) {
            Target::Cartridge(addr - map.cartridge.start)
        } else {
            Target::Unmapped
        }
    }
}

impl Memory6507 for Atari2600Bus {
    fn read(&self, addr: u16) -> u8 {
        match self.decode(addr) {
            Target::Tia(offset) => match ReadRegister::try_from((offset & 0x0F) as u8) {
                Ok(reg) => self.tia.read(reg),
                // $0E-$0F have no register behind them
                Err(_) => 0,
            },
            Target::Riot(offset) => self.riot.read(offset).unwrap_or_else(|e| {
                log(LogCategory::Bus, LogLevel::Debug, || {
                    format!("Bus: read {:04X}: {}", addr, e)
                });
                0
            }),
            Target::Cartridge(offset) => self
                .cartridge
                .as_ref()
                .map_or(CARTRIDGE_SENTINEL, |cart| cart.read(offset)),
            Target::Unmapped => {
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Bus: read from unmapped {:04X}", addr)
                });
                0
            }
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match self.decode(addr) {
            Target::Tia(offset) => match WriteRegister::try_from((offset & 0x3F) as u8) {
                Ok(reg) => self.tia.write(reg, val),
                Err(e) => log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Bus: write {:04X}={:02X} ignored: {}", addr, val, e)
                }),
            },
            Target::Riot(offset) => {
                if let Err(e) = self.riot.write(offset, val) {
                    log(LogCategory::Bus, LogLevel::Debug, || {
                        format!("Bus: write {:04X}={:02X}: {}", addr, val, e)
                    });
                }
            }
            Target::Cartridge(_) => log(LogCategory::Bus, LogLevel::Debug, || {
                format!("Bus: write {:04X}={:02X} to cartridge ROM ignored", addr, val)
            }),
            Target::Unmapped => log(LogCategory::Bus, LogLevel::Trace, || {
                format!("Bus: write to unmapped {:04X}={:02X}", addr, val)
            }),
        }
    }
}
