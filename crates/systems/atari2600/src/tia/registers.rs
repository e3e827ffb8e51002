//! TIA register banks
//!
//! The chip decodes writes and reads through separate banks. Writes use six
//! address bits (45 assigned slots), reads use four (14 assigned slots).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WRITE_REGISTER_COUNT: usize = 45;
pub const READ_REGISTER_COUNT: usize = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TiaError {
    #[error("No TIA register at index {0:#04X}")]
    InvalidRegister(u8),
    #[error("No TIA input port {0}")]
    InvalidInputPort(u8),
}

/// Write-only registers, $00-$2C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WriteRegister {
    VSYNC = 0x00,
    VBLANK = 0x01,
    WSYNC = 0x02,
    RSYNC = 0x03,
    NUSIZ0 = 0x04,
    NUSIZ1 = 0x05,
    COLUP0 = 0x06,
    COLUP1 = 0x07,
    COLUPF = 0x08,
    COLUBK = 0x09,
    CTRLPF = 0x0A,
    REFP0 = 0x0B,
    REFP1 = 0x0C,
    PF0 = 0x0D,
    PF1 = 0x0E,
    PF2 = 0x0F,
    RESP0 = 0x10,
    RESP1 = 0x11,
    RESM0 = 0x12,
    RESM1 = 0x13,
    RESBL = 0x14,
    AUDC0 = 0x15,
    AUDC1 = 0x16,
    AUDF0 = 0x17,
    AUDF1 = 0x18,
    AUDV0 = 0x19,
    AUDV1 = 0x1A,
    GRP0 = 0x1B,
    GRP1 = 0x1C,
    ENAM0 = 0x1D,
    ENAM1 = 0x1E,
    ENABL = 0x1F,
    HMP0 = 0x20,
    HMP1 = 0x21,
    HMM0 = 0x22,
    HMM1 = 0x23,
    HMBL = 0x24,
    VDELP0 = 0x25,
    VDELP1 = 0x26,
    VDELBL = 0x27,
    RESMP0 = 0x28,
    RESMP1 = 0x29,
    HMOVE = 0x2A,
    HMCLR = 0x2B,
    CXCLR = 0x2C,
}

impl WriteRegister {
    /// Every register, in index order.
    pub const ALL: [WriteRegister; WRITE_REGISTER_COUNT] = [
        Self::VSYNC,
        Self::VBLANK,
        Self::WSYNC,
        Self::RSYNC,
        Self::NUSIZ0,
        Self::NUSIZ1,
        Self::COLUP0,
        Self::COLUP1,
        Self::COLUPF,
        Self::COLUBK,
        Self::CTRLPF,
        Self::REFP0,
        Self::REFP1,
        Self::PF0,
        Self::PF1,
        Self::PF2,
        Self::RESP0,
        Self::RESP1,
        Self::RESM0,
        Self::RESM1,
        Self::RESBL,
        Self::AUDC0,
        Self::AUDC1,
        Self::AUDF0,
        Self::AUDF1,
        Self::AUDV0,
        Self::AUDV1,
        Self::GRP0,
        Self::GRP1,
        Self::ENAM0,
        Self::ENAM1,
        Self::ENABL,
        Self::HMP0,
        Self::HMP1,
        Self::HMM0,
        Self::HMM1,
        Self::HMBL,
        Self::VDELP0,
        Self::VDELP1,
        Self::VDELBL,
        Self::RESMP0,
        Self::RESMP1,
        Self::HMOVE,
        Self::HMCLR,
        Self::CXCLR,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Strobes act on the write itself; the value is irrelevant.
    pub fn is_strobe(self) -> bool {
        matches!(
            self,
            Self::WSYNC
                | Self::RSYNC
                | Self::RESP0
                | Self::RESP1
                | Self::RESM0
                | Self::RESM1
                | Self::RESBL
                | Self::HMOVE
                | Self::HMCLR
                | Self::CXCLR
        )
    }
}

impl TryFrom<u8> for WriteRegister {
    type Error = TiaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(TiaError::InvalidRegister(value))
    }
}

impl fmt::Display for WriteRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Read-only registers, $00-$0D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReadRegister {
    CXM0P = 0x00,
    CXM1P = 0x01,
    CXP0FB = 0x02,
    CXP1FB = 0x03,
    CXM0FB = 0x04,
    CXM1FB = 0x05,
    CXBLPF = 0x06,
    CXPPMM = 0x07,
    INPT0 = 0x08,
    INPT1 = 0x09,
    INPT2 = 0x0A,
    INPT3 = 0x0B,
    INPT4 = 0x0C,
    INPT5 = 0x0D,
}

impl ReadRegister {
    pub const ALL: [ReadRegister; READ_REGISTER_COUNT] = [
        Self::CXM0P,
        Self::CXM1P,
        Self::CXP0FB,
        Self::CXP1FB,
        Self::CXM0FB,
        Self::CXM1FB,
        Self::CXBLPF,
        Self::CXPPMM,
        Self::INPT0,
        Self::INPT1,
        Self::INPT2,
        Self::INPT3,
        Self::INPT4,
        Self::INPT5,
    ];

    /// The eight collision latches.
    pub const COLLISIONS: [ReadRegister; 8] = [
        Self::CXM0P,
        Self::CXM1P,
        Self::CXP0FB,
        Self::CXP1FB,
        Self::CXM0FB,
        Self::CXM1FB,
        Self::CXBLPF,
        Self::CXPPMM,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for ReadRegister {
    type Error = TiaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(TiaError::InvalidRegister(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_register_table_matches_discriminants() {
        for (i, reg) in WriteRegister::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i, "{reg}");
            assert_eq!(WriteRegister::try_from(i as u8), Ok(*reg));
        }
    }

    #[test]
    fn test_read_register_table_matches_discriminants() {
        for (i, reg) in ReadRegister::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
            assert_eq!(ReadRegister::try_from(i as u8), Ok(*reg));
        }
    }

    #[test]
    fn test_unassigned_indices_are_errors() {
        assert_eq!(
            WriteRegister::try_from(0x2D),
            Err(TiaError::InvalidRegister(0x2D))
        );
        assert_eq!(
            WriteRegister::try_from(0x3F),
            Err(TiaError::InvalidRegister(0x3F))
        );
        assert_eq!(
            ReadRegister::try_from(0x0E),
            Err(TiaError::InvalidRegister(0x0E))
        );
    }

    #[test]
    fn test_strobes() {
        assert!(WriteRegister::WSYNC.is_strobe());
        assert!(WriteRegister::CXCLR.is_strobe());
        assert!(!WriteRegister::GRP0.is_strobe());
        assert!(!WriteRegister::HMP0.is_strobe());
    }
}
