//! Atari 2600 system implementation
//!
//! The system owns the CPU and the bus (TIA, RIOT, cartridge) and drives them
//! from one loop. For every CPU cycle the TIA is clocked
//! `clocks_per_cpu_cycle` times; the CPU is then ticked unless the TIA is
//! holding it for WSYNC, and the RIOT timer advances once.
//!
//! A frame ends on the rising edge of VSYNC, or after
//! `max_scanlines_per_frame` lines for programs that never raise it. Output
//! rows are counted from the first line drawn with VBLANK off.

#![allow(clippy::upper_case_acronyms)]

mod bus;
mod cartridge;
mod config;
mod cpu;
pub mod display;
mod riot;
mod serde_arrays;
pub mod tia;

pub use bus::{AddressRange, Atari2600Bus, BusError, MemoryMap};
pub use cartridge::{Cartridge, CartridgeError, CARTRIDGE_SENTINEL};
pub use config::{ConfigError, SystemConfig};
pub use cpu::Atari2600Cpu;
pub use display::{FrameRenderer, LineHandoff, Scanline, ScanlineSink};
pub use riot::{ConsoleSwitch, Joystick, Riot, RiotError};

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{types::Frame, MountPointInfo, System};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use tia::{convert_line, TiaError, VISIBLE_WIDTH};

const SAVE_STATE_VERSION: u64 = 1;
const SYSTEM_NAME: &str = "atari2600";
const CARTRIDGE_MOUNT: &str = "Cartridge";

#[derive(Debug, Error)]
pub enum Atari2600Error {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("TIA error: {0}")]
    Tia(#[from] TiaError),
    #[error("No cartridge loaded")]
    NoCartridge,
    #[error("Invalid mount point: {0}")]
    InvalidMountPoint(String),
    #[error("Illegal opcode {opcode:#04X} at {address:#06X}")]
    IllegalOpcode { opcode: u8, address: u16 },
}

/// Summary of one emulated frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    pub scanlines: u16,
    /// Lines drawn with VBLANK off, including any beyond the output height.
    pub visible_lines: u16,
    pub cpu_cycles: u64,
    /// `false` when the frame was cut at the scanline cap.
    pub ended_by_vsync: bool,
}

/// Progress through the current frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FrameState {
    scanline: u16,
    visible_row: u16,
    cpu_cycles: u64,
    vsync_high: bool,
}

/// Atari 2600 system
pub struct Atari2600System {
    cpu: Atari2600Cpu,
    bus: Atari2600Bus,
    config: SystemConfig,
    frame: FrameState,
    last_frame: FrameStats,
    cycles: u64,
    frames: u64,
}

impl Default for Atari2600System {
    fn default() -> Self {
        Self::new()
    }
}

impl Atari2600System {
    /// System with the default configuration.
    pub fn new() -> Self {
        let config = SystemConfig::default();
        Self {
            cpu: Atari2600Cpu::new(config.illegal_opcode_limit),
            bus: Atari2600Bus::new(),
            config,
            frame: FrameState::default(),
            last_frame: FrameStats::default(),
            cycles: 0,
            frames: 0,
        }
    }

    pub fn with_config(config: SystemConfig) -> Result<Self, Atari2600Error> {
        config.validate()?;
        Ok(Self {
            cpu: Atari2600Cpu::new(config.illegal_opcode_limit),
            bus: Atari2600Bus::with_map(config.memory_map.clone())?,
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn bus(&self) -> &Atari2600Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Atari2600Bus {
        &mut self.bus
    }

    pub fn cpu(&self) -> &Atari2600Cpu {
        &self.cpu
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_frame
    }

    /// Get debug information
    pub fn debug_info(&self) -> Option<DebugInfo> {
        self.bus.cartridge.as_ref().map(|cart| DebugInfo {
            rom_size: cart.size(),
            pc: self.cpu.core.pc,
            scanline: self.frame.scanline,
            color_clock: self.bus.tia.counter(),
            cycles: self.cycles,
            frames: self.frames,
        })
    }

    pub fn set_joystick(&mut self, player: u8, direction: Joystick, pressed: bool) {
        self.bus.riot.set_joystick(player, direction, pressed);
    }

    pub fn set_fire_button(&mut self, player: u8, pressed: bool) -> Result<(), Atari2600Error> {
        // INPT4 and INPT5
        let port = match player {
            0 | 1 => 4 + player,
            _ => return Err(TiaError::InvalidInputPort(player.saturating_add(4)).into()),
        };
        let level = if pressed { 0x00 } else { 0x80 };
        self.bus.tia.set_input_port(port, level)?;
        Ok(())
    }

    pub fn set_console_switch(&mut self, switch: ConsoleSwitch, closed: bool) {
        self.bus.riot.set_console_switch(switch, closed);
    }

    /// Run until the end of the frame, handing each visible scanline to
    /// `sink`.
    pub fn run_frame(&mut self, sink: &mut dyn ScanlineSink) -> Result<FrameStats, Atari2600Error> {
        if self.bus.cartridge.is_none() {
            return Err(Atari2600Error::NoCartridge);
        }
        loop {
            if let Some(stats) = self.clock_cpu_cycle(sink)? {
                return Ok(stats);
            }
        }
    }

    /// One CPU cycle and the TIA clocks that go with it. Returns the frame
    /// statistics when this cycle ended a frame.
    fn clock_cpu_cycle(
        &mut self,
        sink: &mut dyn ScanlineSink,
    ) -> Result<Option<FrameStats>, Atari2600Error> {
        let mut capped = false;
        for _ in 0..self.config.clocks_per_cpu_cycle {
            if self.bus.tia.tick() {
                capped |= self.finish_scanline(sink);
            }
        }

        if !self.bus.tia.wait_for_sync() {
            self.cpu.tick(&mut self.bus)?;
        }
        self.bus.riot.clock();
        self.cycles += 1;
        self.frame.cpu_cycles += 1;

        let vsync = self.bus.tia.vsync();
        let rising = vsync && !self.frame.vsync_high;
        self.frame.vsync_high = vsync;

        if rising || capped {
            Ok(Some(self.end_frame(rising)))
        } else {
            Ok(None)
        }
    }

    /// Returns `true` once the frame has reached the scanline cap.
    fn finish_scanline(&mut self, sink: &mut dyn ScanlineSink) -> bool {
        if !self.bus.tia.vblank() {
            let row = self.frame.visible_row;
            if row < self.config.visible_lines {
                let mut pixels = [0u32; VISIBLE_WIDTH];
                convert_line(self.bus.tia.line_buffer(), &mut pixels);
                sink.push_scanline(row, &pixels);
            }
            self.frame.visible_row = row.saturating_add(1);
        }

        self.frame.scanline += 1;
        self.frame.scanline >= self.config.max_scanlines_per_frame
    }

    fn end_frame(&mut self, ended_by_vsync: bool) -> FrameStats {
        let stats = FrameStats {
            scanlines: self.frame.scanline,
            visible_lines: self.frame.visible_row,
            cpu_cycles: self.frame.cpu_cycles,
            ended_by_vsync,
        };
        if !ended_by_vsync {
            log(LogCategory::TIA, LogLevel::Debug, || {
                format!(
                    "TIA: no VSYNC within {} scanlines, frame cut",
                    self.config.max_scanlines_per_frame
                )
            });
        }

        self.frame = FrameState {
            vsync_high: self.frame.vsync_high,
            ..FrameState::default()
        };
        self.frames += 1;
        self.last_frame = stats;
        stats
    }
}

#[derive(Debug, Clone)]
pub struct DebugInfo {
    pub rom_size: usize,
    pub pc: u16,
    pub scanline: u16,
    pub color_clock: u16,
    pub cycles: u64,
    pub frames: u64,
}

impl System for Atari2600System {
    type Error = Atari2600Error;

    fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.frame = FrameState::default();
        self.last_frame = FrameStats::default();
        self.cycles = 0;
        self.frames = 0;
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        let mut renderer = FrameRenderer::new(self.config.visible_lines);
        self.run_frame(&mut renderer)?;
        Ok(renderer.into_frame())
    }

    fn save_state(&self) -> Value {
        serde_json::json!({
            "version": SAVE_STATE_VERSION,
            "system": SYSTEM_NAME,
            "cycles": self.cycles,
            "frames": self.frames,
            "frame": self.frame,
            "cpu": self.cpu,
            "bus": self.bus,
            "config": self.config,
        })
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        let version = v["version"].as_u64().unwrap_or(0);
        if version != SAVE_STATE_VERSION {
            return Err(serde_json::Error::custom(format!(
                "unsupported save state version {}",
                version
            )));
        }

        let system = v["system"].as_str().unwrap_or("");
        if system != SYSTEM_NAME {
            return Err(serde_json::Error::custom(format!(
                "save state is for '{}', not '{}'",
                system, SYSTEM_NAME
            )));
        }

        let config: SystemConfig = serde_json::from_value(v["config"].clone())?;
        config.validate().map_err(serde_json::Error::custom)?;
        let mut cpu: Atari2600Cpu = serde_json::from_value(v["cpu"].clone())?;
        let mut bus: Atari2600Bus = serde_json::from_value(v["bus"].clone())?;
        let frame: FrameState = serde_json::from_value(v["frame"].clone())?;

        cpu.set_illegal_limit(config.illegal_opcode_limit);
        bus.set_map(config.memory_map.clone())
            .map_err(serde_json::Error::custom)?;
        // ROM data is not part of the state
        bus.cartridge = self.bus.cartridge.take();

        self.cpu = cpu;
        self.bus = bus;
        self.config = config;
        self.frame = frame;
        self.cycles = v["cycles"].as_u64().unwrap_or(0);
        self.frames = v["frames"].as_u64().unwrap_or(0);
        Ok(())
    }

    fn supports_save_states(&self) -> bool {
        true
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        vec![MountPointInfo {
            id: CARTRIDGE_MOUNT.to_string(),
            name: "Cartridge Slot".to_string(),
            extensions: vec!["a26".to_string(), "bin".to_string()],
            required: true,
        }]
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if mount_point_id != CARTRIDGE_MOUNT {
            return Err(Atari2600Error::InvalidMountPoint(
                mount_point_id.to_string(),
            ));
        }

        self.bus.load_cartridge(data)?;
        self.reset();
        Ok(())
    }

    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error> {
        if mount_point_id != CARTRIDGE_MOUNT {
            return Err(Atari2600Error::InvalidMountPoint(
                mount_point_id.to_string(),
            ));
        }

        self.bus.cartridge = None;
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        mount_point_id == CARTRIDGE_MOUNT && self.bus.cartridge.is_some()
    }
}
