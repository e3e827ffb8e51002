use anyhow::{anyhow, Context, Result};
use clap::Parser;
use emu_atari2600::{Atari2600System, SystemConfig};
use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_core::types::Frame;
use emu_core::System;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run an Atari 2600 cartridge without a window.
#[derive(Parser)]
#[command(name = "hemu-cli")]
struct Args {
    /// Cartridge image (.a26 / .bin)
    rom: PathBuf,

    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// System configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume from a save-state written by --save
    #[arg(long)]
    load: Option<PathBuf>,

    /// Dump save-state to this file as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Write the last frame as a binary PPM
    #[arg(long)]
    ppm: Option<PathBuf>,

    /// Level for every core log category: off, error, warn, info, debug, trace
    #[arg(long, default_value = "off")]
    log_level: String,

    #[arg(long)]
    log_cpu: Option<String>,

    #[arg(long)]
    log_bus: Option<String>,

    #[arg(long)]
    log_tia: Option<String>,

    #[arg(long)]
    log_riot: Option<String>,

    /// Write core logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Suppress per-frame output
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn parse_level(name: &str) -> Result<LogLevel> {
    LogLevel::from_str(name).ok_or_else(|| anyhow!("Unknown log level: {}", name))
}

fn configure_core_logging(args: &Args) -> Result<()> {
    let config = LogConfig::global();
    config.set_global_level(parse_level(&args.log_level)?);

    let overrides = [
        (LogCategory::CPU, &args.log_cpu),
        (LogCategory::Bus, &args.log_bus),
        (LogCategory::TIA, &args.log_tia),
        (LogCategory::RIOT, &args.log_riot),
    ];
    for (category, level) in overrides {
        if let Some(level) = level {
            config.set_level(category, parse_level(level)?);
        }
    }

    if let Some(path) = &args.log_file {
        config
            .set_log_file(path.clone())
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
    }
    Ok(())
}

fn write_ppm(path: &Path, frame: &Frame) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P6\n{} {}\n255\n", frame.width, frame.height)?;
    for &pixel in &frame.pixels {
        let [_, r, g, b] = pixel.to_be_bytes();
        out.write_all(&[r, g, b])?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    configure_core_logging(&args)?;

    let config = match &args.config {
        Some(path) => SystemConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SystemConfig::default(),
    };
    let mut sys = Atari2600System::with_config(config)?;

    let rom = fs::read(&args.rom)
        .with_context(|| format!("Failed to read ROM {}", args.rom.display()))?;
    sys.mount("Cartridge", &rom)?;
    log::info!("Loaded {} ({} bytes)", args.rom.display(), rom.len());

    if let Some(path) = &args.load {
        let state: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        sys.load_state(&state)
            .with_context(|| format!("Failed to load state {}", path.display()))?;
        log::info!("Resumed from {}", path.display());
    }

    let mut last_frame = None;
    for fnum in 1..=args.frames {
        let frame = sys.step_frame()?;
        if !args.quiet {
            let stats = sys.last_frame_stats();
            log::info!(
                "Frame {}: {} scanlines, {} visible, {} CPU cycles{}",
                fnum,
                stats.scanlines,
                stats.visible_lines,
                stats.cpu_cycles,
                if stats.ended_by_vsync { "" } else { " (no VSYNC)" }
            );
        }
        last_frame = Some(frame);
    }

    if let Some(info) = sys.debug_info() {
        log::debug!(
            "PC={:04X} scanline={} clock={} cycles={}",
            info.pc,
            info.scanline,
            info.color_clock,
            info.cycles
        );
    }

    if let (Some(path), Some(frame)) = (&args.ppm, &last_frame) {
        write_ppm(path, frame)?;
        log::info!("Wrote {}x{} frame to {}", frame.width, frame.height, path.display());
    }

    if let Some(path) = &args.save {
        let state = sys.save_state();
        let mut f = File::create(path)?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
        log::info!("Saved state to {}", path.display());
    }

    Ok(())
}
