//! Whole-frame runs of a minimal NTSC kernel

use emu_atari2600::display::LineHandoff;
use emu_atari2600::tia::ntsc_to_argb;
use emu_atari2600::{Atari2600System, ConsoleSwitch, Joystick, SystemConfig};
use emu_core::cpu_6507::Memory6507;
use emu_core::System;

/// 3 lines of VSYNC, 37 of VBLANK, 192 visible lines of background color
/// $1E, 30 of overscan.
#[rustfmt::skip]
const KERNEL: [u8; 54] = [
    0xA9, 0x02,       // F000 LDA #$02
    0x85, 0x00,       // F002 STA VSYNC
    0x85, 0x02,       // F004 STA WSYNC
    0x85, 0x02,       // F006 STA WSYNC
    0x85, 0x02,       // F008 STA WSYNC
    0xA9, 0x00,       // F00A LDA #$00
    0x85, 0x00,       // F00C STA VSYNC
    0xA9, 0x02,       // F00E LDA #$02
    0x85, 0x01,       // F010 STA VBLANK
    0xA2, 0x25,       // F012 LDX #37
    0x85, 0x02,       // F014 STA WSYNC
    0xCA,             // F016 DEX
    0xD0, 0xFB,       // F017 BNE $F014
    0xA9, 0x00,       // F019 LDA #$00
    0x85, 0x01,       // F01B STA VBLANK
    0xA9, 0x1E,       // F01D LDA #$1E
    0x85, 0x09,       // F01F STA COLUBK
    0xA2, 0xC0,       // F021 LDX #192
    0x85, 0x02,       // F023 STA WSYNC
    0xCA,             // F025 DEX
    0xD0, 0xFB,       // F026 BNE $F023
    0xA9, 0x02,       // F028 LDA #$02
    0x85, 0x01,       // F02A STA VBLANK
    0xA2, 0x1E,       // F02C LDX #30
    0x85, 0x02,       // F02E STA WSYNC
    0xCA,             // F030 DEX
    0xD0, 0xFB,       // F031 BNE $F02E
    0x4C, 0x00, 0xF0, // F033 JMP $F000
];

fn kernel_rom() -> Vec<u8> {
    let mut rom = vec![0xEA; 4096];
    rom[..KERNEL.len()].copy_from_slice(&KERNEL);
    rom[0x0FFC] = 0x00;
    rom[0x0FFD] = 0xF0;
    rom
}

fn running_system() -> Atari2600System {
    let mut sys = Atari2600System::new();
    sys.mount("Cartridge", &kernel_rom()).unwrap();
    // The first frame ends at the first VSYNC, the second starts without
    // VBLANK; from the third on frames are steady.
    sys.step_frame().unwrap();
    sys.step_frame().unwrap();
    sys
}

#[test]
fn test_steady_frame_timing() {
    let mut sys = running_system();
    sys.step_frame().unwrap();

    let stats = sys.last_frame_stats();
    assert!(stats.ended_by_vsync);
    assert_eq!(stats.scanlines, 262);
    assert_eq!(stats.visible_lines, 192);
    assert_eq!(stats.cpu_cycles, 262 * 76);
}

#[test]
fn test_steady_frame_pixels() {
    let mut sys = running_system();
    let frame = sys.step_frame().unwrap();

    assert_eq!(frame.width, 160);
    assert_eq!(frame.height, 192);
    let expected = ntsc_to_argb(0x1E);
    assert!(frame.pixels.iter().all(|&p| p == expected));
}

#[test]
fn test_frames_repeat() {
    let mut sys = running_system();
    let a = sys.step_frame().unwrap();
    let b = sys.step_frame().unwrap();
    assert_eq!(a.pixels, b.pixels);
    assert_eq!(sys.last_frame_stats().scanlines, 262);
}

#[test]
fn test_save_state_resumes_identically() {
    let mut sys = running_system();
    let state = sys.save_state();
    let expected = sys.step_frame().unwrap();

    let mut restored = Atari2600System::new();
    restored.mount("Cartridge", &kernel_rom()).unwrap();
    restored.load_state(&state).unwrap();
    let frame = restored.step_frame().unwrap();

    assert_eq!(frame.pixels, expected.pixels);
    assert_eq!(restored.last_frame_stats(), sys.last_frame_stats());
}

#[test]
fn test_state_survives_json_text() {
    let mut sys = running_system();
    let text = serde_json::to_string(&sys.save_state()).unwrap();
    let expected = sys.step_frame().unwrap();

    let mut restored = Atari2600System::new();
    restored.mount("Cartridge", &kernel_rom()).unwrap();
    restored
        .load_state(&serde_json::from_str(&text).unwrap())
        .unwrap();
    assert_eq!(restored.step_frame().unwrap().pixels, expected.pixels);
}

#[test]
fn test_scanlines_over_handoff() {
    let mut sys = running_system();
    let (mut handoff, receiver) = LineHandoff::channel(256);
    sys.run_frame(&mut handoff).unwrap();
    drop(handoff);

    let lines: Vec<_> = receiver.iter().collect();
    assert_eq!(lines.len(), 192);
    assert_eq!(lines[0].line, 0);
    assert_eq!(lines[191].line, 191);
    assert!(lines[100].pixels.iter().all(|&p| p == ntsc_to_argb(0x1E)));
}

#[test]
fn test_clock_ratio_from_config() {
    // At 1 color clock per CPU cycle a 76-cycle line takes 228 CPU cycles.
    let config = SystemConfig {
        clocks_per_cpu_cycle: 1,
        ..SystemConfig::default()
    };
    let mut sys = Atari2600System::with_config(config).unwrap();
    sys.mount("Cartridge", &kernel_rom()).unwrap();
    sys.step_frame().unwrap();
    sys.step_frame().unwrap();
    sys.step_frame().unwrap();
    assert_eq!(sys.last_frame_stats().cpu_cycles, 262 * 228);
}

#[test]
fn test_controller_inputs_reach_riot() {
    let mut sys = running_system();
    sys.set_joystick(0, Joystick::Left, true);
    sys.set_console_switch(ConsoleSwitch::Reset, true);

    let bus = sys.bus();
    assert_eq!(bus.read(0x0280), 0xBF);
    assert_eq!(bus.read(0x0282) & 0x01, 0x00);
}
