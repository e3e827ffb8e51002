//! Chip logging reaches the configured log file under its own category

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use emu_atari2600::Atari2600Bus;
use emu_core::cpu_6507::Memory6507;
use emu_core::logging::{LogCategory, LogConfig, LogLevel};

fn log_path() -> PathBuf {
    std::env::temp_dir().join(format!("emu_atari2600_riot_{}.log", std::process::id()))
}

/// The writer thread appends asynchronously; poll until `needle` shows up.
fn wait_for(path: &Path, needle: &str) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        if contents.contains(needle) || Instant::now() > deadline {
            return contents;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_riot_events_logged_under_riot_category() {
    let path = log_path();
    let _ = std::fs::remove_file(&path);

    let config = LogConfig::global();
    config.set_level(LogCategory::RIOT, LogLevel::Trace);
    config.set_log_file(path.clone()).unwrap();

    let mut bus = Atari2600Bus::new();
    bus.write(0x0294, 2); // TIM1T
    for _ in 0..3 {
        bus.riot.clock();
    }
    // $0100 is RIOT offset $080, between RAM and its stack mirror
    assert_eq!(bus.read(0x0100), 0);

    let contents = wait_for(&path, "outside RAM and I/O");
    config.clear_log_file();
    config.reset();
    let _ = std::fs::remove_file(&path);

    assert!(contents.contains("RIOT: timer set to 2 at 1 cycles per tick"), "{contents}");
    assert!(contents.contains("RIOT: timer underflow"), "{contents}");
    assert!(
        contents.contains("RIOT: read at offset 0x080 outside RAM and I/O"),
        "{contents}"
    );
}
