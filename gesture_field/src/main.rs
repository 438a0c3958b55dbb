//! gesture_field — interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use gesture_field::app::{run, AppConfig};
use gesture_field::source::{FrameSource, ImageFolderSource, SyntheticSource};

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║     Gesture Field — motion + hand-gesture particle canvas    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Hands are simulated from the keyboard (see the in-window legend).");
    println!();

    let (cfg, source) = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: synthetic feed, word FLOW, 960x540\n");
        let source: Box<dyn FrameSource> = Box::new(SyntheticSource::new(320, 180));
        (AppConfig::default(), source)
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg, source) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> (AppConfig, Box<dyn FrameSource>) {
    let mut cfg = AppConfig::default();

    println!("  Frame source:");
    println!("    1. Synthetic orbiting blob (default)");
    println!("    2. Image folder playback");
    let source: Box<dyn FrameSource> = loop {
        match read_line("  Choice (1–2, default 1): ").trim() {
            "2" => {
                let dir = PathBuf::from(read_line("  Folder path: ").trim());
                match ImageFolderSource::new(&dir) {
                    Ok(s) => break Box::new(s),
                    Err(e) => println!("  ⚠  {:#}", e),
                }
            }
            _ => break Box::new(SyntheticSource::new(320, 180)),
        }
    };

    let word = read_line("  Attractor word (default FLOW): ");
    let word = word.trim();
    if !word.is_empty() {
        cfg.word = word.to_string();
    }

    cfg.width = read_dim("  Window width (default 960): ", 960);
    cfg.height = read_dim("  Window height (default 540): ", 540);

    let mirrored = read_line("  Mirrored camera feed? (Y/n): ");
    if mirrored.trim().eq_ignore_ascii_case("n") {
        cfg.classifier.mirrored = false;
    }

    (cfg, source)
}

fn read_dim(prompt: &str, default: usize) -> usize {
    let v = read_line(prompt).trim().parse().unwrap_or(default);
    v.clamp(200, 4096)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
