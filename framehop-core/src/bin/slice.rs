//! `framehop-slice`: window a WAV file and print per-window levels as JSON.
//!
//! ```text
//! framehop-slice --input <file.wav> [--config <settings.json>]
//!                [--slice <frames>] [--hop <frames>] [--buffer <frames>]
//!                [--output <file.json>]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

use framehop_core::signal::{PumpSummary, SignalPump, SignalSink};
use framehop_core::{
    AudioBuffer, FramehopError, SlidingWindow, WavSource, WindowSettings, WindowStats,
};

#[derive(Debug)]
struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    slice: Option<usize>,
    hop: Option<usize>,
    buffer_frames: usize,
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowLevel {
    frame: u64,
    time_secs: f64,
    rms: f32,
    peak: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    input: String,
    settings: WindowSettings,
    pump: PumpSummary,
    stats: WindowStats,
    windows: Vec<WindowLevel>,
}

/// Terminal sink that reduces every window to its level.
struct LevelSink {
    levels: std::sync::Arc<parking_lot::Mutex<Vec<WindowLevel>>>,
}

impl SignalSink for LevelSink {
    fn process(&mut self, buffer: AudioBuffer) -> Result<(), FramehopError> {
        let samples = buffer.samples();
        let rms = if samples.is_empty() {
            0.0
        } else {
            (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
        };
        let peak = samples.iter().fold(0f32, |acc, s| acc.max(s.abs()));

        self.levels.lock().push(WindowLevel {
            frame: buffer.frame_number(),
            time_secs: buffer.time_position_secs(),
            rms,
            peak,
        });
        Ok(())
    }
}

fn parse_args() -> anyhow::Result<Args> {
    let mut input: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut slice: Option<usize> = None;
    let mut hop: Option<usize> = None;
    let mut buffer_frames: usize = 4096;
    let mut output: Option<PathBuf> = None;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--input" => {
                let v = it.next().context("missing value for --input")?;
                input = Some(PathBuf::from(v));
            }
            "--config" => {
                let v = it.next().context("missing value for --config")?;
                config = Some(PathBuf::from(v));
            }
            "--slice" => {
                let v = it.next().context("missing value for --slice")?;
                slice = Some(v.parse().context("invalid value for --slice")?);
            }
            "--hop" => {
                let v = it.next().context("missing value for --hop")?;
                hop = Some(v.parse().context("invalid value for --hop")?);
            }
            "--buffer" => {
                let v = it.next().context("missing value for --buffer")?;
                buffer_frames = v
                    .parse::<usize>()
                    .context("invalid value for --buffer")?
                    .clamp(1, 1 << 20);
            }
            "--output" => {
                let v = it.next().context("missing value for --output")?;
                output = Some(PathBuf::from(v));
            }
            "--help" | "-h" => {
                println!(
                    "Usage: framehop-slice --input <file.wav> [--config <settings.json>] \\
  [--slice <frames>] [--hop <frames>] [--buffer <frames>] [--output <file.json>]"
                );
                std::process::exit(0);
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    let Some(input) = input else {
        bail!("--input is required");
    };
    Ok(Args {
        input,
        config,
        slice,
        hop,
        buffer_frames,
        output,
    })
}

fn load_settings(args: &Args) -> anyhow::Result<WindowSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            WindowSettings::from_json(&json)?
        }
        None => WindowSettings::default(),
    };
    if let Some(slice) = args.slice {
        settings.slice_length = slice;
    }
    if let Some(hop) = args.hop {
        settings.hop_size = hop;
    }
    Ok(settings)
}

fn run() -> anyhow::Result<()> {
    let args = parse_args()?;
    let settings = load_settings(&args)?;

    let levels = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let window = SlidingWindow::from_settings(&settings)?.with_sink(LevelSink {
        levels: std::sync::Arc::clone(&levels),
    });
    let source = WavSource::open(&args.input, args.buffer_frames)?;

    let mut pump = SignalPump::new(source, window);
    let summary = pump.pump()?;
    let stats = pump.sink().stats();

    info!(
        windows = stats.windows_emitted,
        padded = stats.padded_windows,
        "slicing finished"
    );

    let report = Report {
        input: args.input.display().to_string(),
        settings,
        pump: summary,
        stats,
        windows: std::mem::take(&mut *levels.lock()),
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(out) = args.output {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;
        println!("wrote report to {}", out.display());
    } else {
        println!("{json}");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("framehop_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("framehop-slice failed: {e:#}");
        std::process::exit(1);
    }
}
