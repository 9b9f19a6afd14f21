//! YM2149 synth renderer
//!
//! Renders a JSON score (or a built-in demo) through the PSG core and
//! writes the result to a WAV file.

use std::env;
use std::fs;

use anyhow::{bail, Context};
use ym2149_synth::score::ScoreEvent;
use ym2149_synth::{write_wav, ExportConfig, Score};

/// Parsed command-line arguments.
#[derive(Debug, Default)]
struct CliArgs {
    /// Score file to render (None = demo)
    score_path: Option<String>,
    /// WAV output path
    out_path: Option<String>,
    stereo: bool,
    center: bool,
    normalize: bool,
    fade_out: f32,
    show_help: bool,
}

impl CliArgs {
    fn parse() -> anyhow::Result<Self> {
        let mut args = Self::default();
        let mut iter = env::args().skip(1);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => args.show_help = true,
                "--stereo" => args.stereo = true,
                "--center" => args.center = true,
                "--normalize" => args.normalize = true,
                "--demo" => args.score_path = None,
                "-o" | "--out" => {
                    args.out_path = Some(iter.next().context("--out requires a path")?);
                }
                "--fade-out" => {
                    let value = iter.next().context("--fade-out requires seconds")?;
                    args.fade_out = value
                        .parse()
                        .with_context(|| format!("invalid --fade-out value: {value}"))?;
                }
                _ if arg.starts_with('-') => bail!("Unknown flag: {arg}"),
                _ => args.score_path = Some(arg),
            }
        }

        Ok(args)
    }

    fn print_help() {
        eprintln!(
            "Usage:\n  ym2149-synth [flags] [score.json] -o <out.wav>\n\n\
             Flags:\n\
             \x20 -o, --out <path>     WAV file to write (required)\n\
             \x20 --stereo             Write two identical channels\n\
             \x20 --center             Remove the DC offset of the unipolar output\n\
             \x20 --normalize          Scale to full range\n\
             \x20 --fade-out <secs>    Fade out the last seconds\n\
             \x20 --demo               Render the built-in A4 demo (default without a score)\n\
             \x20 -h, --help           Show this help\n\n\
             Score format:\n\
             \x20 {{ \"sample_rate\": 44100, \"length\": 44100,\n\
             \x20   \"events\": [{{ \"at\": 0, \"register\": 7, \"value\": 62 }}] }}\n"
        );
    }
}

/// One second of A4 on voice A, then A5 on voice B under a triangle envelope
fn demo_score() -> Score {
    let sample_rate = 44_100;
    let ev = |at: u64, register: i64, value: i64| ScoreEvent { at, register, value };
    Score {
        sample_rate,
        length: 2 * sample_rate as u64,
        events: vec![
            ev(0, 0x07, 0x3C), // tone A + B
            ev(0, 0x00, 0x1C), // A4 period low
            ev(0, 0x01, 0x01), // A4 period high
            ev(0, 0x08, 0x0F),
            ev(44_100, 0x08, 0x00),
            ev(44_100, 0x02, 0x8E), // A5 period
            ev(44_100, 0x03, 0x00),
            ev(44_100, 0x0B, 0x00),
            ev(44_100, 0x0C, 0x04),
            ev(44_100, 0x09, 0x10), // B follows the envelope
            ev(44_100, 0x0D, 0x0E), // triangle
        ],
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse()?;
    if args.show_help {
        CliArgs::print_help();
        return Ok(());
    }
    let Some(out_path) = args.out_path.as_deref() else {
        CliArgs::print_help();
        bail!("missing --out <path>");
    };

    let score = match &args.score_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read score {path}"))?;
            Score::from_json(&json).with_context(|| format!("failed to parse score {path}"))?
        }
        None => {
            log::info!("No score given, rendering demo");
            demo_score()
        }
    };

    log::info!(
        "Rendering {} samples at {}Hz ({} events)",
        score.length,
        score.sample_rate,
        score.events.len()
    );
    let samples = score.render()?;

    let base = if args.stereo {
        ExportConfig::stereo()
    } else {
        ExportConfig::mono()
    };
    let config = base
        .sample_rate(score.sample_rate)
        .center(args.center)
        .normalize(args.normalize)
        .fade_out(args.fade_out);

    write_wav(out_path, &samples, config)?;
    log::info!("Export complete: {out_path}");
    Ok(())
}
