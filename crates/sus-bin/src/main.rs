// sus: command line front end for SUS charts.
//
// Each subcommand loads one chart and prints JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use sus_model::{DecodeOptions, Decoded, SusDecoder, UnclosedHoldPolicy};
use sus_rule::{InputTrace, PlayConfig, PlayResult, replay};

#[derive(Parser, Debug)]
#[command(name = "sus", about = "SUS chart loader and judgement runner")]
struct Args {
    /// Log judgements and parser details.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Placement of holds that are never closed.
    #[arg(long, global = true, value_enum, default_value_t = HoldPolicy::ExtendPastLastNote)]
    unclosed_hold: HoldPolicy,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print chart metadata, note counts and parse warnings as JSON.
    Inspect {
        chart: PathBuf,
        /// Include every note in the output.
        #[arg(long)]
        notes: bool,
    },
    /// Replay a recorded input trace and print the result.
    Replay {
        chart: PathBuf,
        trace: PathBuf,
        /// Play config JSON; defaults apply when missing.
        #[arg(long, env = "SUS_PLAY_CONFIG", default_value = "play.json")]
        config: PathBuf,
    },
    /// Play the chart perfectly and print the result.
    Autoplay {
        chart: PathBuf,
        /// Seconds between generated frames.
        #[arg(long, default_value_t = sus_rule::DEFAULT_FRAME_STEP)]
        step: f64,
        #[arg(long, env = "SUS_PLAY_CONFIG", default_value = "play.json")]
        config: PathBuf,
        /// Also write the generated trace to this path.
        #[arg(long)]
        save_trace: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HoldPolicy {
    ExtendPastLastNote,
    ChartEnd,
}

impl From<HoldPolicy> for UnclosedHoldPolicy {
    fn from(policy: HoldPolicy) -> Self {
        match policy {
            HoldPolicy::ExtendPastLastNote => UnclosedHoldPolicy::ExtendPastLastNote,
            HoldPolicy::ChartEnd => UnclosedHoldPolicy::ChartEnd,
        }
    }
}

#[derive(Serialize)]
struct ChartSummary<'a> {
    title: &'a str,
    subtitle: &'a str,
    artist: &'a str,
    designer: &'a str,
    playlevel: &'a str,
    wave: &'a str,
    sha256: &'a str,
    duration: f64,
    offset: f64,
    initial_bpm: f64,
    min_bpm: f64,
    max_bpm: f64,
    total_notes: usize,
    total_holds: usize,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a [sus_model::Note]>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = DecodeOptions {
        unclosed_hold: args.unclosed_hold.into(),
    };

    match args.command {
        Command::Inspect { chart, notes } => {
            let decoded = load_chart(&chart, &options)?;
            let data = &decoded.chart;
            let summary = ChartSummary {
                title: &data.title,
                subtitle: &data.subtitle,
                artist: &data.artist,
                designer: &data.designer,
                playlevel: &data.playlevel,
                wave: &data.wave,
                sha256: &data.sha256,
                duration: data.duration,
                offset: data.offset,
                initial_bpm: data.initial_bpm(),
                min_bpm: data.min_bpm(),
                max_bpm: data.max_bpm(),
                total_notes: data.total_notes(),
                total_holds: data.total_holds(),
                warnings: decoded.warnings.iter().map(ToString::to_string).collect(),
                notes: notes.then_some(data.notes.as_slice()),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Replay {
            chart,
            trace,
            config,
        } => {
            let decoded = load_chart(&chart, &options)?;
            let config = load_config(&config)?;
            let trace = InputTrace::load_from(&trace)
                .with_context(|| format!("failed to load trace {}", trace.display()))?;
            info!("Replaying {} frames", trace.len());
            print_result(&replay(decoded.chart, config, &trace))?;
        }
        Command::Autoplay {
            chart,
            step,
            config,
            save_trace,
        } => {
            let decoded = load_chart(&chart, &options)?;
            let config = load_config(&config)?;
            let trace = InputTrace::autoplay(&decoded.chart, step);
            if let Some(path) = save_trace {
                trace
                    .save_to(&path)
                    .with_context(|| format!("failed to write trace {}", path.display()))?;
                info!("Trace written to {}", path.display());
            }
            print_result(&replay(decoded.chart, config, &trace))?;
        }
    }
    Ok(())
}

fn load_chart(path: &Path, options: &DecodeOptions) -> Result<Decoded> {
    let decoded = SusDecoder::decode_with_options(path, options)?;
    info!(
        "Loaded {}: {} notes, {} warnings",
        path.display(),
        decoded.chart.total_notes(),
        decoded.warnings.len()
    );
    Ok(decoded)
}

fn load_config(path: &Path) -> Result<PlayConfig> {
    PlayConfig::load_from(path).with_context(|| format!("failed to load config {}", path.display()))
}

fn print_result(result: &PlayResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
