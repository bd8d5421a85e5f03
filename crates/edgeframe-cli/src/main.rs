// crates/edgeframe-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use edgeframe_core::{DecodeConfig, Decoder, QuantumLevel};
use edgeframe_trace::{
    generator::{generate_capture, SimParams},
    io::{read_config_toml, write_trace_auto},
    report::{process_trace, Outcome, RunReport},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "edgeframe",
    about = "Recover the repeating frame from logic-analyzer captures",
    long_about = "edgeframe reads single-channel logic-analyzer captures, recovers the bit \
                  quantum, cuts the idle-delimited frames and checks that they all agree.\n\n\
                  Reliable frames are written to `<trace>.frame`.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode one or more captures (CSV/JSON/CBOR) and persist reliable frames.
    Decode {
        /// Capture files, processed in order.
        #[arg(required = true)]
        traces: Vec<PathBuf>,

        /// Verbose pipeline logs and frame alignment for unreliable captures.
        #[arg(long, default_value_t = false)]
        debug: bool,

        /// Write `.frame` files here instead of next to each capture.
        #[arg(long)]
        outdir: Option<PathBuf>,

        /// TOML decode config; flags below override its fields.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Consecutive idle bits that close a frame.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        min_idle: Option<u32>,

        /// Occurrences needed before a frame is written.
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Fixed bit quantum in seconds instead of estimating it.
        #[arg(long)]
        quantum: Option<f64>,

        /// Level whose shortest run sets the quantum.
        #[arg(long, value_enum)]
        quantum_level: Option<QuantumLevelOpt>,

        /// Write the run report as JSON (`-` for stdout).
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write a synthetic capture of a repeated bit pattern.
    Simulate {
        /// Frame bits, e.g. `0100110100011010...`.
        #[arg(long)]
        pattern: String,

        /// Repetitions of the pattern (>0).
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        repeats: u32,

        /// Bit time in seconds.
        #[arg(long, default_value_t = 1e-3)]
        bit_time: f64,

        /// Idle bits after each repetition.
        #[arg(long, default_value_t = 25)]
        idle_bits: usize,

        /// Idle bits before the first repetition.
        #[arg(long, default_value_t = 40)]
        lead_bits: usize,

        /// Samples per bit (1 = one sample per edge).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        oversample: u32,

        /// Relative run-length jitter in [0, 0.5).
        #[arg(long, default_value_t = 0.0)]
        jitter: f64,

        /// RNG seed for the jitter.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output capture (CSV/JSON/CBOR by extension).
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum QuantumLevelOpt {
    Low,
    High,
    Any,
}

impl From<QuantumLevelOpt> for QuantumLevel {
    fn from(v: QuantumLevelOpt) -> Self {
        match v {
            QuantumLevelOpt::Low => Self::Low,
            QuantumLevelOpt::High => Self::High,
            QuantumLevelOpt::Any => Self::Any,
        }
    }
}

/// Decode-time flags that override the config file.
#[derive(Debug, Default)]
struct Overrides {
    debug: bool,
    min_idle: Option<u32>,
    min_occurrences: Option<usize>,
    quantum: Option<f64>,
    quantum_level: Option<QuantumLevelOpt>,
}

impl Overrides {
    fn apply(self, mut cfg: DecodeConfig) -> DecodeConfig {
        cfg.debug |= self.debug;
        if let Some(n) = self.min_idle {
            cfg.min_idle = n as usize;
        }
        if let Some(n) = self.min_occurrences {
            cfg.min_occurrences = n;
        }
        if self.quantum.is_some() {
            cfg.quantum_override = self.quantum;
        }
        if let Some(l) = self.quantum_level {
            cfg.quantum_level = l.into();
        }
        cfg
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Decode {
            traces,
            debug,
            outdir,
            config,
            min_idle,
            min_occurrences,
            quantum,
            quantum_level,
            report,
        } => {
            // Config first: `debug = true` in the file also enables debug logs.
            let cfg = load_config(
                config.as_deref(),
                Overrides {
                    debug,
                    min_idle,
                    min_occurrences,
                    quantum,
                    quantum_level,
                },
            )?;
            init_tracing(cfg.debug);
            decode(&traces, cfg, outdir.as_deref(), report.as_deref())
        }

        Cmd::Simulate {
            pattern,
            repeats,
            bit_time,
            idle_bits,
            lead_bits,
            oversample,
            jitter,
            seed,
            out,
        } => {
            init_tracing(false);
            simulate(
                SimParams {
                    pattern,
                    repeats: repeats as usize,
                    bit_time,
                    idle_bits,
                    lead_bits,
                    oversample: oversample as usize,
                    jitter,
                    seed,
                },
                &out,
            )
        }
    }
}

/// Filter used when `RUST_LOG` is unset.
const fn default_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Initialize tracing with an env-driven filter (default INFO, DEBUG when the
/// merged decode config has `debug` set).
fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<DecodeConfig> {
    let base = match path {
        Some(p) => {
            read_config_toml(p).with_context(|| format!("loading config {}", p.display()))?
        }
        None => DecodeConfig::default(),
    };
    Ok(overrides.apply(base))
}

fn decode(
    traces: &[PathBuf],
    cfg: DecodeConfig,
    outdir: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    debug!(?cfg, "decode config");
    let decoder = Decoder::new(cfg).context("invalid decode config")?;

    info!(traces = traces.len(), outdir = ?outdir, "decoding");
    let mut report = RunReport::default();
    for trace in traces {
        let outcome = process_trace(trace, &decoder, outdir);
        if let Outcome::Failed {
            diagnostic: Some(text),
            ..
        } = &outcome.outcome
        {
            println!("{text}");
        }
        report.outcomes.push(outcome);
    }

    let persisted = report
        .outcomes
        .iter()
        .filter(|o| matches!(o.outcome, Outcome::Accepted { output: Some(_), .. }))
        .count();
    println!(
        "Decoded {} traces: {} failed, {} frames written",
        report.outcomes.len(),
        report.failure_count(),
        persisted
    );
    print!("{report}");

    match report_path {
        Some(p) if p.as_os_str() == "-" => {
            let json = serde_json::to_string_pretty(&report).context("serialize run report")?;
            println!("{json}");
        }
        Some(p) => {
            ensure_parent_dir(p)?;
            report
                .write_json(p)
                .with_context(|| format!("writing report to {}", p.display()))?;
            println!("Report → {}", p.display());
        }
        None => {}
    }
    Ok(())
}

fn simulate(params: SimParams, out: &Path) -> Result<()> {
    info!(
        pattern = %params.pattern,
        repeats = params.repeats,
        oversample = params.oversample,
        jitter = params.jitter,
        "generating synthetic capture"
    );
    let tf = generate_capture(&params)?;

    ensure_parent_dir(out)?;
    write_trace_auto(out, &tf).with_context(|| format!("writing capture to {}", out.display()))?;

    println!(
        "Simulated capture: {} bits x{} → {} samples ({:.3} s) → {}",
        params.pattern.len(),
        params.repeats,
        tf.len(),
        tf.duration(),
        out.display()
    );
    Ok(())
}
