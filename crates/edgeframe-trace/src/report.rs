//! Per-trace processing with failure isolation, and the end-of-run report.
//!
//! Every trace is read, decoded and (if reliable) persisted on its own. Any
//! failure is logged with the trace path, recorded, and the batch moves on.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use crate::io::{display, read_trace_auto};
use crate::output::{frame_output_path, write_frame_file};
use anyhow::{Context, Result};
use edgeframe_core::{DecodeError, Decoded, Decoder};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Kind recorded for failures outside the decoder (open, parse, write).
pub const IO_FAILURE_KIND: &str = "Io";

/// What happened to one trace.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Frames agreed and passed the length check.
    Accepted {
        /// The frame bits.
        frame: String,
        /// Frame length in bits.
        len: usize,
        /// Number of occurrences.
        occurrences: usize,
        /// T0 in seconds.
        quantum: f64,
        /// Where the frame was written, if it met the occurrence threshold.
        output: Option<PathBuf>,
    },
    /// Reading, decoding or writing failed.
    Failed {
        /// Stable error kind (`FrameLength`, `Io`, …).
        kind: String,
        /// Human-readable message.
        message: String,
        /// Frame decoded before the failure, if any.
        frame: Option<String>,
        /// Aligned occurrences for unreliable captures (diagnostics on).
        #[serde(skip_serializing_if = "Option::is_none")]
        diagnostic: Option<String>,
    },
}

/// Outcome for one input path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceOutcome {
    /// Input trace path.
    pub trace: PathBuf,
    /// Result of processing it.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TraceOutcome {
    /// Whether this trace failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    fn failed_io(trace: &Path, err: &anyhow::Error) -> Self {
        warn!(trace = %trace.display(), "Error processing {}: {err:#}", trace.display());
        Self {
            trace: trace.to_path_buf(),
            outcome: Outcome::Failed {
                kind: IO_FAILURE_KIND.to_owned(),
                message: format!("{err:#}"),
                frame: None,
                diagnostic: None,
            },
        }
    }

    fn failed_decode(trace: &Path, err: &DecodeError) -> Self {
        warn!(trace = %trace.display(), kind = err.kind(), "Error processing {}: {err}", trace.display());
        let diagnostic = match err {
            DecodeError::UnreliableCapture {
                alignment: Some(a), ..
            } => Some(a.to_string()),
            _ => None,
        };
        Self {
            trace: trace.to_path_buf(),
            outcome: Outcome::Failed {
                kind: err.kind().to_owned(),
                message: err.to_string(),
                frame: err.partial_frame().map(ToString::to_string),
                diagnostic,
            },
        }
    }
}

/// All outcomes of one run, in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// One entry per input trace.
    pub outcomes: Vec<TraceOutcome>,
}

impl RunReport {
    /// Failed traces only.
    pub fn failures(&self) -> impl Iterator<Item = &TraceOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Number of failed traces.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Write the report as pretty JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self).with_context(|| "serialize JSON run report")?;
        w.flush().with_context(|| "flush JSON writer")?;
        Ok(())
    }
}

/// The `==== Errors ====` summary; empty when nothing failed.
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failure_count() == 0 {
            return Ok(());
        }
        writeln!(f, "==== Errors ====")?;
        for o in self.failures() {
            if let Outcome::Failed { message, frame, .. } = &o.outcome {
                writeln!(
                    f,
                    "{}: {message} \t Frame: {}",
                    o.trace.display(),
                    frame.as_deref().unwrap_or("-")
                )?;
            }
        }
        Ok(())
    }
}

/// Read, decode and persist one trace. Never fails: errors become outcomes.
#[must_use]
pub fn process_trace(trace: &Path, decoder: &Decoder, outdir: Option<&Path>) -> TraceOutcome {
    info!("Processing {}...", trace.display());

    let tf = match read_trace_auto(trace) {
        Ok(tf) => tf,
        Err(e) => return TraceOutcome::failed_io(trace, &e),
    };
    debug!(samples = tf.len(), duration_s = tf.duration(), "trace loaded");

    let decoded: Decoded = match decoder.decode_samples(&tf.samples) {
        Ok(d) => d,
        Err(e) => return TraceOutcome::failed_decode(trace, &e),
    };
    info!(
        "Frame (length {}): {} found {} times",
        decoded.len(),
        decoded.frame,
        decoded.occurrences
    );

    let output = if decoded.reliable {
        let path = frame_output_path(trace, outdir);
        if let Err(e) = write_frame_file(&path, &decoded.frame) {
            return TraceOutcome::failed_io(trace, &e);
        }
        debug!("Frame written to {}", path.display());
        Some(path)
    } else {
        debug!(
            "Skipping {}, frame did not repeat enough times.",
            trace.display()
        );
        None
    };

    TraceOutcome {
        trace: trace.to_path_buf(),
        outcome: Outcome::Accepted {
            len: decoded.len(),
            frame: decoded.frame.into_string(),
            occurrences: decoded.occurrences,
            quantum: decoded.quantum,
            output,
        },
    }
}

/// [`process_trace`] over every path, in order.
#[must_use]
pub fn process_all<P: AsRef<Path>>(
    traces: &[P],
    decoder: &Decoder,
    outdir: Option<&Path>,
) -> RunReport {
    RunReport {
        outcomes: traces
            .iter()
            .map(|t| process_trace(t.as_ref(), decoder, outdir))
            .collect(),
    }
}
