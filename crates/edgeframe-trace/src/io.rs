//! I/O helpers for captures and decode configs.
//!
//! Captures come as logic-analyzer CSV exports (`time,level` rows under a
//! `Time…` header) or as the serialized [`TraceFile`] envelope in JSON/CBOR.
//! Format is picked from the file extension.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use crate::format::TraceFile;
use anyhow::{anyhow, bail, Context, Result};
use edgeframe_core::{DecodeConfig, Level, Sample};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/* ---------------- CSV ---------------- */

/// Parse CSV rows `time,level` from any buffered reader.
///
/// Blank rows and rows whose first column starts with `Time` are skipped.
/// Columns past the second are ignored.
pub fn parse_csv<R: BufRead>(rdr: R) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (idx, line) in rdr.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("read line {line_no}"))?;
        let row = line.trim();
        if row.is_empty() || row.starts_with("Time") {
            continue;
        }

        let mut cols = row.split(',').map(str::trim);
        let (Some(t), Some(v)) = (cols.next(), cols.next()) else {
            bail!("line {line_no}: expected `time,level`, got {row:?}");
        };
        let time: f64 = t
            .parse()
            .with_context(|| format!("line {line_no}: bad timestamp {t:?}"))?;
        let raw: u8 = v
            .parse()
            .with_context(|| format!("line {line_no}: bad logic level {v:?}"))?;
        let level = Level::try_from(raw).map_err(|e| anyhow!("line {line_no}: {e}"))?;
        samples.push(Sample::new(time, level));
    }
    Ok(samples)
}

/// Read a capture from a **CSV** export.
pub fn read_trace_csv<P: AsRef<Path>>(path: P) -> Result<TraceFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let samples = parse_csv(BufReader::new(f))
        .with_context(|| format!("parse CSV trace {}", display(path_ref)))?;
    Ok(TraceFile::new(samples))
}

/// Write a capture as **CSV** with a `Time [s],Channel 0` header.
pub fn write_trace_csv<P: AsRef<Path>>(path: P, v: &TraceFile) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "Time [s],Channel 0")?;
    for s in &v.samples {
        writeln!(w, "{:.9},{}", s.time, s.level)?;
    }
    w.flush().with_context(|| "flush CSV writer")?;
    Ok(())
}

/* ---------------- JSON ---------------- */

/// Read a `TraceFile` from **JSON**.
pub fn read_trace_json<P: AsRef<Path>>(path: P) -> Result<TraceFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: TraceFile =
        serde_json::from_reader(rdr).with_context(|| "deserialize JSON trace file")?;
    Ok(v)
}

/// Write a `TraceFile` to **JSON** (pretty).
pub fn write_trace_json<P: AsRef<Path>>(path: P, v: &TraceFile) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON trace file")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/* ---------------- CBOR ---------------- */

/// Read a `TraceFile` from **CBOR**.
pub fn read_trace_cbor<P: AsRef<Path>>(path: P) -> Result<TraceFile> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    let v: TraceFile =
        ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR trace file")?;
    Ok(v)
}

/// Write a `TraceFile` to **CBOR**.
pub fn write_trace_cbor<P: AsRef<Path>>(path: P, v: &TraceFile) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR trace file")?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/* --------------- Auto-detect by extension --------------- */

/// Auto-detect **read** by extension (`.csv` / `.json` / `.cbor`, case-insensitive).
pub fn read_trace_auto<P: AsRef<Path>>(path: P) -> Result<TraceFile> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("csv") => read_trace_csv(path),
        Some("json") => read_trace_json(path),
        Some("cbor") => read_trace_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported trace extension: {} (supported: .csv, .json, .cbor)",
            other
        )),
        None => Err(anyhow!("path has no extension (expected .csv, .json or .cbor)")),
    }
}

/// Auto-detect **write** (defaults to CSV if unknown/missing).
pub fn write_trace_auto<P: AsRef<Path>>(path: P, v: &TraceFile) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => write_trace_json(path, v),
        Some("cbor") => write_trace_cbor(path, v),
        _ => write_trace_csv(path, v),
    }
}

/* ---------------- Config ---------------- */

/// Read a [`DecodeConfig`] from **TOML**; missing fields take their defaults.
pub fn read_config_toml<P: AsRef<Path>>(path: P) -> Result<DecodeConfig> {
    let path_ref = path.as_ref();
    let src =
        fs::read_to_string(path_ref).with_context(|| format!("read config {}", display(path_ref)))?;
    let cfg: DecodeConfig = toml::from_str(&src).context("parse config toml")?;
    Ok(cfg)
}

/* ---------------- Small helpers ---------------- */

#[inline]
pub(crate) fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

#[inline]
pub(crate) fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
