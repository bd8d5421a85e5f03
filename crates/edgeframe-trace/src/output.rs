//! `.frame` artifacts: naming and writing.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use crate::io::display;
use anyhow::{Context, Result};
use edgeframe_core::Frame;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension of persisted frame files.
pub const FRAME_EXTENSION: &str = "frame";

/// `<stem>.frame`, next to `trace` or inside `outdir` when given.
#[must_use]
pub fn frame_output_path(trace: &Path, outdir: Option<&Path>) -> PathBuf {
    match outdir {
        Some(dir) => {
            let stem = trace.file_stem().unwrap_or(trace.as_os_str());
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(FRAME_EXTENSION);
            dir.join(name)
        }
        None => trace.with_extension(FRAME_EXTENSION),
    }
}

/// Write `frame` plus a newline to `path`, creating the parent directory.
pub fn write_frame_file(path: &Path, frame: &Frame) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }
    }
    let f = File::create(path).with_context(|| format!("create {}", display(path)))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "{frame}").with_context(|| format!("write {}", display(path)))?;
    w.flush().with_context(|| "flush frame writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_trace_stem() {
        let p = frame_output_path(Path::new("captures/run1.csv"), None);
        assert_eq!(p, PathBuf::from("captures/run1.frame"));

        let p = frame_output_path(Path::new("captures/run1.csv"), Some(Path::new("out")));
        assert_eq!(p, PathBuf::from("out/run1.frame"));

        let p = frame_output_path(Path::new("a.b.csv"), Some(Path::new("out")));
        assert_eq!(p, PathBuf::from("out/a.b.frame"));
    }

    #[test]
    fn writes_frame_with_newline_and_creates_dir() {
        let dir = crate::test_util::tmp_path("outdir", "d");
        let path = frame_output_path(Path::new("trace.csv"), Some(&dir));
        write_frame_file(&path, &Frame::new("0101")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0101\n");
        let _ = std::fs::remove_dir_all(dir);
    }
}
