//! JSON checkpoint files.
//!
//! Checkpoints land in `<dir>/checkpoints/checkpoint_NNNNNN.json`, keyed by
//! the number of completed ticks.  An aborted run additionally gets
//! `abort_NNNNNN.json` holding the state that failed verification.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use shop_sim::Checkpoint;

use crate::OutputResult;

pub const CHECKPOINT_DIR: &str = "checkpoints";

pub struct CheckpointWriter {
    dir: PathBuf,
}

impl CheckpointWriter {
    /// Create `<dir>/checkpoints` if needed.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let dir = dir.join(CHECKPOINT_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, tick: u64) -> PathBuf {
        self.dir.join(format!("checkpoint_{tick:06}.json"))
    }

    pub fn write(&self, checkpoint: &Checkpoint<'_>) -> OutputResult<PathBuf> {
        let path = self.path_for(checkpoint.tick.0);
        write_json(&path, checkpoint)?;
        Ok(path)
    }

    pub fn write_abort(&self, checkpoint: &Checkpoint<'_>) -> OutputResult<PathBuf> {
        let path = self.dir.join(format!("abort_{:06}.json", checkpoint.tick.0));
        write_json(&path, checkpoint)?;
        Ok(path)
    }
}

/// Pretty-print `value` to `path`, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
