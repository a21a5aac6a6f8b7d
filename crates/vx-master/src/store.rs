//! Persistent store collaborator for spooled segments.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::spool::Segment;
use crate::wav::write_wav;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable destination for finished segments.
pub trait SegmentStore {
    fn persist(&mut self, segment: &Segment) -> Result<(), StoreError>;
}

/// Writes each segment as `<dir>/<name>.wav` (16-bit PCM).
#[derive(Clone, Debug)]
pub struct WavDirStore {
    dir: PathBuf,
}

impl WavDirStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a segment named `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let stem: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = if stem.is_empty() { "segment".to_string() } else { stem };
        self.dir.join(stem).with_extension("wav")
    }
}

impl SegmentStore for WavDirStore {
    fn persist(&mut self, segment: &Segment) -> Result<(), StoreError> {
        let path = self.path_for(&segment.name);
        let mut w = BufWriter::new(File::create(&path)?);
        write_wav(&mut w, &segment.samples, segment.channels, segment.sample_rate)?;
        w.flush()?;
        tracing::debug!(path = %path.display(), frames = segment.frames(), "wrote segment");
        Ok(())
    }
}
