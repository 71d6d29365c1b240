//! Detection table I/O.
//!
//! The detection table is the only persisted state: one row per detection,
//! in whatever order the upstream tracker wrote them. Everything else in the
//! crate is derived from a [`DetectionTable`] snapshot.

mod bbox;
mod detection;
mod reader;
mod writer;

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use bbox::BoundingBox;
pub use detection::{Detection, Frame, MAX_FRAME_INDEX, UNTRACKED};

use crate::{Error, Result};

/// Flat, row-ordered detection table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionTable {
    rows: Vec<Detection>,
}

impl DetectionTable {
    pub fn new(rows: Vec<Detection>) -> Self {
        Self { rows }
    }

    /// Parse a table from any reader. Columns are located by header name.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(Self::new(reader::read_rows(reader)?))
    }

    /// Load a table from disk.
    ///
    /// Fails with [`Error::UpstreamUnavailable`] when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::UpstreamUnavailable(format!(
                "detection table not found: {}",
                path.display()
            )));
        }

        let table = Self::from_reader(File::open(path)?)?;
        info!(path = %path.display(), rows = table.len(), "Detection table loaded");
        Ok(table)
    }

    /// Flatten frames into one row per detection, frame by frame.
    pub fn from_frames(frames: &[Frame]) -> Self {
        let rows = frames
            .iter()
            .flat_map(|frame| {
                frame.detections.iter().map(move |det| Detection {
                    frame_index: frame.index,
                    ..*det
                })
            })
            .collect();
        Self { rows }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        writer::write_rows(&self.rows, writer)
    }

    /// Write the table to `path`.
    ///
    /// The rows go to a sibling temporary file which is then renamed over
    /// `path`, so readers never observe a half-written table.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = sibling_tmp_path(path);

        let file = File::create(&tmp_path)?;
        self.write_to(&file)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        info!(path = %path.display(), rows = self.len(), "Detection table saved");
        Ok(())
    }

    /// Group rows into dense frames `0..=max_frame_index`.
    ///
    /// Frame indices with no rows become empty frames. Detections inside a
    /// frame keep their table order.
    pub fn to_frames(&self) -> Vec<Frame> {
        let Some(max_frame) = self.rows.iter().map(|det| det.frame_index).max() else {
            return Vec::new();
        };

        let mut frames: Vec<Frame> = (0..=max_frame).map(Frame::new).collect();
        for det in &self.rows {
            frames[det.frame_index].detections.push(*det);
        }

        debug!(frames = frames.len(), rows = self.len(), "Grouped table into frames");
        frames
    }

    pub fn rows(&self) -> &[Detection] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Detection] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains_track(&self, track_id: i64) -> bool {
        self.rows.iter().any(|det| det.track_id == track_id)
    }
}

/// Load a table from disk and return its dense frame sequence.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Frame>> {
    Ok(DetectionTable::load(path)?.to_frames())
}

/// Flatten frames into a table and write it to disk.
pub fn save<P: AsRef<Path>>(frames: &[Frame], path: P) -> Result<()> {
    DetectionTable::from_frames(frames).save(path)
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
