//! Session: one detection table, its source video and the current revision.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::assessment::{self, Assessment, Reconstruction};
use crate::remap::{RemapReport, RemapRequest, apply_batch};
use crate::table::{DetectionTable, Frame};
use crate::{Error, Result};

use super::{FrameRenderer, SessionConfig, Transcoder};

/// What a remap batch did to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub reports: Vec<RemapReport>,
    /// Rendered artifact of the new revision, if one was produced
    pub artifact: Option<PathBuf>,
}

impl SessionUpdate {
    pub fn changed(&self) -> bool {
        self.reports.iter().any(|report| !report.is_noop())
    }
}

/// Owns a detection table for the lifetime of an operator review.
///
/// Every derived view (frames, reconstruction, assessment) is rebuilt from
/// the current table on request. Remap batches take `&mut self`, so at most
/// one batch is in flight per session.
///
/// # Example
///
/// ```ignore
/// use trackcheck_rs::integration::{NoTranscode, OverlayRenderer, Session};
///
/// let mut session = Session::open("tracks.csv", Some("clip.mp4"), Default::default())?;
/// println!("{}", session.assess()?.metrics);
///
/// let update = session.apply_remaps(
///     &["9:7".parse()?],
///     &mut OverlayRenderer,
///     &mut NoTranscode,
/// )?;
/// ```
#[derive(Debug)]
pub struct Session {
    table_path: PathBuf,
    video_path: Option<PathBuf>,
    table: DetectionTable,
    config: SessionConfig,
    revision: u32,
}

impl Session {
    /// Open a session over the table at `table_path`.
    ///
    /// When a video is given it must exist; nothing is loaded otherwise.
    pub fn open<P, V>(table_path: P, video_path: Option<V>, config: SessionConfig) -> Result<Self>
    where
        P: Into<PathBuf>,
        V: Into<PathBuf>,
    {
        let table_path = table_path.into();
        let video_path = video_path.map(Into::into);
        if let Some(video) = &video_path {
            ensure_video(video)?;
        }

        let table = DetectionTable::load(&table_path)?;
        Ok(Self {
            table_path,
            video_path,
            table,
            config,
            revision: 0,
        })
    }

    pub fn table(&self) -> &DetectionTable {
        &self.table
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of remap batches that changed the table so far.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.table.to_frames()
    }

    pub fn reconstruction(&self) -> Reconstruction {
        assessment::reconstruct(&self.frames(), &self.config.reconstruct)
    }

    /// Summaries, aggregate metrics and flagged tracks of the current table.
    pub fn assess(&self) -> Result<Assessment> {
        assessment::assess(
            &self.frames(),
            &self.config.reconstruct,
            &self.config.thresholds,
        )
    }

    pub fn edge_frames(&self) -> Option<(Vec<usize>, Vec<usize>)> {
        assessment::edge_frames(&assessment::summarize(&self.reconstruction()))
    }

    /// Render the current revision and return the delivered artifact.
    pub fn render<R, T>(&self, renderer: &mut R, transcoder: &mut T) -> Result<PathBuf>
    where
        R: FrameRenderer,
        R::Error: std::error::Error + Send + Sync + 'static,
        T: Transcoder,
        T::Error: std::error::Error + Send + Sync + 'static,
    {
        let video = self.require_video()?;
        self.render_frames(video, &self.frames(), self.revision, renderer, transcoder)
    }

    /// Apply a remap batch, re-render and persist.
    ///
    /// The video is checked before anything else. A batch that changes no
    /// rows produces no artifact and leaves the table file alone. If
    /// rendering or saving fails the session keeps its previous table.
    pub fn apply_remaps<R, T>(
        &mut self,
        requests: &[RemapRequest],
        renderer: &mut R,
        transcoder: &mut T,
    ) -> Result<SessionUpdate>
    where
        R: FrameRenderer,
        R::Error: std::error::Error + Send + Sync + 'static,
        T: Transcoder,
        T::Error: std::error::Error + Send + Sync + 'static,
    {
        let video = self.require_video()?.to_path_buf();

        let outcome = apply_batch(&self.table, requests);
        if !outcome.changed() {
            info!(requests = requests.len(), "Remap batch changed nothing");
            return Ok(SessionUpdate {
                reports: outcome.reports,
                artifact: None,
            });
        }

        let revision = self.revision + 1;
        let artifact = self.render_frames(
            &video,
            &outcome.table.to_frames(),
            revision,
            renderer,
            transcoder,
        )?;
        outcome.table.save(&self.table_path)?;

        self.table = outcome.table;
        self.revision = revision;
        info!(revision, artifact = %artifact.display(), "Session updated");

        Ok(SessionUpdate {
            reports: outcome.reports,
            artifact: Some(artifact),
        })
    }

    /// Apply a remap batch and persist it without rendering.
    pub fn commit_remaps(&mut self, requests: &[RemapRequest]) -> Result<SessionUpdate> {
        let outcome = apply_batch(&self.table, requests);
        if outcome.changed() {
            outcome.table.save(&self.table_path)?;
            self.table = outcome.table;
            self.revision += 1;
            info!(revision = self.revision, "Session updated");
        }

        Ok(SessionUpdate {
            reports: outcome.reports,
            artifact: None,
        })
    }

    fn require_video(&self) -> Result<&Path> {
        let video = self.video_path.as_deref().ok_or_else(|| {
            Error::UpstreamUnavailable("session has no source video".to_string())
        })?;
        ensure_video(video)?;
        Ok(video)
    }

    fn artifact_path(&self, video: &Path, revision: u32, extension: &str) -> PathBuf {
        let dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => video
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        dir.join(format!("{}_processed_r{}.{}", stem, revision, extension))
    }

    fn render_frames<R, T>(
        &self,
        video: &Path,
        frames: &[Frame],
        revision: u32,
        renderer: &mut R,
        transcoder: &mut T,
    ) -> Result<PathBuf>
    where
        R: FrameRenderer,
        R::Error: std::error::Error + Send + Sync + 'static,
        T: Transcoder,
        T::Error: std::error::Error + Send + Sync + 'static,
    {
        let output = self.artifact_path(video, revision, renderer.extension());
        if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        renderer
            .render(video, frames, &output)
            .map_err(|e| Error::Render(Box::new(e)))?;
        transcoder
            .transcode(&output)
            .map_err(|e| Error::Render(Box::new(e)))
    }
}

fn ensure_video(video: &Path) -> Result<()> {
    if video.exists() {
        return Ok(());
    }
    warn!(video = %video.display(), "Source video missing");
    Err(Error::UpstreamUnavailable(format!(
        "video not found: {}",
        video.display()
    )))
}
