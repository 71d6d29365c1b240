//! Conversion of rendered artifacts to a delivery format.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

/// Trait for converting a rendered artifact into its delivery format.
pub trait Transcoder {
    /// Error type for transcoding failures.
    type Error;

    /// Convert `input` and return the path of the delivered artifact.
    fn transcode(&mut self, input: &Path) -> Result<PathBuf, Self::Error>;
}

/// Delivers the rendered artifact as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranscode;

impl Transcoder for NoTranscode {
    type Error = std::convert::Infallible;

    fn transcode(&mut self, input: &Path) -> Result<PathBuf, Self::Error> {
        Ok(input.to_path_buf())
    }
}

/// H.264/AAC MP4 conversion through the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    preset: String,
    crf: u8,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            preset: "fast".to_string(),
            crf: 23,
        }
    }
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `ffmpeg` binary instead of the one on `PATH`.
    pub fn with_program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let crf = self.crf.to_string();
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-c:v", "libx264", "-preset", self.preset.as_str()])
            .args(["-crf", crf.as_str()])
            .args(["-c:a", "aac"])
            .arg(output);
        cmd
    }
}

impl Transcoder for FfmpegTranscoder {
    type Error = io::Error;

    fn transcode(&mut self, input: &Path) -> io::Result<PathBuf> {
        let output = input.with_extension("mp4");
        if output == input {
            return Err(io::Error::other(format!(
                "input is already an mp4: {}",
                input.display()
            )));
        }

        let status = self.command(input, &output).status()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "ffmpeg exited with {} while converting {}",
                status,
                input.display()
            )));
        }
        if !output.exists() {
            return Err(io::Error::other(format!(
                "transcoded video not found: {}",
                output.display()
            )));
        }

        info!(input = %input.display(), output = %output.display(), "Converted to MP4");
        Ok(output)
    }
}
