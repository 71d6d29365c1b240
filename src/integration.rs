//! Integration with the outside world: source videos, renderers and transcoders.
//!
//! The core crate never touches pixels. A [`Session`] hands dense frames to a
//! [`FrameRenderer`] and the result to a [`Transcoder`], so any video backend
//! can be plugged in by implementing those two traits.

mod config;
mod renderer;
mod session;
mod transcoder;

pub use config::SessionConfig;
pub use renderer::{
    Annotation, BOX_COLOR, BOX_THICKNESS, FrameRenderer, LABEL_OFFSET, OverlayRenderer, annotate,
    label,
};
pub use session::{Session, SessionUpdate};
pub use transcoder::{FfmpegTranscoder, NoTranscode, Transcoder};
