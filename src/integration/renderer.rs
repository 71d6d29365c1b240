//! Trait for video renderers that draw detections onto source frames.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::table::{BoundingBox, Detection, Frame};

/// Box and label color (RGB).
pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
/// Box outline thickness in pixels.
pub const BOX_THICKNESS: u32 = 2;
/// Vertical offset of the label baseline above the box.
pub const LABEL_OFFSET: f64 = 10.0;

/// Label drawn next to a detection box.
pub fn label(det: &Detection) -> String {
    format!(
        "ID: {}, Class: {}, Conf: {:.2}",
        det.track_id, det.class_id, det.confidence
    )
}

/// One box to draw on a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub track_id: i64,
    pub bbox: BoundingBox,
    pub label: String,
    /// Where the label text starts: `(x1, y1 - LABEL_OFFSET)`
    pub label_origin: (f64, f64),
    pub color: [u8; 3],
    pub thickness: u32,
}

/// Draw list for one frame, in detection order.
pub fn annotate(frame: &Frame) -> Vec<Annotation> {
    frame
        .iter()
        .map(|det| Annotation {
            track_id: det.track_id,
            bbox: det.bbox,
            label: label(det),
            label_origin: (det.bbox.x1, det.bbox.y1 - LABEL_OFFSET),
            color: BOX_COLOR,
            thickness: BOX_THICKNESS,
        })
        .collect()
}

/// Trait for renderers that produce an annotated video artifact.
///
/// Implement this trait to plug a video backend into a [`crate::Session`].
///
/// # Example
///
/// ```ignore
/// use trackcheck_rs::integration::{FrameRenderer, annotate};
///
/// struct MyRenderer;
///
/// impl FrameRenderer for MyRenderer {
///     type Error = std::io::Error;
///
///     fn render(&mut self, video: &Path, frames: &[Frame], output: &Path) -> Result<(), Self::Error> {
///         // Decode `video`, draw `annotate(&frames[i])` on frame i, encode to `output`
///         Ok(())
///     }
/// }
/// ```
pub trait FrameRenderer {
    /// Error type for rendering failures.
    type Error;

    /// File extension of the artifacts this renderer writes.
    fn extension(&self) -> &str {
        "avi"
    }

    /// Render `frames` over `video` into a new artifact at `output`.
    ///
    /// # Arguments
    /// * `video` - Source video; frame `i` of the video pairs with `frames[i]`
    /// * `frames` - Dense per-frame detections
    /// * `output` - Path of the artifact to create
    fn render(&mut self, video: &Path, frames: &[Frame], output: &Path) -> Result<(), Self::Error>;
}

#[derive(Serialize)]
struct Overlay<'a> {
    video: &'a Path,
    frames: Vec<OverlayFrame>,
}

#[derive(Serialize)]
struct OverlayFrame {
    index: usize,
    annotations: Vec<Annotation>,
}

/// Writes the draw lists as a JSON overlay instead of burning them into
/// pixels, for players that draw annotations client-side.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayRenderer;

impl FrameRenderer for OverlayRenderer {
    type Error = crate::Error;

    fn extension(&self) -> &str {
        "json"
    }

    fn render(&mut self, video: &Path, frames: &[Frame], output: &Path) -> crate::Result<()> {
        let overlay = Overlay {
            video,
            frames: frames
                .iter()
                .map(|frame| OverlayFrame {
                    index: frame.index,
                    annotations: annotate(frame),
                })
                .collect(),
        };

        let writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer_pretty(writer, &overlay)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        let det = Detection::new(0, 7, 2, 0.876, BoundingBox::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(label(&det), "ID: 7, Class: 2, Conf: 0.88");
    }

    #[test]
    fn test_annotate() {
        let mut frame = Frame::new(3);
        frame.detections.push(Detection::new(
            3,
            -1,
            0,
            0.5,
            BoundingBox::new(10.0, 20.0, 30.0, 40.0),
        ));
        let annotations = annotate(&frame);

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].label, "ID: -1, Class: 0, Conf: 0.50");
        assert_eq!(annotations[0].label_origin, (10.0, 10.0));
        assert_eq!(annotations[0].color, BOX_COLOR);
    }

    #[test]
    fn test_overlay_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("overlay.json");
        let mut frame = Frame::new(0);
        frame.detections.push(Detection::new(
            0,
            4,
            1,
            0.9,
            BoundingBox::new(0.0, 0.0, 5.0, 5.0),
        ));

        OverlayRenderer
            .render(Path::new("clip.mp4"), &[frame, Frame::new(1)], &output)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_reader(File::open(&output).unwrap()).unwrap();
        assert_eq!(json["video"], "clip.mp4");
        assert_eq!(json["frames"].as_array().unwrap().len(), 2);
        assert_eq!(json["frames"][0]["annotations"][0]["track_id"], 4);
        assert!(json["frames"][1]["annotations"].as_array().unwrap().is_empty());
    }
}
