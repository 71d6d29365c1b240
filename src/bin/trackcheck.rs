use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackcheck_rs::integration::{FfmpegTranscoder, NoTranscode, OverlayRenderer, Session};
use trackcheck_rs::{RemapRequest, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "trackcheck", about = "Assess and correct multi-object tracking results")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print aggregate metrics and the tracks that need review
    Assess {
        #[command(flatten)]
        common: CommonArgs,
        /// Minimum track length in frames
        #[arg(long)]
        min_duration: Option<usize>,
        /// Maximum number of gaps before a track counts as fragmented
        #[arg(long)]
        max_gaps: Option<usize>,
        /// Minimum average confidence of a track
        #[arg(long)]
        min_track_confidence: Option<f64>,
    },
    /// Print the first and last frame of every track
    Edges {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Merge track ids and persist the corrected table
    Remap {
        #[command(flatten)]
        common: CommonArgs,
        /// Source video; when given the corrected tracks are rendered
        #[arg(long, value_name = "PATH")]
        video: Option<PathBuf>,
        /// `old:new` pair, applied in the order given
        #[arg(long = "map", value_name = "OLD:NEW", required = true)]
        maps: Vec<RemapRequest>,
        /// Convert the rendered artifact to MP4 with ffmpeg
        #[arg(long)]
        transcode: bool,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Detection table (CSV)
    #[arg(long, value_name = "PATH")]
    table: PathBuf,
    /// JSON session config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Detections at or below this confidence are ignored
    #[arg(long)]
    min_confidence: Option<f64>,
    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

impl CommonArgs {
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SessionConfig::default(),
        };
        if let Some(min_confidence) = self.min_confidence {
            config.reconstruct.min_confidence = min_confidence;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trackcheck_rs=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Assess {
            common,
            min_duration,
            max_gaps,
            min_track_confidence,
        } => {
            let mut config = common.session_config()?;
            if let Some(min_duration) = min_duration {
                config.thresholds.min_duration = min_duration;
            }
            if let Some(max_gaps) = max_gaps {
                config.thresholds.max_gaps = max_gaps;
            }
            if let Some(min_confidence) = min_track_confidence {
                config.thresholds.min_confidence = min_confidence;
            }

            let session = open(&common, None, config)?;
            let assessment = session.assess().context("Assessment failed")?;

            if common.json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
                return Ok(());
            }

            println!("{}", assessment.metrics);
            if assessment.flagged.is_empty() {
                println!("No problematic tracks");
            } else {
                println!("Problematic tracks:");
                for (track_id, reasons) in &assessment.reasons {
                    let reasons: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                    println!("  {:>6}  {}", track_id, reasons.join(", "));
                }
            }
        }
        Command::Edges { common } => {
            let session = open(&common, None, common.session_config()?)?;
            let Some((starts, ends)) = session.edge_frames() else {
                bail!("No tracks in {}", common.table.display());
            };

            if common.json {
                let edges = serde_json::json!({ "start_frames": starts, "end_frames": ends });
                println!("{}", serde_json::to_string_pretty(&edges)?);
            } else {
                println!("start_frames: {:?}", starts);
                println!("end_frames:   {:?}", ends);
            }
        }
        Command::Remap {
            common,
            video,
            maps,
            transcode,
        } => {
            let mut session = open(&common, video.clone(), common.session_config()?)?;

            let update = match (&video, transcode) {
                (None, true) => bail!("--transcode needs --video"),
                (None, false) => session.commit_remaps(&maps)?,
                (Some(_), true) => {
                    session.apply_remaps(&maps, &mut OverlayRenderer, &mut FfmpegTranscoder::new())?
                }
                (Some(_), false) => {
                    session.apply_remaps(&maps, &mut OverlayRenderer, &mut NoTranscode)?
                }
            };

            for request in update.reports.iter().filter(|r| r.is_noop()) {
                info!(request = %request.request, "Track id not present, nothing remapped");
            }

            if common.json {
                let summary = serde_json::json!({
                    "revision": session.revision(),
                    "reports": update.reports,
                    "artifact": update.artifact,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for report in &update.reports {
                    println!("{:>10}  {} rows", report.request.to_string(), report.rows_changed);
                }
                if let Some(artifact) = &update.artifact {
                    println!("Rendered {}", artifact.display());
                }
            }
        }
    }

    Ok(())
}

fn open(common: &CommonArgs, video: Option<PathBuf>, config: SessionConfig) -> Result<Session> {
    Session::open(&common.table, video, config)
        .with_context(|| format!("Failed to open {}", common.table.display()))
}
