use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use serde::{Deserialize, Serialize};
use sidekick_logging::{sidekick_info, sidekick_warn};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionMode {
    /// Drop the video stream and write audio only.
    ExtractAudio,
    /// Re-encode into a video container with the given codec.
    EncodeVideo { codec: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: ConversionMode,
}

/// `clip.mp4` becomes `clip_converted.mp3`; anything else becomes
/// `<stem>_converted.mp4` encoded with libx264.
pub fn plan_conversion(input: &Path) -> ConversionPlan {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let is_mp4 = input.extension().is_some_and(|ext| ext == "mp4");
    let (extension, mode) = if is_mp4 {
        ("mp3", ConversionMode::ExtractAudio)
    } else {
        (
            "mp4",
            ConversionMode::EncodeVideo {
                codec: "libx264".to_string(),
            },
        )
    };
    ConversionPlan {
        input: input.to_path_buf(),
        output: input.with_file_name(format!("{stem}_converted.{extension}")),
        mode,
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file {0:?} does not exist")]
    MissingInput(PathBuf),
    #[error("could not start transcoder: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("transcoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("conversion worker has stopped")]
    WorkerStopped,
}

/// Opaque media transcoding collaborator.
pub trait Transcoder: Send {
    fn transcode(&self, plan: &ConversionPlan) -> Result<(), ConvertError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    pub ffmpeg_path: PathBuf,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}

/// Runs the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(settings: &ConverterSettings) -> Self {
        Self {
            binary: settings.ffmpeg_path.clone(),
        }
    }

    fn arguments(plan: &ConversionPlan) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            plan.input.to_string_lossy().into_owned(),
        ];
        match &plan.mode {
            ConversionMode::ExtractAudio => args.push("-vn".to_string()),
            ConversionMode::EncodeVideo { codec } => {
                args.push("-c:v".to_string());
                args.push(codec.clone());
            }
        }
        args.push(plan.output.to_string_lossy().into_owned());
        args
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, plan: &ConversionPlan) -> Result<(), ConvertError> {
        if !plan.input.is_file() {
            return Err(ConvertError::MissingInput(plan.input.clone()));
        }
        let output = Command::new(&self.binary)
            .args(Self::arguments(plan))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
        Err(ConvertError::Failed {
            status: output.status.to_string(),
            stderr: tail.into_iter().rev().collect::<Vec<_>>().join(" | "),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    Progress {
        path: PathBuf,
        message: String,
    },
    Finished {
        path: PathBuf,
        /// Output file on success, display text on failure.
        result: Result<PathBuf, String>,
    },
}

enum ConverterCommand {
    Convert { path: PathBuf },
}

/// Handle to the conversion worker thread. Requests run one at a time, in order.
#[derive(Clone)]
pub struct ConverterHandle {
    cmd_tx: mpsc::Sender<ConverterCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<ConversionEvent>>>,
}

impl ConverterHandle {
    pub fn new(transcoder: Box<dyn Transcoder>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ConverterCommand::Convert { path } => {
                        run_conversion(transcoder.as_ref(), path, &event_tx);
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Fails only when the worker thread is gone.
    pub fn convert(&self, path: impl Into<PathBuf>) -> Result<(), ConvertError> {
        self.cmd_tx
            .send(ConverterCommand::Convert { path: path.into() })
            .map_err(|_| ConvertError::WorkerStopped)
    }

    /// Blocks until the next event; `None` once the worker is gone.
    pub fn recv(&self) -> Option<ConversionEvent> {
        self.event_rx.lock().ok()?.recv().ok()
    }
}

fn run_conversion(
    transcoder: &dyn Transcoder,
    path: PathBuf,
    event_tx: &mpsc::Sender<ConversionEvent>,
) {
    let progress = |message: &str| {
        let _ = event_tx.send(ConversionEvent::Progress {
            path: path.clone(),
            message: message.to_string(),
        });
    };

    progress("Starting conversion...");
    let plan = plan_conversion(&path);
    match plan.mode {
        ConversionMode::ExtractAudio => progress("MP4 -> MP3: extracting audio..."),
        ConversionMode::EncodeVideo { .. } => progress("Converting to video format..."),
    }

    let result = match transcoder.transcode(&plan) {
        Ok(()) => {
            let name = plan
                .output
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress(&format!("Done: {name}"));
            sidekick_info!("converted {:?} -> {:?}", plan.input, plan.output);
            Ok(plan.output)
        }
        Err(err) => {
            let message = format!("Error: {err}");
            progress(&message);
            sidekick_warn!("conversion of {:?} failed: {}", plan.input, err);
            Err(message)
        }
    };
    let _ = event_tx.send(ConversionEvent::Finished { path, result });
}
