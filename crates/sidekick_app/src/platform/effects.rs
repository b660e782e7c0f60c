use std::io;
use std::sync::mpsc;
use std::thread;

use sidekick_core::{Effect, Msg};
use sidekick_engine::{ConversionEvent, ConverterHandle, ReplySink};
use sidekick_logging::{sidekick_debug, sidekick_info, sidekick_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Carries effects out of the pure update loop: conversions go to the worker,
/// replies go to the host.
pub struct EffectRunner {
    converter: ConverterHandle,
    host: Box<dyn ReplySink>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        converter: ConverterHandle,
        host: Box<dyn ReplySink>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let runner = Self {
            converter,
            host,
            msg_tx,
        };
        runner.spawn_event_loop(runner.msg_tx.clone());
        runner
    }

    /// A failed write means the host is gone; the caller should stop.
    pub fn enqueue(&self, effects: Vec<Effect>) -> io::Result<Flow> {
        for effect in effects {
            match effect {
                Effect::StartConversion { path } => {
                    sidekick_info!("StartConversion path={:?}", path);
                    if let Err(err) = self.converter.convert(path.clone()) {
                        // Report the file as done so the state machine can move on.
                        sidekick_warn!("Cannot convert {:?}: {}", path, err);
                        let _ = self.msg_tx.send(Msg::ConversionFinished {
                            path,
                            succeeded: false,
                        });
                    }
                }
                Effect::Emit(reply) => {
                    sidekick_debug!("Emit {:?}", reply);
                    self.host.emit(reply)?;
                }
                Effect::Shutdown => return Ok(Flow::Exit),
            }
        }
        Ok(Flow::Continue)
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let converter = self.converter.clone();
        thread::spawn(move || {
            while let Some(event) = converter.recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
        });
    }
}

fn map_event(event: ConversionEvent) -> Msg {
    match event {
        ConversionEvent::Progress { message, .. } => Msg::ConversionProgress(message),
        ConversionEvent::Finished { path, result } => {
            if let Err(message) = &result {
                sidekick_warn!("Conversion of {:?} failed: {}", path, message);
            }
            Msg::ConversionFinished {
                path,
                succeeded: result.is_ok(),
            }
        }
    }
}
