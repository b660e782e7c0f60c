//! Line-delimited command channel between the sidekick and its host.

use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc, Mutex};

use chrono::{Local, NaiveDateTime};
use sidekick_core::{
    ask_command, parse_line, suggest, Inbound, OmniboxSettings, Reply, SuggestionEnvelope,
};
use sidekick_logging::{sidekick_debug, sidekick_error, sidekick_info};

use crate::chat::{answer, ChatBackend};

/// Where channel replies go.
pub trait ReplySink: Send + Sync {
    /// Deliver one reply. An error means the host side is gone.
    fn emit(&self, reply: Reply) -> io::Result<()>;
}

/// Writes each reply as one line and flushes immediately.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ReplySink for WriterSink<W> {
    fn emit(&self, reply: Reply) -> io::Result<()> {
        let line = reply
            .to_line()
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("reply writer poisoned"))?;
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// Forwards replies to another thread, typically the main loop that owns stdout.
pub struct ChannelReplySink<T> {
    tx: mpsc::Sender<T>,
}

impl<T> ChannelReplySink<T> {
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }
}

impl<T: From<Reply> + Send> ReplySink for ChannelReplySink<T> {
    fn emit(&self, reply: Reply) -> io::Result<()> {
        self.tx
            .send(T::from(reply))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "reply receiver dropped"))
    }
}

/// Counters reported when the input stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStats {
    pub lines_read: u64,
    pub replies: u64,
    pub discarded: u64,
}

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn local_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

/// Reads requests line by line and answers each before reading the next.
pub struct CommandChannel {
    settings: OmniboxSettings,
    chat: Arc<dyn ChatBackend>,
    clock: Clock,
    runtime: tokio::runtime::Runtime,
}

impl CommandChannel {
    pub fn new(settings: OmniboxSettings, chat: Arc<dyn ChatBackend>) -> io::Result<Self> {
        Self::with_clock(settings, chat, local_clock())
    }

    pub fn with_clock(
        settings: OmniboxSettings,
        chat: Arc<dyn ChatBackend>,
        clock: Clock,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            settings,
            chat,
            clock,
            runtime,
        })
    }

    /// Run until end-of-stream. Returns early only if reading fails or the
    /// sink reports that the host is gone.
    pub fn run<R: BufRead>(
        &self,
        mut reader: R,
        sink: &dyn ReplySink,
    ) -> io::Result<ChannelStats> {
        let mut stats = ChannelStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            stats.lines_read += 1;
            // Invalid UTF-8 is just another malformed line.
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.handle_line(line) {
                Some(reply) => {
                    sink.emit(reply).inspect_err(|err| {
                        sidekick_error!("failed to deliver reply: {}", err);
                    })?;
                    stats.replies += 1;
                }
                None => stats.discarded += 1,
            }
        }
        sidekick_info!(
            "input closed: lines={} replies={} discarded={}",
            stats.lines_read,
            stats.replies,
            stats.discarded
        );
        Ok(stats)
    }

    /// The reply for one non-empty input line, if it warrants one.
    pub fn handle_line(&self, line: &str) -> Option<Reply> {
        let inbound = match parse_line(line) {
            Ok(inbound) => inbound,
            Err(err) => {
                sidekick_debug!("discarding input line: {}", err);
                return None;
            }
        };
        match inbound {
            Inbound::Omnibox(request) => {
                let suggestions = suggest(
                    &request.query,
                    &request.context,
                    &self.settings,
                    (self.clock)(),
                );
                Some(Reply::OmniboxResults(SuggestionEnvelope { suggestions }))
            }
            Inbound::Query(content) => {
                let question = ask_command(&content)?;
                sidekick_info!("forwarding question to {}", self.chat.model_name());
                let text = self.runtime.block_on(answer(self.chat.as_ref(), question));
                Some(Reply::AiResponse(text))
            }
            Inbound::Ignored => None,
        }
    }
}
