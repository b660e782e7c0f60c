use std::path::PathBuf;

use crate::{Reply, SystemStats};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Periodic stat sample (CPU, memory, disk).
    StatsSampled(SystemStats),
    /// A media file was handed over for conversion.
    FileDropped(PathBuf),
    /// Free-text progress from the conversion worker.
    ConversionProgress(String),
    /// The conversion worker is done with `path`, successfully or not.
    ConversionFinished { path: PathBuf, succeeded: bool },
    /// User asked to fire the embedded-script bridge.
    LuaBridgeFired,
    /// The command channel produced a reply for the host.
    ChannelReply(Reply),
    /// The command channel reached end-of-stream.
    ChannelClosed,
}

impl From<Reply> for Msg {
    fn from(reply: Reply) -> Self {
        Msg::ChannelReply(reply)
    }
}
