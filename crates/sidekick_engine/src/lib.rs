//! Sidekick engine: host channel IO, chat backend, media conversion and stat sampling.
mod channel;
mod chat;
mod convert;
mod stats;

pub use channel::{
    local_clock, ChannelReplySink, ChannelStats, Clock, CommandChannel, ReplySink, WriterSink,
};
pub use chat::{
    answer, ChatBackend, ChatError, ChatSettings, ModelRegistry, ModelSpec, OpenRouterClient,
};
pub use convert::{
    plan_conversion, ConversionEvent, ConversionMode, ConversionPlan, ConvertError,
    ConverterHandle, ConverterSettings, FfmpegTranscoder, Transcoder,
};
pub use stats::{StatSampler, SysinfoSampler};
