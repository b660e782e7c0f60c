use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub conversion_status: Option<String>,
    pub active_conversion: Option<PathBuf>,
    pub queued_conversions: usize,
    pub channel_open: bool,
    pub replies_sent: u64,
    pub dirty: bool,
}
