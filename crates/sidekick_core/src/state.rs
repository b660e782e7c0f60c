use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::view_model::AppViewModel;

/// One sample of the three gauges, each in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu: f32,
    pub memory: f32,
    pub disk: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    stats: SystemStats,
    active_conversion: Option<PathBuf>,
    queued_conversions: VecDeque<PathBuf>,
    conversion_status: Option<String>,
    channel_open: bool,
    replies_sent: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            stats: SystemStats::default(),
            active_conversion: None,
            queued_conversions: VecDeque::new(),
            conversion_status: None,
            channel_open: true,
            replies_sent: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            cpu_percent: self.stats.cpu,
            memory_percent: self.stats.memory,
            disk_percent: self.stats.disk,
            conversion_status: self.conversion_status.clone(),
            active_conversion: self.active_conversion.clone(),
            queued_conversions: self.queued_conversions.len(),
            channel_open: self.channel_open,
            replies_sent: self.replies_sent,
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_converting(&self) -> bool {
        self.active_conversion.is_some()
    }

    pub fn channel_open(&self) -> bool {
        self.channel_open
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_stats(&mut self, stats: SystemStats) {
        if self.stats != stats {
            self.stats = stats;
            self.mark_dirty();
        }
    }

    /// Start `path` now if the worker is idle, otherwise queue it.
    /// Returns the path to start, if any.
    pub(crate) fn admit_conversion(&mut self, path: PathBuf) -> Option<PathBuf> {
        self.mark_dirty();
        if self.active_conversion.is_some() {
            self.queued_conversions.push_back(path);
            None
        } else {
            self.active_conversion = Some(path.clone());
            Some(path)
        }
    }

    /// Clear the active conversion and promote the next queued one.
    pub(crate) fn finish_conversion(&mut self, path: &Path) -> Option<PathBuf> {
        if self.active_conversion.as_deref() != Some(path) {
            return None;
        }
        self.mark_dirty();
        self.active_conversion = self.queued_conversions.pop_front();
        self.active_conversion.clone()
    }

    pub(crate) fn set_conversion_status(&mut self, status: String) {
        self.conversion_status = Some(status);
        self.mark_dirty();
    }

    pub(crate) fn close_channel(&mut self) {
        self.channel_open = false;
        self.mark_dirty();
    }

    pub(crate) fn record_reply(&mut self) {
        self.replies_sent += 1;
    }
}
