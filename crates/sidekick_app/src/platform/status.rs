use sidekick_core::AppViewModel;

/// One-line summary of the view, written to the log when state changes.
pub fn status_line(view: &AppViewModel) -> String {
    let mut line = format!(
        "CPU {:.0}% | RAM {:.0}% | DISK {:.0}%",
        view.cpu_percent, view.memory_percent, view.disk_percent
    );
    if let Some(path) = &view.active_conversion {
        let status = view.conversion_status.as_deref().unwrap_or("Converting");
        line.push_str(&format!(" | {} ({})", status, path.display()));
    } else if let Some(status) = &view.conversion_status {
        line.push_str(&format!(" | {status}"));
    }
    if view.queued_conversions > 0 {
        line.push_str(&format!(" | queued: {}", view.queued_conversions));
    }
    if !view.channel_open {
        line.push_str(" | input closed");
    }
    line
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn idle_view_shows_gauges_only() {
        let view = AppViewModel {
            cpu_percent: 12.4,
            memory_percent: 48.6,
            disk_percent: 71.0,
            channel_open: true,
            ..AppViewModel::default()
        };
        assert_eq!(status_line(&view), "CPU 12% | RAM 49% | DISK 71%");
    }

    #[test]
    fn busy_view_shows_conversion_and_queue() {
        let view = AppViewModel {
            conversion_status: Some("MP4 -> MP3: extracting audio...".to_string()),
            active_conversion: Some(PathBuf::from("clip.mp4")),
            queued_conversions: 2,
            channel_open: false,
            ..AppViewModel::default()
        };
        assert_eq!(
            status_line(&view),
            "CPU 0% | RAM 0% | DISK 0% | MP4 -> MP3: extracting audio... (clip.mp4) | queued: 2 | input closed"
        );
    }
}
