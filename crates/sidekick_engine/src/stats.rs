use std::path::Path;

use sidekick_core::SystemStats;
use sysinfo::{Disks, System};

/// Opaque source of the three gauge readings.
pub trait StatSampler: Send {
    fn sample(&mut self) -> SystemStats;
}

/// Samples CPU, memory and the root disk through `sysinfo`.
pub struct SysinfoSampler {
    system: System,
    disks: Disks,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is a delta; prime it so the first real sample is meaningful.
        system.refresh_cpu();
        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
        }
    }

    fn disk_percent(&self) -> f32 {
        let disks = self.disks.list();
        let disk = disks
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .or_else(|| disks.first());
        match disk {
            Some(disk) => percent(
                disk.total_space().saturating_sub(disk.available_space()),
                disk.total_space(),
            ),
            None => 0.0,
        }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl StatSampler for SysinfoSampler {
    fn sample(&mut self) -> SystemStats {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.disks.refresh();
        SystemStats {
            cpu: self.system.global_cpu_info().cpu_usage().clamp(0.0, 100.0),
            memory: percent(self.system.used_memory(), self.system.total_memory()),
            disk: self.disk_percent(),
        }
    }
}

pub(crate) fn percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    ((used as f64 / total as f64) * 100.0).clamp(0.0, 100.0) as f32
}
