#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub stage_time: Duration,
    pub total_time: Duration,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    stage_start: Instant,
    peak_memory_mb: u64,
}

/// Per-stage wall time and resident memory of the running process.
#[cfg(feature = "cli")]
pub struct RunMonitor {
    state: Option<Mutex<MonitorState>>,
    pid: Option<Pid>,
    run_start: Instant,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };
        if enabled && pid.is_none() {
            tracing::warn!("Could not determine own PID, monitoring disabled");
        }

        let state = pid.map(|_| {
            Mutex::new(MonitorState {
                system: System::new(),
                stage_start: Instant::now(),
                peak_memory_mb: 0,
            })
        });

        Self {
            state,
            pid,
            run_start: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    pub fn start_stage(&self, stage: &str) {
        if let Some(state) = &self.state {
            if let Ok(mut state) = state.lock() {
                state.stage_start = Instant::now();
                tracing::debug!("⏱️ Stage '{}' started", stage);
            }
        }
    }

    pub fn finish_stage(&self, stage: &str) -> Option<StageStats> {
        let pid = self.pid?;
        let mut state = self.state.as_ref()?.lock().ok()?;

        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let memory_mb = state.system.process(pid)?.memory() / 1024 / 1024;
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        let stats = StageStats {
            stage: stage.to_string(),
            stage_time: state.stage_start.elapsed(),
            total_time: self.run_start.elapsed(),
            memory_mb,
            peak_memory_mb: state.peak_memory_mb,
        };

        tracing::info!(
            "📊 {} - Time: {:?}, Memory: {}MB, Peak: {}MB",
            stats.stage,
            stats.stage_time,
            stats.memory_mb,
            stats.peak_memory_mb
        );
        Some(stats)
    }

    pub fn log_final_stats(&self) {
        if let Some(state) = &self.state {
            if let Ok(state) = state.lock() {
                tracing::info!(
                    "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                    self.run_start.elapsed(),
                    state.peak_memory_mb
                );
            }
        }
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Without the cli feature there is no sysinfo; keep the same surface as a no-op.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn start_stage(&self, _stage: &str) {}

    pub fn finish_stage(&self, _stage: &str) -> Option<()> {
        None
    }

    pub fn log_final_stats(&self) {}
}
