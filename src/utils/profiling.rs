use std::time::{Duration, Instant};

use log::{info, log_enabled, trace, Level};

use crate::gpu::Kernel;

/// Per-kernel timing for the most recent tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfiler {
    pub velocity_time: Duration,
    pub force_time: Duration,
    pub collision_time: Duration,
    pub integration_time: Duration,
    pub total_tick_time: Duration,

    pub node_count: usize,
    pub collider_count: usize,
    pub sub_steps: u32,
}

impl StepProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn kernel_time(&self, kernel: Kernel) -> Duration {
        match kernel {
            Kernel::Velocity => self.velocity_time,
            Kernel::Force => self.force_time,
            Kernel::Collision => self.collision_time,
            Kernel::Integration => self.integration_time,
        }
    }

    pub fn kernel_time_mut(&mut self, kernel: Kernel) -> &mut Duration {
        match kernel {
            Kernel::Velocity => &mut self.velocity_time,
            Kernel::Force => &mut self.force_time,
            Kernel::Collision => &mut self.collision_time,
            Kernel::Integration => &mut self.integration_time,
        }
    }

    pub fn report(&self) {
        let total_us = self.total_tick_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        info!(
            "--- Hair Profile --- nodes: {}, colliders: {}, sub-steps: {}, tick: {:.2} ms",
            self.node_count,
            self.collider_count,
            self.sub_steps,
            self.total_tick_time.as_secs_f32() * 1000.0
        );
        for kernel in Kernel::ORDER {
            let time = self.kernel_time(kernel);
            info!(
                "  {:<20} {:.2} ms ({:.1}%)",
                kernel.label(),
                time.as_secs_f32() * 1000.0,
                (time.as_micros() as f32 / total_us) * 100.0
            );
        }
    }
}

/// Adds the elapsed time of a scope into `output` when dropped, tracing the
/// start and end under `label`.
pub struct ScopedTimer<'a> {
    label: &'static str,
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'static str, output: &'a mut Duration) -> Self {
        if log_enabled!(Level::Trace) {
            trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            output,
        }
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        *self.output += elapsed;
        if log_enabled!(Level::Trace) {
            trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}
