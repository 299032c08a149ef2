use crate::gpu::{ComputeBackend, DispatchGrid, DispatchLog, Execution};

/// Backend that runs every kernel on the calling thread.
#[derive(Debug)]
pub struct CpuBackend {
    group_width: usize,
    log: DispatchLog,
}

impl CpuBackend {
    pub fn new(group_width: usize) -> Self {
        Self {
            group_width: group_width.max(1),
            log: DispatchLog::new(),
        }
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu-sequential"
    }

    fn group_width(&self) -> usize {
        self.group_width
    }

    fn execution(&self, _grid: DispatchGrid) -> Execution {
        Execution::Sequential
    }

    fn dispatch_log(&self) -> &DispatchLog {
        &self.log
    }
}

/// Backend that spreads each dispatch over the global rayon pool, one work
/// group of `group_width` nodes per task at minimum.
#[cfg(feature = "parallel")]
#[derive(Debug)]
pub struct RayonBackend {
    group_width: usize,
    log: DispatchLog,
}

#[cfg(feature = "parallel")]
impl RayonBackend {
    pub fn new(group_width: usize) -> Self {
        Self {
            group_width: group_width.max(1),
            log: DispatchLog::new(),
        }
    }
}

#[cfg(feature = "parallel")]
impl ComputeBackend for RayonBackend {
    fn name(&self) -> &str {
        "cpu-rayon"
    }

    fn group_width(&self) -> usize {
        self.group_width
    }

    fn execution(&self, grid: DispatchGrid) -> Execution {
        Execution::Parallel {
            min_len: grid.group_width,
        }
    }

    fn dispatch_log(&self) -> &DispatchLog {
        &self.log
    }
}
