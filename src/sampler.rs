//! # Process memory sampling.
//!
//! [`Sampler`] is the seam between watchdogs and the host's process-information
//! facilities. [`ProcessSampler`] is the default implementation, backed by `sysinfo`.
//!
//! ## Rules
//! - `sample(pid)` returns resident bytes of `pid` **plus all of its descendants**.
//! - A descendant that exits between enumeration and sampling contributes zero.
//! - If the root process itself is gone, sampling fails with [`SampleError::ProcessGone`].
//! - Threads listed by the OS as tasks of a process are not counted as children.

use std::collections::{HashMap, HashSet};

use sysinfo::{Pid, ProcessRefreshKind, System};

use crate::error::SampleError;

/// Bytes per MB, as used by the memory watchdog.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of process liveness and resident-memory readings.
///
/// Each watchdog owns its sampler, so implementations may keep mutable caches.
/// Calls may block on the OS; watchdogs make them from tokio's blocking pool.
pub trait Sampler: Send + 'static {
    /// Returns `true` while the process exists.
    fn is_running(&mut self, pid: u32) -> bool;

    /// Returns the resident-set size in bytes of `pid` and all of its descendants.
    fn sample(&mut self, pid: u32) -> Result<u64, SampleError>;
}

/// `sysinfo`-backed [`Sampler`].
///
/// Every call inspects a fresh process table. `sysinfo` only records which entries
/// are threads of a process when that process first enters a table, so a cached
/// table would let threads added later pass for children.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSampler;

impl ProcessSampler {
    /// Creates a sampler.
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for ProcessSampler {
    fn is_running(&mut self, pid: u32) -> bool {
        System::new().refresh_process_specifics(Pid::from_u32(pid), ProcessRefreshKind::new())
    }

    fn sample(&mut self, pid: u32) -> Result<u64, SampleError> {
        let mut sys = System::new();
        sys.refresh_processes_specifics(ProcessRefreshKind::new().with_memory());

        let root = Pid::from_u32(pid);
        let processes = sys.processes();
        let Some(root_proc) = processes.get(&root) else {
            return Err(SampleError::ProcessGone { pid });
        };

        // parent -> children, skipping threads the OS reports as separate entries.
        let mut children: HashMap<Pid, Vec<Pid>> = HashMap::new();
        for (child, proc_) in processes {
            let Some(parent) = proc_.parent() else {
                continue;
            };
            let is_thread = processes
                .get(&parent)
                .and_then(|p| p.tasks())
                .is_some_and(|tasks| tasks.contains(child));
            if !is_thread {
                children.entry(parent).or_default().push(*child);
            }
        }

        let mut total = root_proc.memory();
        let mut seen: HashSet<Pid> = HashSet::from([root]);
        let mut stack: Vec<Pid> = children.get(&root).cloned().unwrap_or_default();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            // Vanished between enumeration and lookup: contributes nothing.
            if let Some(p) = processes.get(&next) {
                total += p.memory();
            }
            if let Some(grand) = children.get(&next) {
                stack.extend(grand.iter().copied());
            }
        }
        Ok(total)
    }
}

/// Converts a byte count to MB.
#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}
