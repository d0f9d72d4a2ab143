//! Process resource snapshots taken around a fuzz loop.
//!
//! Measurements are best-effort: on failure a snapshot reads as zero, and
//! deltas are reported as measured (they may be zero or negative).

use std::time::Duration;

/// Point-in-time view of the calling process's resource usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceSnapshot {
    /// Time spent executing in user mode.
    pub user_time: Duration,
    /// Time spent executing in kernel mode.
    pub sys_time: Duration,
    /// Resident set size in bytes.
    pub rss_bytes: u64,
}

impl ResourceSnapshot {
    pub fn total_cpu_time(&self) -> Duration {
        self.user_time.saturating_add(self.sys_time)
    }

    /// Difference from an earlier snapshot.
    pub fn since(&self, earlier: &ResourceSnapshot) -> ResourceDelta {
        let cpu = self.total_cpu_time().as_secs_f64() - earlier.total_cpu_time().as_secs_f64();
        let rss = self.rss_bytes as i64 - earlier.rss_bytes as i64;
        ResourceDelta { cpu_time: cpu, memory_kb: rss as f64 / 1024.0 }
    }
}

/// Resource cost between two snapshots. Signed; never clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceDelta {
    /// User + system CPU seconds.
    pub cpu_time: f64,
    /// Resident memory change in KB.
    pub memory_kb: f64,
}

/// Source of resource snapshots for the fuzz runner.
pub trait ResourceProbe: Send + Sync {
    fn snapshot(&self) -> ResourceSnapshot;
}

/// Probe reading the current process's accounting from the OS.
///
/// CPU time comes from `getrusage(RUSAGE_SELF)`. Resident memory comes from
/// `/proc/self/statm` on Linux; other Unix systems fall back to the
/// `ru_maxrss` high-water mark.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessProbe;

impl ResourceProbe for ProcessProbe {
    fn snapshot(&self) -> ResourceSnapshot {
        process_snapshot()
    }
}

#[cfg(unix)]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    let secs = if tv.tv_sec < 0 { 0 } else { tv.tv_sec as u64 };
    let usec = tv.tv_usec.clamp(0, 999_999) as u64;
    Duration::from_secs(secs) + Duration::from_micros(usec)
}

#[cfg(unix)]
fn process_snapshot() -> ResourceSnapshot {
    // SAFETY: a zeroed rusage is a valid out-parameter and the return code is checked.
    let ru = unsafe {
        let mut ru: libc::rusage = std::mem::zeroed();
        if libc::getrusage(libc::RUSAGE_SELF, &mut ru) != 0 {
            return ResourceSnapshot::default();
        }
        ru
    };

    let rss_bytes = current_rss_bytes().unwrap_or_else(|| maxrss_to_bytes(ru.ru_maxrss));
    ResourceSnapshot {
        user_time: timeval_to_duration(ru.ru_utime),
        sys_time: timeval_to_duration(ru.ru_stime),
        rss_bytes,
    }
}

#[cfg(not(unix))]
fn process_snapshot() -> ResourceSnapshot {
    ResourceSnapshot::default()
}

/// Current RSS from `/proc/self/statm` (second field, in pages).
#[cfg(target_os = "linux")]
fn current_rss_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    parse_statm_rss_pages(&statm).map(|pages| pages.saturating_mul(page_size()))
}

#[cfg(all(unix, not(target_os = "linux")))]
fn current_rss_bytes() -> Option<u64> {
    None
}

#[cfg(target_os = "linux")]
fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_statm_rss_pages(statm: &str) -> Option<u64> {
    statm.split_whitespace().nth(1)?.parse().ok()
}

/// `ru_maxrss` is KiB on Linux and the BSDs and bytes on macOS.
#[cfg(unix)]
fn maxrss_to_bytes(ru_maxrss: libc::c_long) -> u64 {
    let rss = if ru_maxrss <= 0 { 0 } else { ru_maxrss as u64 };
    if cfg!(target_os = "macos") {
        rss
    } else {
        rss.saturating_mul(1024)
    }
}
