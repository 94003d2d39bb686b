//! Process-group kill guard for spawned shells.
//!
//! Each command runs as the leader of its own process group so that anything
//! it forks can be terminated together. The guard sends SIGKILL to the group
//! when asked, and again when dropped, so an abandoned run never leaves
//! processes behind.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

pub(crate) struct ProcessGroupGuard {
    pgid: Option<i32>,
    armed: AtomicBool,
}

impl ProcessGroupGuard {
    /// Guard the group led by `pid` (as returned by `Child::id`).
    pub(crate) fn new(pid: Option<u32>) -> Self {
        let pgid = pid.and_then(|p| i32::try_from(p).ok());
        Self {
            pgid,
            armed: AtomicBool::new(pgid.is_some()),
        }
    }

    /// Kill every process still in the group. Only the first call signals.
    pub(crate) fn kill(&self) {
        if !self.armed.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(pgid) = self.pgid {
            kill_group(pgid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pgid: i32) {
    // SAFETY: killpg has no memory-safety preconditions; a stale group id
    // yields ESRCH, which is ignored.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            "killpg({}) failed: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_group(pgid: i32) {
    debug!("process groups unsupported on this platform (pid {})", pgid);
}
