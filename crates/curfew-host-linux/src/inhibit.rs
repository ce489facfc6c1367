//! Wake lock via `systemd-inhibit`
//!
//! Holding an inhibitor is a matter of keeping a `systemd-inhibit` child
//! alive; the lock is released by terminating it.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

use curfew_host_api::{HostError, HostResult, WakeGuard, WakeLock};

const DEFAULT_PROGRAM: &str = "systemd-inhibit";

/// Child process in its own process group
pub struct InhibitorProcess {
    child: Child,
    pgid: u32,
}

impl InhibitorProcess {
    pub fn spawn(argv: &[String]) -> HostResult<Self> {
        let Some((program, args)) = argv.split_first() else {
            return Err(HostError::Internal("Empty argv".into()));
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // SAFETY: setsid is async-signal-safe and touches no parent state
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid().map_err(std::io::Error::other)?;
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|e| {
            HostError::WakeLockUnavailable(format!("Failed to spawn {}: {}", program, e))
        })?;

        // After setsid, pid == pgid
        let pgid = child.id();
        debug!(pgid, program = %program, "Inhibitor spawned");

        Ok(Self { child, pgid })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// SIGTERM the process group and reap the child
    pub fn stop(mut self) -> HostResult<()> {
        let pgid = Pid::from_raw(-(self.pgid as i32));

        match signal::kill(pgid, Signal::SIGTERM) {
            Ok(()) => debug!(pgid = self.pgid, "Sent SIGTERM to inhibitor"),
            // Already gone
            Err(nix::errno::Errno::ESRCH) => {}
            Err(e) => {
                return Err(HostError::Internal(format!(
                    "Failed to send SIGTERM: {}",
                    e
                )));
            }
        }

        self.child.wait()?;
        Ok(())
    }

    /// Whether the child has already exited
    pub fn has_exited(&mut self) -> HostResult<bool> {
        Ok(self.child.try_wait()?.is_some())
    }
}

/// Inhibits idle and sleep for as long as a guard is held
#[derive(Debug, Clone)]
pub struct SystemdInhibitWakeLock {
    program: String,
}

impl SystemdInhibitWakeLock {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a non-default `systemd-inhibit` binary
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn argv(&self, reason: &str) -> Vec<String> {
        vec![
            self.program.clone(),
            "--what=idle:sleep".into(),
            "--who=curfew".into(),
            format!("--why={}", reason),
            "--mode=block".into(),
            "sleep".into(),
            "infinity".into(),
        ]
    }
}

impl Default for SystemdInhibitWakeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeLock for SystemdInhibitWakeLock {
    fn acquire(&self, reason: &str) -> HostResult<WakeGuard> {
        let process = InhibitorProcess::spawn(&self.argv(reason))?;
        let pid = process.pid();
        debug!(pid, reason, "Wake lock inhibitor running");

        Ok(WakeGuard::new(move || {
            if let Err(e) = process.stop() {
                warn!(pid, error = %e, "Failed to stop wake lock inhibitor");
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_holds_sleep_until_killed() {
        let lock = SystemdInhibitWakeLock::new();
        let argv = lock.argv("Hosting a session");

        assert_eq!(argv[0], "systemd-inhibit");
        assert!(argv.contains(&"--why=Hosting a session".to_string()));
        assert!(argv.contains(&"--what=idle:sleep".to_string()));
        assert_eq!(argv[argv.len() - 2..], ["sleep", "infinity"]);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let lock = SystemdInhibitWakeLock::with_program("/nonexistent/systemd-inhibit");
        let err = lock.acquire("test").unwrap_err();
        assert!(matches!(err, HostError::WakeLockUnavailable(_)));
    }

    #[test]
    fn stop_terminates_process_group() {
        let argv = vec!["sleep".to_string(), "60".to_string()];
        let mut process = InhibitorProcess::spawn(&argv).unwrap();
        assert!(!process.has_exited().unwrap());

        process.stop().unwrap();
    }

    #[test]
    fn stop_after_exit_is_ok() {
        let argv = vec!["true".to_string()];
        let process = InhibitorProcess::spawn(&argv).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(100));
        process.stop().unwrap();
    }

    #[test]
    fn empty_argv_rejected() {
        assert!(InhibitorProcess::spawn(&[]).is_err());
    }
}
