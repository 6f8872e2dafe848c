//! Stale Directory Reaper
//!
//! Local cache directories are named `ssr-cache-<pid>-<random>` so the
//! owning process id can be recovered from the name alone. On the first
//! construction of a local backend in a process, this routine scans the
//! shared temp root and removes directories whose owner is no longer
//! running. Directories of live processes and names that do not match the
//! pattern are left untouched.

use std::path::Path;
use std::sync::Once;

use tracing::{debug, info, warn};

use crate::error::Result;

// Name format shared with LocalBackend's directory creation; the parser
// below must accept exactly what cache_dir_prefix produces.
const NAME_PREFIX: &str = "ssr-cache-";

/// The temp-directory prefix for the cache directory of the given process.
/// tempfile appends the random suffix.
pub(crate) fn cache_dir_prefix(pid: u32) -> String {
    format!("{NAME_PREFIX}{pid}-")
}

/// Extracts the owning pid from a cache directory name, or `None` when the
/// name does not match the `ssr-cache-<pid>-<suffix>` pattern.
pub(crate) fn parse_cache_dir_pid(name: &str) -> Option<u32> {
    let rest = name.strip_prefix(NAME_PREFIX)?;
    let (digits, _suffix) = rest.split_once('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

static REAPER_RAN: Once = Once::new();

/// Runs the reaper at most once per process lifetime.
///
/// Triggered by the first local backend construction. Failures are logged
/// rather than raised; stale-directory cleanup is best-effort and must not
/// prevent the cache from starting.
pub(crate) fn reap_stale_dirs_once() {
    REAPER_RAN.call_once(|| {
        if let Err(err) = reap_stale_dirs(&std::env::temp_dir(), std::process::id()) {
            warn!(error = %err, "could not check for stale cache directories");
        }
    });
}

/// Scans `tmp_root` and removes cache directories owned by dead processes.
///
/// A liveness probe outcome other than "alive" or "no such process"
/// propagates as an error.
pub(crate) fn reap_stale_dirs(tmp_root: &Path, current_pid: u32) -> Result<()> {
    for entry in std::fs::read_dir(tmp_root)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(pid) = parse_cache_dir_pid(name) else {
            continue;
        };
        if pid == current_pid {
            continue;
        }

        if process_is_alive(pid)? {
            debug!(pid, name, "cache directory owner still running");
        } else {
            info!(pid, name, "removing stale cache directory");
            std::fs::remove_dir_all(entry.path())?;
        }
    }
    Ok(())
}

/// Zero-effect liveness probe: signal 0 checks existence without touching
/// the target process.
#[cfg(unix)]
fn process_is_alive(pid: u32) -> Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(std::io::Error::from_raw_os_error(errno as i32).into()),
    }
}

/// Without a liveness probe every owner is presumed alive, so foreign
/// directories are never reclaimed on this platform.
#[cfg(not(unix))]
fn process_is_alive(_pid: u32) -> Result<bool> {
    Ok(true)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    // Above any realistic pid_max, so the probe reports "no such process".
    const DEAD_PID: u32 = 99_999_999;

    #[test]
    fn test_prefix_and_parser_agree() {
        let name = format!("{}abc123", cache_dir_prefix(4242));
        assert_eq!(parse_cache_dir_pid(&name), Some(4242));
    }

    #[test]
    fn test_parser_rejects_non_matching_names() {
        assert_eq!(parse_cache_dir_pid("unrelated"), None);
        assert_eq!(parse_cache_dir_pid("ssr-cache-"), None);
        assert_eq!(parse_cache_dir_pid("ssr-cache-abc-x"), None);
        assert_eq!(parse_cache_dir_pid("ssr-cache-123"), None);
        assert_eq!(parse_cache_dir_pid("ssr-cache--x"), None);
    }

    #[test]
    fn test_parser_accepts_empty_suffix() {
        // The random suffix may be empty as long as the trailing dash is
        // present, matching the directory naming pattern.
        assert_eq!(parse_cache_dir_pid("ssr-cache-77-"), Some(77));
    }

    #[cfg(unix)]
    #[test]
    fn test_reap_removes_only_dead_owners() {
        let root = tempfile::tempdir().unwrap();
        let my_pid = std::process::id();
        let parent_pid = std::os::unix::process::parent_id();

        let stale = root.path().join(format!("ssr-cache-{DEAD_PID}-stale"));
        let own = root.path().join(format!("ssr-cache-{my_pid}-own"));
        let live = root.path().join(format!("ssr-cache-{parent_pid}-live"));
        let unrelated = root.path().join("not-a-cache-dir");
        for dir in [&stale, &own, &live, &unrelated] {
            std::fs::create_dir(dir).unwrap();
        }

        reap_stale_dirs(root.path(), my_pid).unwrap();

        assert!(!stale.exists(), "dead owner's directory should be removed");
        assert!(own.exists(), "own directory should survive");
        assert!(live.exists(), "live owner's directory should survive");
        assert!(unrelated.exists(), "non-matching names are ignored");
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_dead_process() {
        assert!(!process_is_alive(DEAD_PID).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_live_process() {
        assert!(process_is_alive(std::process::id()).unwrap());
    }
}
