//! Start-up recovery of sessions left `Running` by a process that exited
//! without stopping them.
//!
//! Every invocation opens the same database, so a `Running` row may belong
//! to a `record` still capturing in another terminal. Only sessions whose
//! owning process is gone are finalised.

use anyhow::Result;
use chrono::Utc;
use log::{debug, warn};
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::db::Database;

/// Whether a process with this id currently exists.
pub fn process_is_running(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
    system.process(pid).is_some()
}

/// Marks abandoned `Running` sessions as `Interrupted` and returns their ids.
///
/// A session is abandoned when it has no recorded owner, when the owner is
/// this process (a recycled pid from an earlier run), or when `owner_alive`
/// reports the owner gone.
pub async fn recover_abandoned_sessions<F>(db: &Database, owner_alive: F) -> Result<Vec<String>>
where
    F: Fn(u32) -> bool,
{
    let current_pid = std::process::id();
    let mut recovered = Vec::new();

    for session in db.get_incomplete_sessions().await? {
        if let Some(pid) = session.owner_pid {
            if pid != current_pid && owner_alive(pid) {
                debug!("Session {} is still recording in process {pid}", session.id);
                continue;
            }
        }

        warn!(
            "Recovered incomplete session {}; marking as Interrupted",
            session.id
        );
        db.mark_session_interrupted(&session.id, Utc::now()).await?;
        recovered.push(session.id);
    }

    Ok(recovered)
}
