use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

/// How long a statement waits on a lock held by another process (a `record`
/// in a second terminal) before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Owns the job queue and the thread draining it. Dropping the last clone
/// closes the queue; the thread finishes queued jobs and exits.
struct Worker {
    jobs: Option<mpsc::Sender<Job>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    fn submit(&self, job: Job) -> Result<()> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| anyhow!("database worker already shut down"))?;
        jobs.send(job)
            .map_err(|_| anyhow!("database worker is no longer running"))
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.jobs.take());

        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(panic) = handle.join() {
                error!("Database worker panicked: {panic:?}");
            }
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    let journal: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to set journal mode")?;
    if !journal.eq_ignore_ascii_case("wal") {
        // In-memory and some network filesystems refuse WAL; rollback journal still works.
        debug!("SQLite journal mode is {journal}, not WAL");
    }

    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    let foreign_keys: bool = conn
        .pragma_query_value(None, "foreign_keys", |row| row.get(0))
        .context("failed to read foreign_keys pragma")?;
    if !foreign_keys {
        bail!("SQLite build does not enforce foreign keys");
    }

    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

/// Handle to the trajectory database.
///
/// One thread owns the SQLite connection and runs submitted closures in
/// order; clones share that thread.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and brings its
    /// schema up to date. Returns once the worker is ready.
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let thread_path = path.clone();

        let thread = thread::Builder::new()
            .name("mousetrail-db".into())
            .spawn(move || {
                let mut conn = match open_connection(&thread_path) {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                for job in job_rx {
                    job(&mut conn);
                }
                debug!("Database worker exiting");
            })
            .context("failed to spawn database worker thread")?;

        let ready = ready_rx
            .recv()
            .map_err(|_| anyhow!("database worker exited before it was ready"));
        if let Err(err) = ready.and_then(|init| init) {
            if thread.join().is_err() {
                error!("Database worker panicked during start-up");
            }
            return Err(err);
        }

        info!("Database ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                jobs: Some(job_tx),
                thread: Mutex::new(Some(thread)),
            }),
            path: Arc::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Runs `task` on the database thread and awaits its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.worker.submit(Box::new(move |conn| {
            // The caller may have been cancelled; its result is then dropped.
            let _ = reply_tx.send(task(conn));
        }))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker dropped the request"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("shared.sqlite3")).unwrap();
        let clone = db.clone();

        db.execute(|conn| {
            conn.execute_batch("CREATE TEMP TABLE scratch (value INTEGER)")?;
            Ok(())
        })
        .await
        .unwrap();

        // Temp tables are per connection, so the clone sees it only if the
        // connection is shared.
        let count: i64 = clone
            .execute(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM scratch", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn task_errors_reach_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("errors.sqlite3")).unwrap();

        let result: Result<()> = db
            .execute(|conn| {
                conn.execute_batch("SELECT * FROM no_such_table")?;
                Ok(())
            })
            .await;
        assert!(result.is_err());

        // The worker survives a failed task.
        let one: i64 = db
            .execute(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(one, 1);
    }

    #[test]
    fn unopenable_path_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        assert!(Database::new(dir.path().to_path_buf()).is_err());
    }
}
