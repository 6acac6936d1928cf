//! Fixed-size worker pool for schema extraction
//!
//! Containers are fed to N named worker threads through a channel. Each
//! worker keeps its own outcome list; the lists are merged once every
//! worker has been joined, so workers share nothing but the queue.
//! A panic while reading one container fails that container only.

use crate::error::WorkerError;
use crate::gdb::GeodatabaseReader;
use crate::scanner::extract::{extract_container, ContainerOutcome};
use crossbeam_channel::{unbounded, Receiver};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, error, info};

/// A queued container and its discovery index
type Task<'a> = (usize, &'a Path);

/// Outcomes produced by one worker, tagged with discovery index
type WorkerOutput = Vec<(usize, ContainerOutcome)>;

/// Pool of scan workers
#[derive(Debug, Clone, Copy)]
pub struct ScanPool {
    worker_count: usize,
}

impl ScanPool {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    /// Extract every container and return one outcome per container, in
    /// the order given
    ///
    /// `on_done` is called from worker threads as each container finishes.
    pub fn run<R, F>(&self, reader: &R, containers: &[PathBuf], on_done: F) -> Vec<ContainerOutcome>
    where
        R: GeodatabaseReader + ?Sized,
        F: Fn(&ContainerOutcome) + Sync,
    {
        if containers.is_empty() {
            return Vec::new();
        }

        let (task_tx, task_rx) = unbounded::<Task<'_>>();
        for (idx, path) in containers.iter().enumerate() {
            // Receiver is alive until the end of this function
            let _ = task_tx.send((idx, path.as_path()));
        }
        drop(task_tx);

        let workers = self.worker_count.min(containers.len());
        info!(workers, containers = containers.len(), "Starting scan workers");

        let outputs: Vec<WorkerOutput> = thread::scope(|scope| {
            let on_done = &on_done;
            let mut handles = Vec::with_capacity(workers);

            for id in 0..workers {
                let rx = task_rx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("scanner-{}", id))
                    .spawn_scoped(scope, move || worker_loop(id, reader, rx, on_done));

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        let err = WorkerError::InitFailed {
                            id,
                            reason: e.to_string(),
                        };
                        error!(error = %err, "Scan worker not started");
                    }
                }
            }

            handles
                .into_iter()
                .filter_map(|(id, handle)| match handle.join() {
                    Ok(output) => Some(output),
                    Err(payload) => {
                        let err = WorkerError::Panicked {
                            id,
                            message: panic_message(payload.as_ref()),
                        };
                        error!(error = %err, "Scan worker lost");
                        None
                    }
                })
                .collect()
        });

        merge_outputs(containers, outputs)
    }
}

/// Place worker outputs back in discovery order
///
/// A container with no recorded outcome (its worker died or never started)
/// becomes a failed outcome.
fn merge_outputs(containers: &[PathBuf], outputs: Vec<WorkerOutput>) -> Vec<ContainerOutcome> {
    let mut slots: Vec<Option<ContainerOutcome>> = containers.iter().map(|_| None).collect();

    for (idx, outcome) in outputs.into_iter().flatten() {
        if let Some(slot) = slots.get_mut(idx) {
            *slot = Some(outcome);
        }
    }

    slots
        .into_iter()
        .zip(containers)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| ContainerOutcome::Failed {
                path: path.clone(),
                reason: WorkerError::Abandoned.to_string(),
            })
        })
        .collect()
}

fn worker_loop<R, F>(id: usize, reader: &R, rx: Receiver<Task<'_>>, on_done: &F) -> WorkerOutput
where
    R: GeodatabaseReader + ?Sized,
    F: Fn(&ContainerOutcome) + Sync,
{
    debug!(worker = id, "Worker starting");
    let mut output = Vec::new();

    while let Ok((idx, path)) = rx.recv() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| extract_container(reader, path)))
            .unwrap_or_else(|payload| {
                let err = WorkerError::Panicked {
                    id,
                    message: panic_message(payload.as_ref()),
                };
                error!(container = %path.display(), error = %err, "Container processing aborted");
                ContainerOutcome::Failed {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                }
            });

        on_done(&outcome);
        output.push((idx, outcome));
    }

    debug!(worker = id, containers = output.len(), "Worker finished");
    output
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
