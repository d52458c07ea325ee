//! Where background work runs.
//!
//! The location loop never calls tokio directly. It goes through [`spawn`],
//! which uses [`TokioSpawner`] unless the host installed its own executor with
//! [`init_runtime`] before the first task was spawned. Spawning fails with
//! [`MapError::Runtime`] instead of panicking when no executor is reachable.

use crate::{MapError, Result};
use futures::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A unit of detached background work.
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Object-safe executor hook.
pub trait AsyncSpawner: Send + Sync + 'static {
    fn spawn_boxed(&self, task: BoxedTask) -> Result<Box<dyn AsyncHandle>>;
}

/// Control over one spawned task. Dropping the handle detaches the task.
pub trait AsyncHandle: Send + Sync {
    fn is_finished(&self) -> bool;

    /// Stops the task at its next await point. Idempotent.
    fn cancel(&self);
}

/// Spawns onto a pinned tokio runtime, or the one the caller is running in.
#[derive(Debug, Default, Clone)]
pub struct TokioSpawner {
    handle: Option<Handle>,
}

impl TokioSpawner {
    /// Follows whichever runtime the caller is inside.
    pub fn current() -> Self {
        Self::default()
    }

    /// Always spawns on `handle`, even from threads outside the runtime.
    pub fn on(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl AsyncSpawner for TokioSpawner {
    fn spawn_boxed(&self, task: BoxedTask) -> Result<Box<dyn AsyncHandle>> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|e| MapError::Runtime(e.to_string()))?,
        };
        Ok(Box::new(TokioTask(handle.spawn(task))))
    }
}

struct TokioTask(JoinHandle<()>);

impl AsyncHandle for TokioTask {
    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    fn cancel(&self) {
        self.0.abort();
    }
}

static SPAWNER: OnceLock<Box<dyn AsyncSpawner>> = OnceLock::new();

/// Installs the executor used by [`spawn`]. Returns `false` if one was already
/// installed or the default was already picked up.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) -> bool {
    SPAWNER.set(spawner).is_ok()
}

pub fn runtime() -> &'static dyn AsyncSpawner {
    SPAWNER.get_or_init(|| Box::new(TokioSpawner::current())).as_ref()
}

pub fn spawn<F>(task: F) -> Result<Box<dyn AsyncHandle>>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(task))
}
