//! A named unit of pipeline work

use crate::BuildContext;
use apkb_errors::Error;
use futures::future::BoxFuture;
use std::fmt;

/// Future returned by a task body
pub type TaskFuture<'a> = BoxFuture<'a, Result<(), Error>>;

/// Task body: borrows the build context for the duration of one run
pub type TaskFn = Box<dyn for<'a> Fn(&'a BuildContext) -> TaskFuture<'a> + Send + Sync>;

/// Lifecycle of a single task inside a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Stage name plus the function that performs it
pub struct Task {
    name: &'static str,
    run: TaskFn,
}

impl Task {
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: for<'a> Fn(&'a BuildContext) -> TaskFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name,
            run: Box::new(run),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Perform the task once
    ///
    /// # Errors
    ///
    /// Returns whatever error the task body reports.
    pub async fn run(&self, ctx: &BuildContext) -> Result<(), Error> {
        (self.run)(ctx).await
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish_non_exhaustive()
    }
}
