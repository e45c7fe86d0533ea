//! Fail-fast sequencing of build tasks

use crate::{BuildContext, Task, TaskState};
use apkb_errors::{BuildError, Error};
use apkb_events::{AppEvent, EventEmitter, PipelineEvent};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Lifecycle of the whole pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running,
    Completed,
    Aborted,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Every task, in the order it ran
    pub completed: Vec<&'static str>,
    /// The finished archive
    pub artifact: PathBuf,
    pub duration: Duration,
}

/// Runs an ordered list of tasks exactly once.
///
/// Tasks run strictly one after another. The first failure aborts the
/// pipeline: the failing task is marked failed, every later task stays
/// pending and is never started.
#[derive(Debug)]
pub struct TaskManager {
    tasks: Vec<Task>,
    states: Vec<TaskState>,
    cursor: usize,
    state: PipelineState,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            states: Vec::new(),
            cursor: 0,
            state: PipelineState::Pending,
        }
    }

    /// Append a task to the end of the pipeline
    pub fn add_task(&mut self, task: Task) -> &mut Self {
        self.tasks.push(task);
        self.states.push(TaskState::Pending);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tasks.iter().map(Task::name)
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Per-task states, in pipeline order
    #[must_use]
    pub fn task_states(&self) -> &[TaskState] {
        &self.states
    }

    /// Index of the task currently (or last) being run
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Run every task in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::TaskFailed` naming the first task that failed,
    /// or `BuildError::AlreadyRun` if this pipeline has run before.
    pub async fn run(&mut self, ctx: &BuildContext) -> Result<PipelineReport, Error> {
        if self.state != PipelineState::Pending {
            return Err(BuildError::AlreadyRun.into());
        }
        self.state = PipelineState::Running;

        let total = self.tasks.len();
        let started = Instant::now();
        let names: Vec<&'static str> = self.task_names().collect();

        tracing::info!(stages = ?names, "starting pipeline");
        ctx.emit(AppEvent::Pipeline(PipelineEvent::Started {
            stages: names.iter().map(ToString::to_string).collect(),
        }));

        for index in 0..total {
            self.cursor = index;
            let name = self.tasks[index].name();
            let position = index + 1;

            self.states[index] = TaskState::Running;
            ctx.emit(AppEvent::Pipeline(PipelineEvent::TaskStarted {
                index: position,
                total,
                task: name.to_string(),
            }));

            let task_started = Instant::now();
            let outcome = self.tasks[index].run(ctx).await;
            let elapsed = task_started.elapsed();

            match outcome {
                Ok(()) => {
                    self.states[index] = TaskState::Succeeded;
                    tracing::info!(task = name, duration_ms = millis(elapsed), "stage finished");
                    ctx.emit(AppEvent::Pipeline(PipelineEvent::TaskCompleted {
                        index: position,
                        total,
                        task: name.to_string(),
                        duration_ms: millis(elapsed),
                    }));
                }
                Err(error) => {
                    self.states[index] = TaskState::Failed;
                    self.state = PipelineState::Aborted;
                    tracing::error!(task = name, %error, "stage failed, aborting pipeline");
                    report_failure(ctx, name, position, total, &error);
                    return Err(BuildError::task_failed(name, position, error).into());
                }
            }
        }

        self.cursor = total;
        self.state = PipelineState::Completed;

        let duration = started.elapsed();
        let artifact = ctx.layout().base_apk();
        ctx.emit(AppEvent::Pipeline(PipelineEvent::Completed {
            tasks: total,
            artifact: artifact.clone(),
            duration_ms: millis(duration),
        }));

        Ok(PipelineReport {
            completed: names,
            artifact,
            duration,
        })
    }
}

fn report_failure(ctx: &BuildContext, task: &str, position: usize, total: usize, error: &Error) {
    ctx.emit(AppEvent::Pipeline(PipelineEvent::TaskFailed {
        index: position,
        total,
        task: task.to_string(),
        error: error.to_string(),
    }));
    if let Some(output) = error.tool_output() {
        for line in output.lines().filter(|line| !line.trim().is_empty()) {
            ctx.emit(AppEvent::Pipeline(PipelineEvent::ToolOutput {
                task: task.to_string(),
                line: line.to_string(),
            }));
        }
    }
    ctx.emit(AppEvent::Pipeline(PipelineEvent::Aborted {
        task: task.to_string(),
        completed: position - 1,
        skipped: total - position,
    }));
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
