//! Core data types: tasks, per-task reports and run summaries.

use crate::error::TaskError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One eligible image discovered in the input directory.
///
/// The `stable_id` is the file stem and names the output artifact, so
/// `photos/cat.png` produces `cat.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    /// Path of the source image
    pub source_path: PathBuf,
    /// Filename stem used to correlate input and output
    pub stable_id: String,
}

impl ImageTask {
    /// Create a task for a source path, deriving the stable id from its stem.
    ///
    /// Stems that are not valid UTF-8 are converted lossily, so such files
    /// still get a task and an output name. Returns `None` for paths with no
    /// file stem.
    pub fn new(source_path: impl Into<PathBuf>) -> Option<Self> {
        let source_path = source_path.into();
        let stable_id = source_path.file_stem()?.to_string_lossy().into_owned();
        if stable_id.is_empty() {
            return None;
        }
        Some(Self {
            source_path,
            stable_id,
        })
    }

    /// File name of the source image, for log and summary lines.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stable_id.clone())
    }

    /// Path of this task's output artifact inside `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.json", self.stable_id))
    }
}

/// Lifecycle of a task within one run. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Encoding,
    Requesting,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Final result of one task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Response persisted at the given path
    Succeeded { output_path: PathBuf },
    /// Task failed; the cause is kept for the summary
    Failed { cause: TaskError },
}

/// What happened to one image, delivered to the caller as soon as it resolves.
#[derive(Debug)]
pub struct TaskReport {
    pub task: ImageTask,
    pub outcome: TaskOutcome,
    /// Number of HTTP attempts made for this task
    pub attempts: u32,
}

impl TaskReport {
    pub fn state(&self) -> TaskState {
        match self.outcome {
            TaskOutcome::Succeeded { .. } => TaskState::Succeeded,
            TaskOutcome::Failed { .. } => TaskState::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Succeeded { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(
            self.outcome,
            TaskOutcome::Failed {
                cause: TaskError::Interrupted
            }
        )
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Tasks cut short by an interrupt (not counted as failed)
    pub interrupted: usize,
    /// True when the run stopped early because of an interrupt
    pub stopped_early: bool,
    pub elapsed: Duration,
    /// Reports in discovery order
    pub reports: Vec<TaskReport>,
}

impl BatchSummary {
    pub(crate) fn record(&mut self, report: TaskReport) {
        if report.is_interrupted() {
            self.interrupted += 1;
        } else if report.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.reports.push(report);
    }

    /// Total tasks that reached a terminal state.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.interrupted
    }

    /// Failed and interrupted reports, for listing causes to the operator.
    pub fn failures(&self) -> impl Iterator<Item = (&ImageTask, &TaskError)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            TaskOutcome::Failed { cause } => Some((&r.task, cause)),
            TaskOutcome::Succeeded { .. } => None,
        })
    }
}

/// Raw reply for single-image mode, shown to the operator unparsed.
#[derive(Debug, Clone)]
pub struct SingleResponse {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_is_file_stem() {
        let task = ImageTask::new("/data/photos/IMG_0042.JPG").unwrap();
        assert_eq!(task.stable_id, "IMG_0042");
        assert_eq!(task.file_name(), "IMG_0042.JPG");
    }

    #[test]
    fn test_stable_id_keeps_inner_dots() {
        let task = ImageTask::new("crop.person.01.png").unwrap();
        assert_eq!(task.stable_id, "crop.person.01");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_stem_is_converted_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.jpg");
        let task = ImageTask::new(Path::new("in").join(name)).unwrap();
        assert_eq!(task.stable_id, "caf\u{FFFD}");
    }

    #[test]
    fn test_output_path() {
        let task = ImageTask::new("in/cat.jpeg").unwrap();
        assert_eq!(
            task.output_path(Path::new("out")),
            PathBuf::from("out/cat.json")
        );
    }

    #[test]
    fn test_task_state_terminal() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Requesting.is_terminal());
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
    }

    #[test]
    fn test_summary_counts_interrupted_separately() {
        let mut summary = BatchSummary::default();
        let task = ImageTask::new("a.jpg").unwrap();
        summary.record(TaskReport {
            task: task.clone(),
            outcome: TaskOutcome::Succeeded {
                output_path: PathBuf::from("out/a.json"),
            },
            attempts: 1,
        });
        summary.record(TaskReport {
            task: task.clone(),
            outcome: TaskOutcome::Failed {
                cause: TaskError::RetryExhausted { attempts: 5 },
            },
            attempts: 5,
        });
        summary.record(TaskReport {
            task,
            outcome: TaskOutcome::Failed {
                cause: TaskError::Interrupted,
            },
            attempts: 0,
        });
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.interrupted, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.failures().count(), 2);
    }
}
