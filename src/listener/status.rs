use crate::task::{Process, Task, TaskStatus};
use crate::ui::theme::StyleTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Idle,
    Running,
    Succeeded,
    Failed { exit_code: i32 },
}

impl StatusCategory {
    pub fn label(self) -> String {
        match self {
            StatusCategory::Idle => "idle".to_owned(),
            StatusCategory::Running => "running".to_owned(),
            StatusCategory::Succeeded => "success".to_owned(),
            StatusCategory::Failed { exit_code } => format!("failed (exit code: {exit_code})"),
        }
    }

    pub fn tag(self) -> StyleTag {
        match self {
            StatusCategory::Idle => StyleTag::Idle,
            StatusCategory::Running => StyleTag::Running,
            StatusCategory::Succeeded => StyleTag::Success,
            StatusCategory::Failed { .. } => StyleTag::Error,
        }
    }
}

impl From<TaskStatus> for StatusCategory {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Idle => StatusCategory::Idle,
            TaskStatus::Running => StatusCategory::Running,
            TaskStatus::Succeeded => StatusCategory::Succeeded,
            TaskStatus::Failed(exit_code) => StatusCategory::Failed { exit_code },
        }
    }
}

pub fn classify<P: Process>(task: &Task<P>) -> StatusCategory {
    StatusCategory::from(task.status())
}
