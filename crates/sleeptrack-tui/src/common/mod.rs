mod notice;
mod task;

pub use notice::{Notice, NoticeLevel};
pub use task::{
    TaskCompleted, TaskId, TaskKind, TaskMeta, TaskSeq, TaskStarted, TaskState, Tasks,
};
