//! Visit data model and its two state machines.

mod action;
pub mod machine;
mod model;
mod status;
pub mod task;

pub use action::{ActionKind, VisitAction};
pub use model::{
    Coordinates, ScheduledSlot, SlotError, Task, TaskId, TaskProgress, Visit, VisitId,
};
pub use status::{TaskStatus, VisitStatus};
