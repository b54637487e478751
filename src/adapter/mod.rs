//! Boundary between the remote API's wire format and the canonical model.
//!
//! Status spellings are normalized here and nowhere else; the rest of the
//! crate only ever sees [`VisitStatus`](crate::visit::VisitStatus) and
//! [`TaskStatus`](crate::visit::TaskStatus).

mod error;
mod normalize;
mod wire;

pub use error::{DecodeError, DecodeFailure};
pub use normalize::{
    parse_task_status, parse_visit_status, task_status_to_wire, visit_status_to_wire,
};
pub use wire::{
    CancelPayload, CheckInPayload, CheckOutPayload, ClockPayload, PayloadLocation,
    ServiceNotePayload, TaskUpdatePayload, WireClientInfo, WireLocation, WireSlot, WireTask,
    WireVisit,
};
