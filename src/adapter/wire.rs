//! Wire representations exchanged with the visit API.
//!
//! Incoming documents use PascalCase keys and loose status spellings.
//! [`WireVisit::into_visit`] turns one into a canonical [`Visit`], reporting
//! every problem it finds rather than stopping at the first.

use super::error::{DecodeError, DecodeFailure};
use super::normalize::{
    parse_task_status, parse_visit_status, task_status_to_wire, visit_status_to_wire,
};
use crate::collaborators::{Submission, TaskUpdate};
use crate::validation::validate_visit;
use crate::visit::{Coordinates, ScheduledSlot, Task, Visit};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireLocation {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireSlot {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireClientInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireTask {
    #[serde(rename = "ID")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireVisit {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub client_info: Option<WireClientInfo>,
    pub scheduled_slot: WireSlot,
    pub visit_status: String,
    #[serde(default)]
    pub checkin_time: Option<String>,
    #[serde(default)]
    pub checkout_time: Option<String>,
    #[serde(default)]
    pub checkin_location: Option<WireLocation>,
    #[serde(default)]
    pub checkout_location: Option<WireLocation>,
    #[serde(default)]
    pub tasks: Vec<WireTask>,
    #[serde(default)]
    pub service_note: Option<String>,
}

fn keep<T>(problems: &mut Vec<DecodeError>, result: Result<T, DecodeError>) -> Option<T> {
    result.map_err(|e| problems.push(e)).ok()
}

fn timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DecodeError::BadTimestamp {
            field,
            value: raw.to_string(),
        })
}

fn optional_timestamp(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, DecodeError> {
    raw.filter(|r| !r.trim().is_empty())
        .map(|r| timestamp(field, r))
        .transpose()
}

fn location(
    field: &'static str,
    wire: Option<WireLocation>,
) -> Result<Option<Coordinates>, DecodeError> {
    match wire.map(|w| (w.lat, w.long)) {
        None | Some((None, None)) => Ok(None),
        Some((Some(lat), Some(long))) => Ok(Some(Coordinates::new(lat, long))),
        Some(_) => Err(DecodeError::HalfLocation { field }),
    }
}

fn to_wire_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn to_wire_location(location: Option<Coordinates>) -> WireLocation {
    WireLocation {
        lat: location.map(|c| c.lat),
        long: location.map(|c| c.long),
    }
}

impl WireTask {
    pub fn into_task(self) -> Result<Task, DecodeError> {
        let status = parse_task_status(&self.status).ok_or_else(|| DecodeError::UnknownTaskStatus {
            task: self.id.clone(),
            value: self.status.clone(),
        })?;
        Ok(Task {
            id: self.id.into(),
            title: self.title,
            description: self.description,
            status,
            feedback: self.feedback.filter(|f| !f.trim().is_empty()),
        })
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task_status_to_wire(task.status).to_string(),
            feedback: task.feedback.clone(),
        }
    }
}

impl WireVisit {
    /// Decode into a canonical visit, collecting every problem.
    pub fn into_visit(self) -> Result<Visit, DecodeFailure> {
        let mut problems = Vec::new();

        let status = keep(
            &mut problems,
            parse_visit_status(&self.visit_status)
                .ok_or_else(|| DecodeError::UnknownVisitStatus(self.visit_status.clone())),
        );
        let from = keep(
            &mut problems,
            timestamp("ScheduledSlot.From", &self.scheduled_slot.from),
        );
        let to = keep(
            &mut problems,
            timestamp("ScheduledSlot.To", &self.scheduled_slot.to),
        );
        let slot = match (from, to) {
            (Some(from), Some(to)) => keep(
                &mut problems,
                ScheduledSlot::new(from, to).map_err(DecodeError::from),
            ),
            _ => None,
        };
        let checkin_time = keep(
            &mut problems,
            optional_timestamp("CheckinTime", self.checkin_time.as_deref()),
        );
        let checkout_time = keep(
            &mut problems,
            optional_timestamp("CheckoutTime", self.checkout_time.as_deref()),
        );
        let checkin_location = keep(
            &mut problems,
            location("CheckinLocation", self.checkin_location),
        );
        let checkout_location = keep(
            &mut problems,
            location("CheckoutLocation", self.checkout_location),
        );

        let mut tasks = Vec::with_capacity(self.tasks.len());
        for wire in self.tasks {
            if let Some(task) = keep(&mut problems, wire.into_task()) {
                tasks.push(task);
            }
        }

        let (
            Some(status),
            Some(scheduled_slot),
            Some(checkin_time),
            Some(checkout_time),
            Some(checkin_location),
            Some(checkout_location),
        ) = (
            status,
            slot,
            checkin_time,
            checkout_time,
            checkin_location,
            checkout_location,
        )
        else {
            return Err(DecodeFailure(problems));
        };

        let client_name = self
            .client_info
            .map(|c| format!("{} {}", c.first_name.trim(), c.last_name.trim()).trim().to_string())
            .unwrap_or_default();

        let visit = Visit {
            id: self.id.into(),
            status,
            scheduled_slot,
            checkin_time,
            checkin_location,
            checkout_time,
            checkout_location,
            tasks,
            service_note: self.service_note.filter(|n| !n.trim().is_empty()),
            service_name: self.service_name,
            client_name,
        };

        if let Validation::Failure(violations) = validate_visit(&visit) {
            problems.extend(violations.iter().cloned().map(DecodeError::from));
        }

        if problems.is_empty() {
            Ok(visit)
        } else {
            Err(DecodeFailure(problems))
        }
    }

    pub fn from_visit(visit: &Visit) -> Self {
        let client_info = (!visit.client_name.is_empty()).then(|| {
            let (first, last) = visit
                .client_name
                .split_once(' ')
                .unwrap_or((visit.client_name.as_str(), ""));
            WireClientInfo {
                first_name: first.to_string(),
                last_name: last.to_string(),
            }
        });

        Self {
            id: visit.id.to_string(),
            service_name: visit.service_name.clone(),
            client_info,
            scheduled_slot: WireSlot {
                from: to_wire_time(visit.scheduled_slot.from()),
                to: to_wire_time(visit.scheduled_slot.to()),
            },
            visit_status: visit_status_to_wire(visit.status).to_string(),
            checkin_time: visit.checkin_time.map(to_wire_time),
            checkout_time: visit.checkout_time.map(to_wire_time),
            checkin_location: Some(to_wire_location(visit.checkin_location)),
            checkout_location: Some(to_wire_location(visit.checkout_location)),
            tasks: visit.tasks.iter().map(WireTask::from_task).collect(),
            service_note: visit.service_note.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadLocation {
    pub lat: f64,
    pub long: f64,
}

/// Body of the start and end requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClockPayload {
    pub timestamp: String,
    pub location: PayloadLocation,
}

pub type CheckInPayload = ClockPayload;
pub type CheckOutPayload = ClockPayload;

impl From<&Submission> for ClockPayload {
    fn from(submission: &Submission) -> Self {
        Self {
            timestamp: to_wire_time(submission.timestamp),
            location: PayloadLocation {
                lat: submission.location.lat,
                long: submission.location.long,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancelPayload {
    pub visit_status: String,
}

impl Default for CancelPayload {
    fn default() -> Self {
        Self {
            visit_status: visit_status_to_wire(crate::visit::VisitStatus::Cancelled).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdatePayload {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl From<&TaskUpdate> for TaskUpdatePayload {
    fn from(update: &TaskUpdate) -> Self {
        Self {
            status: task_status_to_wire(update.status).to_string(),
            feedback: update.feedback.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNotePayload {
    pub notes: String,
}

impl ServiceNotePayload {
    pub fn new(notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
        }
    }
}
