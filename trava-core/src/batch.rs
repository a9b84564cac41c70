use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flight::{FlightDirection, FlightLeg};
use crate::hotel::HotelStay;
use crate::search::{Occupancy, PackageSearchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Pending,
    Complete,
    Failed,
}

/// Parameters of one flight availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightCheckParams {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub direction: FlightDirection,
    pub occupancy: Occupancy,
}

/// Parameters of one hotel availability check (one per room).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelCheckParams {
    pub destination_id: String,
    pub check_in: NaiveDate,
    pub nights: u32,
    pub room_index: usize,
    pub occupancy: Occupancy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum CheckParams {
    Flight(FlightCheckParams),
    Hotel(HotelCheckParams),
}

/// Payload of a succeeded availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CheckResult {
    Flights {
        direction: FlightDirection,
        legs: Vec<FlightLeg>,
    },
    Hotels {
        stays: Vec<HotelStay>,
    },
}

/// What a worker reports back for one task.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Succeeded(CheckResult),
    Failed { params: CheckParams, reason: String },
}

/// One availability-check task to dispatch.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub task_id: String,
    pub params: CheckParams,
}

/// Effect of applying one task result to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchTransition {
    /// Result recorded, batch still has pending tasks.
    Recorded,
    /// This result was the last one and at least one task succeeded.
    Completed,
    /// This result was the last one and every task failed.
    Failed,
    /// Batch already terminal; the report is ignored.
    AlreadyTerminal,
    /// Task id not part of this batch.
    UnknownTask,
}

/// Returned by the batch repository after recording a task result.
/// `results` carries the succeeded payloads only when this report
/// completed the batch.
#[derive(Debug)]
pub struct BatchReport {
    pub transition: BatchTransition,
    pub results: Vec<CheckResult>,
}

/// One search request's full set of availability-check tasks.
///
/// Status moves `Pending -> {Complete, Failed}` exactly once; a terminal
/// batch never changes again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBatch {
    pub id: Uuid,
    pub request: PackageSearchRequest,
    pub tasks: HashMap<String, TaskStatus>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SearchBatch {
    pub fn new(request: PackageSearchRequest, task_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            tasks: task_ids
                .into_iter()
                .map(|id| (id, TaskStatus::Pending))
                .collect(),
            status: BatchStatus::Pending,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Enumerate the checks a request requires: one flight check per
    /// direction plus one hotel check per room.
    pub fn plan(request: &PackageSearchRequest) -> Vec<TaskSpec> {
        let mut specs = vec![
            TaskSpec {
                task_id: "flight:outbound".to_string(),
                params: CheckParams::Flight(FlightCheckParams {
                    origin: request.origin_id.clone(),
                    destination: request.destination_id.clone(),
                    date: request.departure_date,
                    direction: FlightDirection::Outbound,
                    occupancy: Occupancy::combined(&request.rooms),
                }),
            },
            TaskSpec {
                task_id: "flight:inbound".to_string(),
                params: CheckParams::Flight(FlightCheckParams {
                    origin: request.destination_id.clone(),
                    destination: request.origin_id.clone(),
                    date: request.return_date(),
                    direction: FlightDirection::Inbound,
                    occupancy: Occupancy::combined(&request.rooms),
                }),
            },
        ];
        for (i, room) in request.rooms.iter().enumerate() {
            specs.push(TaskSpec {
                task_id: format!("hotel:room-{i}"),
                params: CheckParams::Hotel(HotelCheckParams {
                    destination_id: request.destination_id.clone(),
                    check_in: request.departure_date,
                    nights: request.nights,
                    room_index: i,
                    occupancy: *room,
                }),
            });
        }
        specs
    }

    pub fn is_terminal(&self) -> bool {
        self.status != BatchStatus::Pending
    }

    /// Apply one task result. Callers must hold exclusive access to the
    /// batch while calling this; the returned transition tells whether
    /// this particular report finalized the batch.
    pub fn apply_result(&mut self, task_id: &str, succeeded: bool) -> BatchTransition {
        if self.is_terminal() {
            return BatchTransition::AlreadyTerminal;
        }
        let Some(status) = self.tasks.get_mut(task_id) else {
            return BatchTransition::UnknownTask;
        };
        *status = if succeeded {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed
        };

        if self
            .tasks
            .values()
            .any(|s| *s == TaskStatus::Pending)
        {
            return BatchTransition::Recorded;
        }

        let any_succeeded = self.tasks.values().any(|s| *s == TaskStatus::Succeeded);
        self.status = if any_succeeded {
            BatchStatus::Complete
        } else {
            BatchStatus::Failed
        };
        self.finished_at = Some(Utc::now());
        if any_succeeded {
            BatchTransition::Completed
        } else {
            BatchTransition::Failed
        }
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        let mut pending = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        for status in self.tasks.values() {
            match status {
                TaskStatus::Pending => pending += 1,
                TaskStatus::Succeeded => succeeded += 1,
                TaskStatus::Failed => failed += 1,
            }
        }
        (pending, succeeded, failed)
    }
}

/// Persisted record of a failed availability check, retained until a
/// retry succeeds. Ids are assigned at construction, so there is no
/// separate unsaved/saved shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAvailabilityCheck {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub task_id: String,
    pub params: CheckParams,
    pub reason: String,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_attempt_at: DateTime<Utc>,
}

impl FailedAvailabilityCheck {
    pub fn new(batch_id: Uuid, task_id: &str, params: CheckParams, reason: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            batch_id,
            task_id: task_id.to_string(),
            params,
            reason,
            retry_count: 0,
            created_at: now,
            last_attempt_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(rooms: usize) -> PackageSearchRequest {
        PackageSearchRequest {
            origin_id: "VIE".to_string(),
            destination_id: "HRG".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
            nights: 7,
            rooms: vec![Occupancy::adults(2); rooms],
        }
    }

    fn batch(rooms: usize) -> SearchBatch {
        let req = request(rooms);
        let ids = SearchBatch::plan(&req)
            .into_iter()
            .map(|s| s.task_id)
            .collect();
        SearchBatch::new(req, ids)
    }

    #[test]
    fn test_plan_enumerates_flights_and_rooms() {
        let specs = SearchBatch::plan(&request(2));
        let ids: Vec<_> = specs.iter().map(|s| s.task_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["flight:outbound", "flight:inbound", "hotel:room-0", "hotel:room-1"]
        );

        // The inbound check runs from the destination on the return date.
        let CheckParams::Flight(inbound) = &specs[1].params else {
            panic!("expected flight params");
        };
        assert_eq!(inbound.origin, "HRG");
        assert_eq!(inbound.date, NaiveDate::from_ymd_opt(2027, 6, 8).unwrap());
    }

    #[test]
    fn test_partial_failure_still_completes() {
        let mut batch = batch(1);
        assert_eq!(batch.apply_result("flight:outbound", true), BatchTransition::Recorded);
        assert_eq!(batch.apply_result("flight:inbound", false), BatchTransition::Recorded);
        assert_eq!(batch.apply_result("hotel:room-0", true), BatchTransition::Completed);
        assert_eq!(batch.status, BatchStatus::Complete);
        assert!(batch.finished_at.is_some());
    }

    #[test]
    fn test_all_failed_terminates_failed() {
        let mut batch = batch(1);
        batch.apply_result("flight:outbound", false);
        batch.apply_result("flight:inbound", false);
        assert_eq!(batch.apply_result("hotel:room-0", false), BatchTransition::Failed);
        assert_eq!(batch.status, BatchStatus::Failed);
    }

    #[test]
    fn test_terminal_batch_ignores_late_reports() {
        let mut batch = batch(1);
        batch.apply_result("flight:outbound", true);
        batch.apply_result("flight:inbound", true);
        batch.apply_result("hotel:room-0", true);

        let finished = batch.finished_at;
        assert_eq!(
            batch.apply_result("hotel:room-0", false),
            BatchTransition::AlreadyTerminal
        );
        assert_eq!(batch.status, BatchStatus::Complete);
        assert_eq!(batch.finished_at, finished);
    }

    #[test]
    fn test_unknown_task_rejected() {
        let mut batch = batch(1);
        assert_eq!(
            batch.apply_result("hotel:room-9", true),
            BatchTransition::UnknownTask
        );
    }
}
