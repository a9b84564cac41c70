use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flight::FlightLeg;
use crate::package::Package;

/// Events the aggregation pipeline emits towards live subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SearchEvent {
    #[serde(rename = "search.completed")]
    SearchCompleted {
        batch_id: Uuid,
        packages: Vec<Package>,
        min: Decimal,
        max: Decimal,
    },

    #[serde(rename = "search.failed")]
    SearchFailed { batch_id: Uuid, message: String },

    #[serde(rename = "flight.updated")]
    FlightUpdated {
        batch_id: Uuid,
        flights: Vec<FlightLeg>,
    },
}

impl SearchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SearchEvent::SearchCompleted { .. } => "search.completed",
            SearchEvent::SearchFailed { .. } => "search.failed",
            SearchEvent::FlightUpdated { .. } => "flight.updated",
        }
    }

    pub fn batch_id(&self) -> Uuid {
        match self {
            SearchEvent::SearchCompleted { batch_id, .. }
            | SearchEvent::SearchFailed { batch_id, .. }
            | SearchEvent::FlightUpdated { batch_id, .. } => *batch_id,
        }
    }
}

/// Transport-agnostic sink the aggregator publishes through. Any
/// transport (broadcast channel, queue, webhook) can implement it.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: SearchEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_stable() {
        let event = SearchEvent::SearchFailed {
            batch_id: Uuid::new_v4(),
            message: "no availability".to_string(),
        };
        assert_eq!(event.name(), "search.failed");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "search.failed");
    }
}
