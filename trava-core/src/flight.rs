use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::search::Occupancy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightDirection {
    Outbound,
    Inbound,
}

/// One priced flight leg. Immutable once priced; legs are always
/// paired into a `FlightItinerary` before anything downstream sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLeg {
    pub price: Decimal,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub airline_code: String,
    pub stops: u32,
    pub carriers: Vec<String>,
    pub segments: String,
}

/// An outbound/inbound leg pairing priced as a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightItinerary {
    pub outbound: FlightLeg,
    pub inbound: FlightLeg,
    pub occupancy: Occupancy,
    pub config_id: Option<Uuid>,
}

impl FlightItinerary {
    /// Pair two legs into an itinerary. The inbound leg must not depart
    /// before the outbound leg has arrived plus the minimum stay window.
    pub fn pair(
        outbound: FlightLeg,
        inbound: FlightLeg,
        occupancy: Occupancy,
        config_id: Option<Uuid>,
        min_stay: Duration,
    ) -> Result<Self, ItineraryError> {
        if inbound.departure < outbound.arrival + min_stay {
            return Err(ItineraryError::StayTooShort {
                outbound_arrival: outbound.arrival,
                inbound_departure: inbound.departure,
            });
        }
        Ok(Self {
            outbound,
            inbound,
            occupancy,
            config_id,
        })
    }

    /// Combined price of both legs.
    pub fn flight_price(&self) -> Decimal {
        self.outbound.price + self.inbound.price
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ItineraryError {
    #[error("inbound departs {inbound_departure} before minimum stay after outbound arrival {outbound_arrival}")]
    StayTooShort {
        outbound_arrival: DateTime<Utc>,
        inbound_departure: DateTime<Utc>,
    },
}
