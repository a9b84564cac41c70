use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use trava_core::batch::{FlightCheckParams, HotelCheckParams};
use trava_core::flight::{FlightDirection, FlightLeg};
use trava_core::hotel::{HotelOffer, HotelStay};
use trava_core::provider::{
    FlightAvailabilityProvider, HotelAvailabilityProvider, ProviderError,
};

/// Deterministic flight provider for local runs and tests. A request
/// from origin "XXX" simulates a supplier outage.
pub struct StubFlightProvider;

#[async_trait]
impl FlightAvailabilityProvider for StubFlightProvider {
    async fn check(&self, params: &FlightCheckParams) -> Result<Vec<FlightLeg>, ProviderError> {
        if params.origin == "XXX" {
            return Err(ProviderError::Supplier(
                "flight inventory offline".to_string(),
            ));
        }

        let price = match params.direction {
            FlightDirection::Outbound => Decimal::new(30000, 2),
            FlightDirection::Inbound => Decimal::new(25000, 2),
        };
        let departure =
            Utc.from_utc_datetime(&params.date.and_time(NaiveTime::MIN)) + Duration::hours(10);

        Ok(vec![FlightLeg {
            price,
            origin: params.origin.clone(),
            destination: params.destination.clone(),
            departure,
            arrival: departure + Duration::hours(4),
            airline_code: "XQ".to_string(),
            stops: 0,
            carriers: vec!["XQ".to_string()],
            segments: format!("{}-{}", params.origin, params.destination),
        }])
    }
}

/// Deterministic hotel provider. Destination "XXX" simulates a supplier
/// outage; individual rooms can be set to fail for partial-batch tests.
pub struct StubHotelProvider {
    fail_rooms: HashSet<usize>,
}

impl StubHotelProvider {
    pub fn new() -> Self {
        Self {
            fail_rooms: HashSet::new(),
        }
    }

    pub fn failing_rooms(rooms: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_rooms: rooms.into_iter().collect(),
        }
    }
}

impl Default for StubHotelProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HotelAvailabilityProvider for StubHotelProvider {
    async fn check(&self, params: &HotelCheckParams) -> Result<Vec<HotelStay>, ProviderError> {
        if params.destination_id == "XXX" || self.fail_rooms.contains(&params.room_index) {
            return Err(ProviderError::Supplier(
                format!("hotel supplier unavailable for room {}", params.room_index),
            ));
        }

        let stay = HotelStay::new(
            "HTL-SUNRISE".to_string(),
            params.check_in,
            params.nights,
            1,
            params.occupancy,
            vec![HotelOffer {
                board: "AI".to_string(),
                room_type: "DBL".to_string(),
                price: Decimal::new(30000, 2),
                reservation_deadline: None,
                remark: None,
            }],
        )
        .map_err(|e| ProviderError::Rejected(e.to_string()))?;

        Ok(vec![stay])
    }
}
