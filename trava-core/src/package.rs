use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flight::FlightItinerary;
use crate::hotel::HotelStay;

/// How the commission rate is applied to a package total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionPolicy {
    /// `total *= 1 + rate`
    Percentage,
    /// `total += rate`
    Flat,
}

/// A composed, priced itinerary+stay pairing.
///
/// All derived fields are computed at construction and the value is
/// never mutated afterwards; a price override means building a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub itinerary: FlightItinerary,
    pub stay: HotelStay,
    pub commission_rate: Decimal,
    pub total_price: Decimal,
    pub price_minus_hotel: Decimal,
    pub config_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Package {
    /// Build a package from an already-priced total. Derives
    /// `price_minus_hotel` from the stay's selected offer.
    pub fn priced(
        itinerary: FlightItinerary,
        stay: HotelStay,
        commission_rate: Decimal,
        total_price: Decimal,
        config_id: Option<Uuid>,
    ) -> Self {
        let price_minus_hotel = total_price - stay.selected_offer().price;
        Self {
            id: Uuid::new_v4(),
            itinerary,
            stay,
            commission_rate,
            total_price,
            price_minus_hotel,
            config_id,
            created_at: Utc::now(),
        }
    }
}
