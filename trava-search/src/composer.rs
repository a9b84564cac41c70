use rust_decimal::Decimal;
use uuid::Uuid;

use trava_core::flight::FlightItinerary;
use trava_core::hotel::HotelStay;
use trava_core::package::{CommissionPolicy, Package};

/// Turns one itinerary + one stay into a priced `Package`.
///
/// Pure over its inputs: no clocks, no I/O, no hidden state beyond the
/// configured commission. The stay's first offer is the selected one;
/// whoever built the stay owns that ordering.
#[derive(Debug, Clone)]
pub struct PackageComposer {
    rate: Decimal,
    policy: CommissionPolicy,
}

impl PackageComposer {
    pub fn new(rate: Decimal, policy: CommissionPolicy) -> Self {
        Self { rate, policy }
    }

    pub fn compose(
        &self,
        itinerary: FlightItinerary,
        stay: HotelStay,
        config_id: Option<Uuid>,
    ) -> Result<Package, ComposeError> {
        // Stays built through HotelStay::new can't be empty, but stays
        // arriving over the wire can.
        if stay.offers.is_empty() {
            return Err(ComposeError::InvalidStay {
                hotel_id: stay.hotel_id.clone(),
            });
        }

        let base = itinerary.flight_price() + stay.selected_offer().price;
        let total = match self.policy {
            CommissionPolicy::Percentage => base * (Decimal::ONE + self.rate),
            CommissionPolicy::Flat => base + self.rate,
        }
        .round_dp(2);

        Ok(Package::priced(itinerary, stay, self.rate, total, config_id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("stay at hotel {hotel_id} has no offers")]
    InvalidStay { hotel_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use trava_core::flight::FlightLeg;
    use trava_core::hotel::HotelOffer;
    use trava_core::search::Occupancy;

    fn leg(day: u32, price: Decimal) -> FlightLeg {
        FlightLeg {
            price,
            origin: "VIE".to_string(),
            destination: "HRG".to_string(),
            departure: Utc.with_ymd_and_hms(2027, 6, day, 10, 0, 0).unwrap(),
            arrival: Utc.with_ymd_and_hms(2027, 6, day, 14, 0, 0).unwrap(),
            airline_code: "XQ".to_string(),
            stops: 0,
            carriers: vec!["XQ".to_string()],
            segments: "VIE-HRG".to_string(),
        }
    }

    fn itinerary() -> FlightItinerary {
        FlightItinerary::pair(
            leg(1, Decimal::new(30000, 2)),
            leg(8, Decimal::new(25000, 2)),
            Occupancy::adults(2),
            None,
            Duration::hours(24),
        )
        .unwrap()
    }

    fn stay(price: Decimal) -> HotelStay {
        HotelStay::new(
            "HTL-1".to_string(),
            NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
            7,
            1,
            Occupancy::adults(2),
            vec![HotelOffer {
                board: "AI".to_string(),
                room_type: "DBL".to_string(),
                price,
                reservation_deadline: None,
                remark: None,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_flat_commission_and_derived_price() {
        // 300 + 250 flights, 300 hotel, zero flat commission.
        let composer = PackageComposer::new(Decimal::ZERO, CommissionPolicy::Flat);
        let package = composer
            .compose(itinerary(), stay(Decimal::new(30000, 2)), None)
            .unwrap();

        assert_eq!(package.total_price, Decimal::new(85000, 2));
        assert_eq!(package.price_minus_hotel, Decimal::new(55000, 2));
    }

    #[test]
    fn test_percentage_commission() {
        let composer =
            PackageComposer::new(Decimal::new(10, 2), CommissionPolicy::Percentage);
        let package = composer
            .compose(itinerary(), stay(Decimal::new(30000, 2)), None)
            .unwrap();

        // 850 * 1.10
        assert_eq!(package.total_price, Decimal::new(93500, 2));
        assert_eq!(
            package.price_minus_hotel,
            package.total_price - Decimal::new(30000, 2)
        );
    }

    #[test]
    fn test_composition_is_deterministic() {
        let composer = PackageComposer::new(Decimal::new(25, 0), CommissionPolicy::Flat);
        let a = composer
            .compose(itinerary(), stay(Decimal::new(30000, 2)), None)
            .unwrap();
        let b = composer
            .compose(itinerary(), stay(Decimal::new(30000, 2)), None)
            .unwrap();
        assert_eq!(a.total_price, b.total_price);
        assert_eq!(a.price_minus_hotel, b.price_minus_hotel);
        assert_eq!(a.commission_rate, b.commission_rate);
    }

    #[test]
    fn test_empty_stay_rejected() {
        let composer = PackageComposer::new(Decimal::ZERO, CommissionPolicy::Flat);
        let mut bad = stay(Decimal::new(30000, 2));
        bad.offers.clear();

        let result = composer.compose(itinerary(), bad, None);
        assert!(matches!(result, Err(ComposeError::InvalidStay { .. })));
    }
}
