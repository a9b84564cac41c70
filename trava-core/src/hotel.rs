use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::search::Occupancy;

/// A priced room/board combination within a stay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelOffer {
    pub board: String,
    pub room_type: String,
    pub price: Decimal,
    pub reservation_deadline: Option<NaiveDate>,
    pub remark: Option<String>,
}

/// A hotel booking window with one or more priced offers.
///
/// Offer order is owned by whoever supplied the offers: the first offer
/// is the selected one and drives package price derivation. The core
/// never re-sorts the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelStay {
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub nights: u32,
    pub rooms: u32,
    pub occupancy: Occupancy,
    pub offers: Vec<HotelOffer>,
}

impl HotelStay {
    pub fn new(
        hotel_id: String,
        check_in: NaiveDate,
        nights: u32,
        rooms: u32,
        occupancy: Occupancy,
        offers: Vec<HotelOffer>,
    ) -> Result<Self, StayError> {
        if offers.is_empty() {
            return Err(StayError::NoOffers {
                hotel_id: hotel_id.clone(),
            });
        }
        for offer in &offers {
            if offer.price < Decimal::ZERO {
                return Err(StayError::NegativePrice {
                    hotel_id: hotel_id.clone(),
                    price: offer.price,
                });
            }
            if let Some(deadline) = offer.reservation_deadline {
                if deadline >= check_in {
                    return Err(StayError::DeadlineNotBeforeCheckIn {
                        hotel_id: hotel_id.clone(),
                        deadline,
                        check_in,
                    });
                }
            }
        }
        Ok(Self {
            hotel_id,
            check_in,
            nights,
            rooms,
            occupancy,
            offers,
        })
    }

    /// The offer package pricing is derived from.
    pub fn selected_offer(&self) -> &HotelOffer {
        &self.offers[0]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StayError {
    #[error("stay at hotel {hotel_id} has no offers")]
    NoOffers { hotel_id: String },

    #[error("stay at hotel {hotel_id} has a negative offer price: {price}")]
    NegativePrice { hotel_id: String, price: Decimal },

    #[error("stay at hotel {hotel_id}: reservation deadline {deadline} is not before check-in {check_in}")]
    DeadlineNotBeforeCheckIn {
        hotel_id: String,
        deadline: NaiveDate,
        check_in: NaiveDate,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(price: Decimal) -> HotelOffer {
        HotelOffer {
            board: "AI".to_string(),
            room_type: "DBL".to_string(),
            price,
            reservation_deadline: None,
            remark: None,
        }
    }

    fn check_in() -> NaiveDate {
        NaiveDate::from_ymd_opt(2027, 6, 1).unwrap()
    }

    #[test]
    fn test_stay_requires_offers() {
        let result = HotelStay::new(
            "HTL-1".to_string(),
            check_in(),
            7,
            1,
            Occupancy::adults(2),
            vec![],
        );
        assert!(matches!(result, Err(StayError::NoOffers { .. })));
    }

    #[test]
    fn test_deadline_must_precede_check_in() {
        let mut late = offer(Decimal::new(30000, 2));
        late.reservation_deadline = Some(check_in());

        let result = HotelStay::new(
            "HTL-1".to_string(),
            check_in(),
            7,
            1,
            Occupancy::adults(2),
            vec![late],
        );
        assert!(matches!(
            result,
            Err(StayError::DeadlineNotBeforeCheckIn { .. })
        ));
    }

    #[test]
    fn test_selected_offer_is_first() {
        let stay = HotelStay::new(
            "HTL-1".to_string(),
            check_in(),
            7,
            1,
            Occupancy::adults(2),
            vec![offer(Decimal::new(30000, 2)), offer(Decimal::new(20000, 2))],
        )
        .unwrap();
        assert_eq!(stay.selected_offer().price, Decimal::new(30000, 2));
    }
}
