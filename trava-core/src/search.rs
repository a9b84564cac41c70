use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Travellers in one room. The same shape is reused for the whole
/// itinerary, where it carries the sum over all rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Occupancy {
    pub fn adults(adults: u32) -> Self {
        Self {
            adults,
            children: 0,
            infants: 0,
        }
    }

    /// Total occupancy across a set of rooms.
    pub fn combined(rooms: &[Occupancy]) -> Self {
        rooms.iter().fold(Occupancy::adults(0), |acc, r| Occupancy {
            adults: acc.adults + r.adults,
            children: acc.children + r.children,
            infants: acc.infants + r.infants,
        })
    }

    fn validate(&self, room_index: usize) -> Result<(), ValidationError> {
        if self.adults < 1 || self.adults > 5 {
            return Err(ValidationError::OccupancyOutOfRange {
                room_index,
                field: "adults",
                value: self.adults,
            });
        }
        if self.children > 5 {
            return Err(ValidationError::OccupancyOutOfRange {
                room_index,
                field: "children",
                value: self.children,
            });
        }
        if self.infants > 5 {
            return Err(ValidationError::OccupancyOutOfRange {
                room_index,
                field: "infants",
                value: self.infants,
            });
        }
        Ok(())
    }
}

/// A package search as received at the HTTP boundary. Must pass
/// `validate` before a batch is created for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSearchRequest {
    pub origin_id: String,
    pub destination_id: String,
    pub departure_date: NaiveDate,
    pub nights: u32,
    pub rooms: Vec<Occupancy>,
}

impl PackageSearchRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.origin_id.trim().is_empty() || self.destination_id.trim().is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        if self.departure_date < today {
            return Err(ValidationError::DateInPast(self.departure_date));
        }
        if self.nights == 0 {
            return Err(ValidationError::InvalidNights(self.nights));
        }
        if self.rooms.is_empty() {
            return Err(ValidationError::NoRooms);
        }
        for (i, room) in self.rooms.iter().enumerate() {
            room.validate(i)?;
        }
        Ok(())
    }

    /// Date the return flight departs.
    pub fn return_date(&self) -> NaiveDate {
        self.departure_date + chrono::Duration::days(self.nights as i64)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("origin and destination are required")]
    MissingLocation,

    #[error("departure date {0} is in the past")]
    DateInPast(NaiveDate),

    #[error("invalid number of nights: {0}")]
    InvalidNights(u32),

    #[error("at least one room is required")]
    NoRooms,

    #[error("room {room_index}: {field} out of range ({value})")]
    OccupancyOutOfRange {
        room_index: usize,
        field: &'static str,
        value: u32,
    },
}
