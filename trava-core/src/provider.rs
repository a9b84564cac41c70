use async_trait::async_trait;

use crate::batch::{FlightCheckParams, HotelCheckParams};
use crate::flight::FlightLeg;
use crate::hotel::HotelStay;

/// Flight-availability supplier boundary. Implementations talk to the
/// actual supplier; the core only sees priced legs or a failure.
#[async_trait]
pub trait FlightAvailabilityProvider: Send + Sync {
    async fn check(&self, params: &FlightCheckParams) -> Result<Vec<FlightLeg>, ProviderError>;
}

/// Hotel-availability supplier boundary. Offer order in the returned
/// stays is the supplier's selection order (selected offer first).
#[async_trait]
pub trait HotelAvailabilityProvider: Send + Sync {
    async fn check(&self, params: &HotelCheckParams) -> Result<Vec<HotelStay>, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("supplier error: {0}")]
    Supplier(String),

    #[error("supplier rejected parameters: {0}")]
    Rejected(String),
}
