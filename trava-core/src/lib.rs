pub mod batch;
pub mod events;
pub mod flight;
pub mod hotel;
pub mod package;
pub mod provider;
pub mod repository;
pub mod search;

pub use batch::{
    BatchReport, BatchStatus, BatchTransition, CheckParams, CheckResult, FailedAvailabilityCheck,
    FlightCheckParams, HotelCheckParams, SearchBatch, TaskOutcome, TaskSpec, TaskStatus,
};
pub use events::{NotificationSink, SearchEvent};
pub use repository::{BatchRepository, FailedCheckRepository, PackagePage, PackageRepository};
pub use flight::{FlightDirection, FlightItinerary, FlightLeg, ItineraryError};
pub use hotel::{HotelOffer, HotelStay, StayError};
pub use package::{CommissionPolicy, Package};
pub use provider::{FlightAvailabilityProvider, HotelAvailabilityProvider, ProviderError};
pub use search::{Occupancy, PackageSearchRequest, ValidationError};
