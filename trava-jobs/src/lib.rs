pub mod orchestrator;
pub mod providers;
pub mod supervisor;

pub use orchestrator::{BatchOrchestrator, StartBatchError};
pub use providers::{StubFlightProvider, StubHotelProvider};
pub use supervisor::{PurgeOutcome, RetryOutcome, RetrySupervisor};
