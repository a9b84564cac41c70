pub mod aggregator;
pub mod composer;

pub use aggregator::LiveSearchAggregator;
pub use composer::{ComposeError, PackageComposer};
