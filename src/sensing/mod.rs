pub mod adapter;
pub mod controller;
pub mod loop_worker;
pub mod sources;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::AdapterState;
pub use controller::SensingController;
pub use sources::{
    BoxFuture, DaylightProvider, FailureReason, ProviderFailure, ReadingSink, ReadingSource,
    SensorEvent, SensorSources, SourceKind,
};
