//! Mock implementations for testing.
//!
//! These back the integration suites in `tests/` and the in-module unit
//! tests; none of them touch the network.

mod mock_broker;
mod mock_extractor;
mod mock_sink;

pub use mock_broker::MockBroker;
pub use mock_extractor::MockExtractor;
pub use mock_sink::{DeliveryMethod, MockSink, RecordedDelivery};
