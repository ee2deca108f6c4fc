//! Proxy module: outbound proxy discovery and the single-slot resolver.
//!
//! Discovery is a lazy stream of candidates for a country filter; the
//! resolver consumes it in the background and keeps only the most recent
//! match. Readers never wait — they take whatever the slot currently
//! holds, possibly nothing.

mod broker;
mod config;
mod resolver;
mod types;

pub use broker::{BrokerError, CandidateStream, HttpBroker};
pub use config::ProxyConfig;
pub use resolver::ProxyResolver;
pub use types::{DiscoveryRequest, ProxyCandidate, ProxyProtocol, ProxyState};
