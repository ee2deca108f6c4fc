pub mod config;
pub mod delivery;
pub mod extractor;
pub mod fetcher;
pub mod proxy;
pub mod queue;
pub mod relay;
pub mod testing;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, BotConfig, Config,
    ConfigError, SanitizedConfig, ServerConfig,
};
pub use delivery::{Chat, DeliveryError, DeliverySink, Message, TelegramClient, Update};
pub use extractor::{
    ExtractionJob, ExtractionResult, Extractor, ExtractorConfig, ExtractorError, TransformKind,
    YtdlpExtractor,
};
pub use fetcher::{Fetcher, FetcherConfig, RetrievalError, RetrievalRequest, RetryConfig};
pub use proxy::{
    BrokerError, CandidateStream, DiscoveryRequest, HttpBroker, ProxyCandidate, ProxyConfig,
    ProxyProtocol, ProxyResolver, ProxyState,
};
pub use queue::{Artifact, ArtifactQueue, QueueError, FILE_PREFIX, FINISHED_MARKER};
pub use relay::{RelayConfig, RelayScheduler};
