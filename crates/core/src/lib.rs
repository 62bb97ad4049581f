pub mod cache;
pub mod config;
pub mod metrics;
pub mod searcher;
pub mod store;
pub mod testing;

pub use cache::{normalize_keyword, Clock, ResultCache, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, ClassificationConfig, Config, ConfigError,
    SearchConfig, ServerConfig, StoreConfig,
};
pub use searcher::{NormalizedTorrent, SearchError, SearchPage, SearchService};
pub use store::{DocumentStore, RawDocument, SqliteDocumentStore, StoreError};
