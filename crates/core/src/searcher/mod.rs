//! Aggregated torrent search.
//!
//! A keyword is fanned out to every collection of the document store. Hits
//! are deduplicated per collection, normalized into a uniform schema,
//! merged newest first, cached, and served one page at a time.

mod classify;
mod dedup;
mod fanout;
mod merge;
mod normalize;
mod paginate;
mod service;
mod types;

pub use classify::Classifier;
pub use dedup::{deduplicate_documents, natural_key, NaturalKey};
pub use fanout::FanOut;
pub use merge::merge_and_sort;
pub use normalize::Normalizer;
pub use paginate::{paginate, parse_page};
pub use service::SearchService;
pub use types::*;
