//! Thread aggregation: grouping related emails and ranking the threads
//! worth a closer look.

pub mod grouper;
pub mod scorer;

pub use grouper::{group, normalize_subject};
pub use scorer::{ThreadScorer, DEFAULT_MAX_THREADS};
