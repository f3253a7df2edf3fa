//! Email classification: sender trust, content signal, and the combined
//! item filter that decides what enters a plan.

pub mod content;
pub mod filter;
pub mod keywords;
pub mod sender;

pub use content::{ContentClassifier, ContentRules};
pub use filter::{FilterOutcome, ItemFilter};
pub use sender::{SenderClassifier, SenderRules};
