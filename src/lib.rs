// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod ledger;
pub mod pipeline;
pub mod publish;
pub mod scheduler;
pub mod transform;

// ---- Re-exports for stable public API ----
pub use crate::error::Error;
pub use crate::feed::{extract_image, FeedEntry, FeedSource, HttpFeedSource};
pub use crate::filter::Eligibility;
pub use crate::ledger::Ledger;
pub use crate::pipeline::{CycleStats, Outcome, Pipeline};
pub use crate::publish::{Publisher, TelegramPublisher};
pub use crate::transform::{TogetherRewriter, Transformer};
