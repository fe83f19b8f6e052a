//! Error taxonomy for the pipeline.
//!
//! Failures have a well-defined blast radius: `Config` aborts startup,
//! `Transform` and `Publish` abandon one entry, `Storage` aborts one cycle.
//! Feed and image fetch failures never surface as errors at all — the
//! adapters degrade to an empty entry list / `None` bytes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid startup configuration. Fatal; reported once and
    /// the process exits.
    #[error("config error: {0}")]
    Config(String),

    /// The completion service was unreachable or returned a body without
    /// the expected completion field.
    #[error("transform failed: {0}")]
    Transform(String),

    /// The messaging API rejected the send (transport or API-level).
    #[error("publish failed: {0}")]
    Publish(String),

    /// Ledger read/write failure. Aborts the current cycle; the loop
    /// retries on the next interval.
    #[error("ledger storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
