// src/pipeline.rs
//! Per-cycle orchestration: duplicate check → eligibility → rewrite →
//! image fetch → publish → record, sequential per feed and per entry.
//!
//! Transform and publish failures abandon the entry and the cycle moves
//! on; only a ledger storage failure aborts the cycle. A link is recorded
//! if and only if its publish succeeded, so a failed entry is retried on
//! later cycles while it stays within the cap and the recency window.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::feed::{extract_image, FeedEntry, FeedSource};
use crate::filter::Eligibility;
use crate::ledger::Ledger;
use crate::publish::Publisher;
use crate::transform::Transformer;

/// What happened to a single entry within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Published,
    DuplicateLink,
    Ineligible,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub published: usize,
    pub duplicates: usize,
    pub ineligible: usize,
    pub failed: usize,
}

/// Context object built once at startup and handed to the poll loop.
pub struct Pipeline {
    feeds: Vec<String>,
    source: Box<dyn FeedSource>,
    gate: Eligibility,
    transformer: Box<dyn Transformer>,
    publisher: Box<dyn Publisher>,
    ledger: Ledger,
}

impl Pipeline {
    pub fn new(
        feeds: Vec<String>,
        source: Box<dyn FeedSource>,
        gate: Eligibility,
        transformer: Box<dyn Transformer>,
        publisher: Box<dyn Publisher>,
        ledger: Ledger,
    ) -> Self {
        Self {
            feeds,
            source,
            gate,
            transformer,
            publisher,
            ledger,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn publisher(&self) -> &dyn Publisher {
        self.publisher.as_ref()
    }

    /// One full pass over all configured feeds.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleStats> {
        let mut stats = CycleStats::default();
        let feeds = self.feeds.clone();

        for feed_url in &feeds {
            let entries = self.source.fetch(feed_url).await;
            info!(feed = %feed_url, entries = entries.len(), "feed fetched");

            for entry in &entries {
                match self.process_entry(entry, now).await {
                    Ok(Outcome::Published) => {
                        info!(link = %entry.link, "published");
                        stats.published += 1;
                    }
                    Ok(Outcome::DuplicateLink) => stats.duplicates += 1,
                    Ok(Outcome::Ineligible) => stats.ineligible += 1,
                    Err(e @ Error::Storage(_)) => return Err(e),
                    Err(e) => {
                        error!(link = %entry.link, error = %e, "entry abandoned");
                        stats.failed += 1;
                    }
                }
            }
        }

        info!(
            published = stats.published,
            duplicates = stats.duplicates,
            ineligible = stats.ineligible,
            failed = stats.failed,
            "cycle finished"
        );
        Ok(stats)
    }

    async fn process_entry(&mut self, entry: &FeedEntry, now: DateTime<Utc>) -> Result<Outcome> {
        if self.ledger.contains(&entry.link) {
            return Ok(Outcome::DuplicateLink);
        }
        if !self.gate.is_eligible(entry, now) {
            return Ok(Outcome::Ineligible);
        }

        let body = self.transformer.rewrite(&entry.clean_summary()).await?;

        let image = match extract_image(entry) {
            Some(url) => self.transformer.fetch_image_bytes(&url).await,
            None => None,
        };

        self.publisher.publish(&body, image.as_deref()).await?;

        // Durability point: the link is on disk before we report success.
        self.ledger.record(&entry.link)?;
        Ok(Outcome::Published)
    }
}
