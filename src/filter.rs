// src/filter.rs
//! Eligibility gate: recency window + place-name topicality.
//!
//! Both checks are cheap and run before the paid transform step, which
//! bounds calls to the completion API.

use chrono::{DateTime, Duration, Utc};

use crate::feed::FeedEntry;

#[derive(Debug, Clone)]
pub struct Eligibility {
    keywords: Vec<String>,
    window: Duration,
}

impl Eligibility {
    /// `keywords` must already be lowercase (config guarantees this).
    pub fn new(keywords: Vec<String>, window: Duration) -> Self {
        Self { keywords, window }
    }

    /// An entry published exactly at `now - window` is still eligible;
    /// one second older is not. Entries without a timestamp pass recency.
    pub fn is_recent(&self, entry: &FeedEntry, now: DateTime<Utc>) -> bool {
        match entry.published {
            Some(published) => published >= now - self.window,
            None => true,
        }
    }

    /// Case-folded substring match against the keyword allow-list, run on
    /// the cleaned summary text.
    pub fn is_relevant(&self, entry: &FeedEntry) -> bool {
        let text = entry.clean_summary().to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn is_eligible(&self, entry: &FeedEntry, now: DateTime<Utc>) -> bool {
        self.is_recent(entry, now) && self.is_relevant(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(summary: &str, published: Option<DateTime<Utc>>) -> FeedEntry {
        FeedEntry {
            link: "https://x/1".into(),
            title: String::new(),
            summary: summary.into(),
            published,
            media_urls: Vec::new(),
            enclosures: Vec::new(),
        }
    }

    fn gate() -> Eligibility {
        Eligibility::new(
            vec!["алматы".into(), "астана".into()],
            Duration::hours(24),
        )
    }

    #[test]
    fn boundary_is_inclusive() {
        let g = gate();
        let now = Utc::now();
        let at_boundary = entry("В Алматы", Some(now - Duration::hours(24)));
        let just_past = entry(
            "В Алматы",
            Some(now - Duration::hours(24) - Duration::seconds(1)),
        );
        assert!(g.is_eligible(&at_boundary, now));
        assert!(!g.is_eligible(&just_past, now));
    }

    #[test]
    fn missing_timestamp_passes_recency() {
        let g = gate();
        assert!(g.is_eligible(&entry("Астана: сильный снегопад", None), Utc::now()));
    }

    // Substring matching sees no stem: "Астане" does not contain
    // "астана". The allow-list has to carry the forms it wants matched.
    #[test]
    fn declined_place_name_does_not_match_nominative_keyword() {
        let g = gate();
        assert!(!g.is_relevant(&entry("Снегопад в Астане", None)));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let g = gate();
        assert!(g.is_relevant(&entry("АЛМАТЫ встречает гостей", None)));
        assert!(g.is_relevant(&entry("новости Астаны... Астана!", None)));
    }

    #[test]
    fn no_keyword_no_pass() {
        let g = gate();
        assert!(!g.is_eligible(&entry("Выборы в соседней стране", None), Utc::now()));
    }

    #[test]
    fn keyword_inside_markup_text_counts() {
        let g = gate();
        // clean_summary strips the tags before matching
        assert!(g.is_relevant(&entry("<p>Пробки в <b>Алматы</b></p>", None)));
    }
}
