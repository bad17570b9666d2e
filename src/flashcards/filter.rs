//! Card filtering and collection statistics

use chrono::{DateTime, Utc};

use super::algorithm::select_due;
use super::models::{Card, Phase, ReviewStats};

/// Subject filter value meaning "every subject"
pub const ALL_SUBJECTS: &str = "all";

/// Filter cards by subject and a free-text search term.
///
/// A subject of `None` or `"all"` matches every card. The term is trimmed and matched
/// case-insensitively against question and answer; an empty term matches everything.
pub fn filter_cards<'a>(cards: &'a [Card], subject: Option<&str>, term: Option<&str>) -> Vec<&'a Card> {
    let subject = subject.filter(|s| *s != ALL_SUBJECTS);
    let term = term
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    cards
        .iter()
        .filter(|card| subject.map_or(true, |s| card.subject == s))
        .filter(|card| match &term {
            None => true,
            Some(term) => {
                card.question.to_lowercase().contains(term.as_str())
                    || card.answer.to_lowercase().contains(term.as_str())
            }
        })
        .collect()
}

/// Compute review statistics over a set of cards
pub fn compute_stats(cards: &[Card], subject_count: usize, now: DateTime<Utc>) -> ReviewStats {
    let mut stats = ReviewStats {
        total_cards: cards.len(),
        due_cards: select_due(cards, now).len(),
        subjects: subject_count,
        ..Default::default()
    };

    for card in cards {
        match card.phase() {
            Some(Phase::New) => stats.new_cards += 1,
            Some(Phase::Learning) => stats.learning_cards += 1,
            Some(Phase::Review) => stats.review_cards += 1,
            None => {}
        }
    }

    stats
}
