//! SM-2 style spaced repetition scheduling
//!
//! Decides which cards are due and how a graded review reschedules a card.
//!
//! Grades:
//! - Again: failed to recall; the card starts over with a one day interval
//! - Hard: recalled with difficulty; ease factor drops by 0.15
//! - Good: recalled; ease factor unchanged
//! - Easy: recalled effortlessly; ease factor grows by 0.15
//!
//! Successful reviews step the interval through 1 day, 6 days, and from then on
//! multiply the previous interval by the (adjusted) ease factor.
//!
//! Everything here is a pure function of its inputs, the clock included.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Card, Grade, Phase, Schedule};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor penalty for a failed review
const AGAIN_EASE_PENALTY: f64 = 0.2;

/// Ease factor step for hard and easy reviews
const EASE_STEP: f64 = 0.15;

/// Longest interval a card can be given (about a century)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("Invalid grade: {0:?} (expected again, hard, good or easy)")]
    InvalidGrade(String),

    #[error("Card {card_id} has missing or invalid scheduling fields: {missing}")]
    InvalidCard { card_id: Uuid, missing: String },
}

/// Select the cards that are due at `now`, preserving input order
pub fn select_due<'a, I>(cards: I, now: DateTime<Utc>) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    cards
        .into_iter()
        .filter(|card| card.next_review.is_some_and(|due| due <= now))
        .collect()
}

/// Calculate the next scheduling state for a schedule and grade
pub fn next_schedule(schedule: &Schedule, grade: Grade, now: DateTime<Utc>) -> Schedule {
    let (repetitions, interval_days, ease_factor) = if !grade.is_success() {
        let ease_factor = clamp_ease(schedule.ease_factor - AGAIN_EASE_PENALTY);
        (0, 1, ease_factor)
    } else {
        let ease_factor = match grade {
            Grade::Hard => clamp_ease(schedule.ease_factor - EASE_STEP),
            Grade::Easy => clamp_ease(schedule.ease_factor + EASE_STEP),
            // Good keeps the ease as stored, only lifted to the floor
            _ => schedule.ease_factor.max(MIN_EASE_FACTOR),
        };

        let repetitions = schedule.repetitions.saturating_add(1);
        let interval_days = match repetitions {
            1 => 1,
            2 => 6,
            _ => {
                let grown = (f64::from(schedule.interval_days) * ease_factor).round();
                // An interval that rounds to zero would leave the card due forever
                (grown.min(f64::from(MAX_INTERVAL_DAYS)) as u32).max(1)
            }
        };
        (repetitions, interval_days, ease_factor)
    };

    Schedule {
        next_review: now + Duration::days(i64::from(interval_days)),
        interval_days,
        ease_factor,
        repetitions,
    }
}

/// Grade a review of `card` at `now`, returning the rescheduled card.
///
/// Identity and content fields are carried over unchanged; `updated_at` becomes `now`.
/// The input card is never modified.
pub fn grade_review(card: &Card, grade: Grade, now: DateTime<Utc>) -> Result<Card, SchedulerError> {
    let schedule = card.schedule()?;
    let next = next_schedule(&schedule, grade, now);

    log::debug!(
        "Card {} graded {}: reps {} -> {}, interval {}d -> {}d, ease {:.2} -> {:.2}",
        card.id,
        grade,
        schedule.repetitions,
        next.repetitions,
        schedule.interval_days,
        next.interval_days,
        schedule.ease_factor,
        next.ease_factor,
    );

    Ok(card.with_schedule(next, now))
}

/// Parse a grade and apply it, rejecting unknown grades before touching the card
pub fn grade_review_str(card: &Card, grade: &str, now: DateTime<Utc>) -> Result<Card, SchedulerError> {
    let grade: Grade = grade.parse()?;
    grade_review(card, grade, now)
}

/// Phase a card is in after `repetitions` consecutive successes
pub fn phase_of(repetitions: u32) -> Phase {
    Phase::from_repetitions(repetitions)
}

/// Calculate the interval each grade would produce.
/// Used to show users what each button would do.
///
/// Returns intervals for: Again, Hard, Good, Easy
pub fn preview_intervals(card: &Card, now: DateTime<Utc>) -> Result<[u32; 4], SchedulerError> {
    let schedule = card.schedule()?;
    Ok(Grade::ALL.map(|grade| next_schedule(&schedule, grade, now).interval_days))
}

/// Floor the ease factor and round it to two decimals
fn clamp_ease(ease_factor: f64) -> f64 {
    let rounded = (ease_factor * 100.0).round() / 100.0;
    rounded.max(MIN_EASE_FACTOR)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    fn card_with(repetitions: u32, interval_days: u32, ease_factor: f64) -> Card {
        let mut card = Card::new(Uuid::new_v4(), "Math".into(), "q".into(), "a".into(), t0());
        card.repetitions = Some(repetitions);
        card.interval_days = Some(interval_days);
        card.ease_factor = Some(ease_factor);
        card
    }

    #[test]
    fn test_first_review_good() {
        let card = card_with(0, 0, 2.5);
        let result = grade_review(&card, Grade::Good, t0()).unwrap();

        assert_eq!(result.repetitions, Some(1));
        assert_eq!(result.interval_days, Some(1));
        assert_eq!(result.ease_factor, Some(2.5));
        assert_eq!(result.next_review, Some(t0() + Duration::days(1)));
        assert_eq!(result.phase(), Some(Phase::Learning));
    }

    #[test]
    fn test_second_review_good() {
        let card = card_with(1, 1, 2.5);
        let result = grade_review(&card, Grade::Good, t0()).unwrap();

        assert_eq!(result.repetitions, Some(2));
        assert_eq!(result.interval_days, Some(6));
        assert_eq!(result.next_review, Some(t0() + Duration::days(6)));
    }

    #[test]
    fn test_subsequent_review_multiplies_interval() {
        let card = card_with(2, 6, 2.5);
        let result = grade_review(&card, Grade::Good, t0()).unwrap();

        // 6 * 2.5 = 15
        assert_eq!(result.interval_days, Some(15));
        assert_eq!(result.repetitions, Some(3));
        assert_eq!(result.phase(), Some(Phase::Review));
    }

    #[test]
    fn test_subsequent_interval_uses_adjusted_ease() {
        let card = card_with(4, 20, 2.5);

        let easy = grade_review(&card, Grade::Easy, t0()).unwrap();
        assert_eq!(easy.ease_factor, Some(2.65));
        // 20 * 2.65 = 53
        assert_eq!(easy.interval_days, Some(53));

        let hard = grade_review(&card, Grade::Hard, t0()).unwrap();
        assert_eq!(hard.ease_factor, Some(2.35));
        // 20 * 2.35 = 47
        assert_eq!(hard.interval_days, Some(47));
    }

    #[test]
    fn test_good_keeps_ease_unrounded() {
        let card = card_with(4, 10, 2.456);
        let result = grade_review(&card, Grade::Good, t0()).unwrap();

        assert_eq!(result.ease_factor, Some(2.456));
        // 10 * 2.456 = 24.56 -> 25
        assert_eq!(result.interval_days, Some(25));
    }

    #[test]
    fn test_again_resets() {
        let card = card_with(3, 6, 2.5);
        let result = grade_review(&card, Grade::Again, t0()).unwrap();

        assert_eq!(result.repetitions, Some(0));
        assert_eq!(result.interval_days, Some(1));
        assert_eq!(result.ease_factor, Some(2.3));
        assert_eq!(result.next_review, Some(t0() + Duration::days(1)));
        assert_eq!(result.phase(), Some(Phase::New));
    }

    #[test]
    fn test_again_resets_from_any_state() {
        for (reps, interval, ease) in [(0, 0, 2.5), (1, 1, 1.3), (2, 6, 3.0), (12, 400, 2.1)] {
            let result = grade_review(&card_with(reps, interval, ease), Grade::Again, t0()).unwrap();
            assert_eq!(result.repetitions, Some(0));
            assert_eq!(result.interval_days, Some(1));
        }
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut card = card_with(5, 10, 1.4);

        // Repeated failures and hard reviews must not go below the floor
        for grade in [Grade::Again, Grade::Hard, Grade::Again, Grade::Hard, Grade::Hard] {
            card = grade_review(&card, grade, t0()).unwrap();
            assert!(card.ease_factor.unwrap() >= MIN_EASE_FACTOR);
        }
        assert_eq!(card.ease_factor, Some(MIN_EASE_FACTOR));

        // An ease factor stored below the floor is lifted even on a good review
        let low = card_with(5, 10, 1.1);
        let result = grade_review(&low, Grade::Good, t0()).unwrap();
        assert_eq!(result.ease_factor, Some(MIN_EASE_FACTOR));
    }

    #[test]
    fn test_grading_is_deterministic() {
        let card = card_with(4, 9, 2.2);
        for grade in Grade::ALL {
            let a = grade_review(&card, grade, t0()).unwrap();
            let b = grade_review(&card, grade, t0()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_content_fields_unchanged() {
        let card = card_with(2, 6, 2.5);
        let result = grade_review(&card, Grade::Easy, t0() + Duration::hours(3)).unwrap();

        assert_eq!(result.id, card.id);
        assert_eq!(result.workspace_id, card.workspace_id);
        assert_eq!(result.subject, card.subject);
        assert_eq!(result.question, card.question);
        assert_eq!(result.answer, card.answer);
        assert_eq!(result.created_at, card.created_at);
        assert_eq!(result.updated_at, t0() + Duration::hours(3));
    }

    #[test]
    fn test_invalid_grade_leaves_card_unchanged() {
        let card = card_with(3, 6, 2.5);
        let before = card.clone();

        let err = grade_review_str(&card, "MAYBE", t0()).unwrap_err();
        assert_eq!(err, SchedulerError::InvalidGrade("MAYBE".to_string()));
        assert_eq!(card, before);
    }

    #[test]
    fn test_missing_schedule_is_invalid_card() {
        let mut card = card_with(1, 1, 2.5);
        card.repetitions = None;

        let err = grade_review(&card, Grade::Good, t0()).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidCard { .. }));
    }

    #[test]
    fn test_select_due_boundary_and_order() {
        let now = t0();
        let mut past = card_with(0, 0, 2.5);
        past.next_review = Some(now - Duration::days(2));
        let mut exact = card_with(0, 0, 2.5);
        exact.next_review = Some(now);
        let mut future = card_with(0, 0, 2.5);
        future.next_review = Some(now + Duration::seconds(1));
        let mut unscheduled = card_with(0, 0, 2.5);
        unscheduled.next_review = None;

        let cards = vec![exact.clone(), future, unscheduled, past.clone()];
        let due = select_due(&cards, now);

        let ids: Vec<Uuid> = due.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![exact.id, past.id]);
    }

    #[test]
    fn test_select_due_empty() {
        let cards: Vec<Card> = Vec::new();
        assert!(select_due(&cards, t0()).is_empty());
    }

    #[test]
    fn test_preview_intervals() {
        let card = card_with(2, 6, 2.5);
        let preview = preview_intervals(&card, t0()).unwrap();
        // Again, Hard (6 * 2.35), Good (6 * 2.5), Easy (6 * 2.65)
        assert_eq!(preview, [1, 14, 15, 16]);
    }

    #[test]
    fn test_phase_of() {
        assert_eq!(phase_of(0), Phase::New);
        assert_eq!(phase_of(2), Phase::Learning);
        assert_eq!(phase_of(3), Phase::Review);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
