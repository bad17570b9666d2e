//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::SchedulerError;

/// Ease factor given to freshly created cards
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval (days) given to freshly created cards
pub const INITIAL_INTERVAL_DAYS: u32 = 0;

/// A flashcard with its question, answer and scheduling fields.
///
/// The scheduling fields are optional on disk so that a record written without them
/// can still be loaded and reported; the scheduler refuses such a card with
/// [`SchedulerError::InvalidCard`] rather than filling in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub subject: String,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Create a card with default scheduling state, due immediately
    pub fn new(
        workspace_id: Uuid,
        subject: String,
        question: String,
        answer: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            subject,
            question,
            answer,
            next_review: Some(now),
            interval_days: Some(INITIAL_INTERVAL_DAYS),
            ease_factor: Some(DEFAULT_EASE_FACTOR),
            repetitions: Some(0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Extract the validated scheduling state of this card
    pub fn schedule(&self) -> Result<Schedule, SchedulerError> {
        let mut missing = Vec::new();
        if self.next_review.is_none() {
            missing.push("nextReview");
        }
        if self.interval_days.is_none() {
            missing.push("intervalDays");
        }
        if self.repetitions.is_none() {
            missing.push("repetitions");
        }
        match self.ease_factor {
            None => missing.push("easeFactor"),
            Some(ef) if !ef.is_finite() || ef <= 0.0 => missing.push("easeFactor"),
            Some(_) => {}
        }

        match (self.next_review, self.interval_days, self.ease_factor, self.repetitions) {
            (Some(next_review), Some(interval_days), Some(ease_factor), Some(repetitions))
                if missing.is_empty() =>
            {
                Ok(Schedule {
                    next_review,
                    interval_days,
                    ease_factor,
                    repetitions,
                })
            }
            _ => Err(SchedulerError::InvalidCard {
                card_id: self.id,
                missing: missing.join(", "),
            }),
        }
    }

    /// Return a copy of this card carrying the given scheduling state
    pub fn with_schedule(&self, schedule: Schedule, now: DateTime<Utc>) -> Self {
        Self {
            next_review: Some(schedule.next_review),
            interval_days: Some(schedule.interval_days),
            ease_factor: Some(schedule.ease_factor),
            repetitions: Some(schedule.repetitions),
            updated_at: now,
            ..self.clone()
        }
    }

    /// Where the card sits in the learning process, if it can be scheduled
    pub fn phase(&self) -> Option<Phase> {
        self.repetitions.map(Phase::from_repetitions)
    }
}

/// The complete scheduling state of a card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// When the card is next due
    pub next_review: DateTime<Utc>,
    /// Current interval in days
    pub interval_days: u32,
    /// SM-2 ease factor (default 2.5)
    pub ease_factor: f64,
    /// Consecutive successful reviews
    pub repetitions: u32,
}

/// Input for creating a card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub subject: String,
    pub question: String,
    pub answer: String,
}

/// Fields of a card that can be changed by a direct edit.
///
/// Scheduling fields are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// The reviewer's self-assessment of recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grade {
    /// Failed to recall
    Again,
    /// Recalled with serious difficulty
    Hard,
    /// Recalled after some hesitation
    Good,
    /// Recalled effortlessly
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn is_success(self) -> bool {
        !matches!(self, Grade::Again)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = SchedulerError;

    /// Accepts grade names (any case) or the 1-4 button ratings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Grade::Again),
            "hard" | "2" => Ok(Grade::Hard),
            "good" | "3" => Ok(Grade::Good),
            "easy" | "4" => Ok(Grade::Easy),
            _ => Err(SchedulerError::InvalidGrade(s.to_string())),
        }
    }
}

impl TryFrom<i32> for Grade {
    type Error = SchedulerError;

    /// Map a UI rating (1-4: Again, Hard, Good, Easy) to a grade
    fn try_from(rating: i32) -> Result<Self, Self::Error> {
        match rating {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            other => Err(SchedulerError::InvalidGrade(other.to_string())),
        }
    }
}

/// Status of a card in the spaced repetition process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Never successfully reviewed, or just failed
    New,
    /// One or two consecutive successes
    Learning,
    /// Three or more consecutive successes
    Review,
}

impl Phase {
    pub fn from_repetitions(repetitions: u32) -> Self {
        match repetitions {
            0 => Phase::New,
            1 | 2 => Phase::Learning,
            _ => Phase::Review,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::New => "new",
            Phase::Learning => "learning",
            Phase::Review => "review",
        };
        f.write_str(s)
    }
}

/// A named group of cards and courses within a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(workspace_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            name,
            created_at: Utc::now(),
        }
    }
}

/// Study material attached to a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub subject: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(workspace_id: Uuid, subject: String, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            subject,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Statistics for a workspace or a single subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub subjects: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_card_has_default_schedule() {
        let now = Utc::now();
        let card = Card::new(Uuid::new_v4(), "Math".into(), "2+2".into(), "4".into(), now);
        let schedule = card.schedule().unwrap();

        assert_eq!(schedule.repetitions, 0);
        assert_eq!(schedule.interval_days, INITIAL_INTERVAL_DAYS);
        assert_eq!(schedule.ease_factor, DEFAULT_EASE_FACTOR);
        assert_eq!(schedule.next_review, now);
        assert_eq!(card.phase(), Some(Phase::New));
    }

    #[test]
    fn test_schedule_reports_missing_fields() {
        let mut card = Card::new(Uuid::new_v4(), "Math".into(), "q".into(), "a".into(), Utc::now());
        card.next_review = None;
        card.ease_factor = None;

        match card.schedule() {
            Err(SchedulerError::InvalidCard { card_id, missing }) => {
                assert_eq!(card_id, card.id);
                assert_eq!(missing, "nextReview, easeFactor");
            }
            other => panic!("expected InvalidCard, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_ease_factor_is_invalid() {
        let mut card = Card::new(Uuid::new_v4(), "Math".into(), "q".into(), "a".into(), Utc::now());
        card.ease_factor = Some(f64::NAN);
        assert!(matches!(card.schedule(), Err(SchedulerError::InvalidCard { .. })));
    }

    #[test]
    fn test_card_without_schedule_deserializes() {
        let json = r#"{
            "id": "7b0c6a5e-0f7a-4a53-9b5e-2a8f3c1d9e10",
            "workspaceId": "00000000-0000-0000-0000-000000000000",
            "subject": "History",
            "question": "1066?",
            "answer": "Hastings",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.next_review.is_none());
        assert!(card.schedule().is_err());
    }

    #[test]
    fn test_grade_parsing() {
        assert_eq!("GOOD".parse::<Grade>().unwrap(), Grade::Good);
        assert_eq!(" easy ".parse::<Grade>().unwrap(), Grade::Easy);
        assert_eq!("1".parse::<Grade>().unwrap(), Grade::Again);
        assert_eq!(Grade::try_from(2).unwrap(), Grade::Hard);

        match "MAYBE".parse::<Grade>() {
            Err(SchedulerError::InvalidGrade(g)) => assert_eq!(g, "MAYBE"),
            other => panic!("expected InvalidGrade, got {:?}", other),
        }
        assert!(Grade::try_from(0).is_err());
        assert!(Grade::try_from(5).is_err());
    }

    #[test]
    fn test_phase_from_repetitions() {
        assert_eq!(Phase::from_repetitions(0), Phase::New);
        assert_eq!(Phase::from_repetitions(1), Phase::Learning);
        assert_eq!(Phase::from_repetitions(2), Phase::Learning);
        assert_eq!(Phase::from_repetitions(3), Phase::Review);
        assert_eq!(Phase::from_repetitions(40), Phase::Review);
    }
}
