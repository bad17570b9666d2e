//! studycards: flashcards with spaced repetition review.

pub mod config;
pub mod flashcards;
