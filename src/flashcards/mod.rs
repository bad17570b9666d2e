//! Flashcards and spaced repetition review for studycards
//!
//! This module provides:
//! - Card, subject and course models
//! - SM-2 style review scheduling (due selection and grading)
//! - Card filtering and review statistics
//! - File-backed storage per workspace

pub mod algorithm;
pub mod filter;
pub mod models;
pub mod storage;

pub use algorithm::{grade_review, select_due, SchedulerError};
pub use models::*;
pub use storage::{FlashcardStorage, FlashcardStorageError, SubjectRemoval};
