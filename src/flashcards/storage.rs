//! Storage operations for flashcards
//!
//! Directory structure per workspace:
//! ```text
//! workspaces/{workspace-id}/
//! ├── subjects.json        # Array of all subjects
//! ├── courses.json         # Array of all courses
//! └── cards/
//!     └── {card-id}.json   # Individual card files
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::algorithm::{grade_review, select_due, SchedulerError};
use super::filter::{compute_stats, ALL_SUBJECTS};
use super::models::*;

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Subject already exists: {0}")]
    SubjectExists(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Card lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

/// What happens to the cards and courses of a deleted subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectRemoval {
    /// Delete them along with the subject
    DeleteCards,
    /// Move them to the named subject
    Reassign(String),
}

/// Storage manager for flashcard operations
pub struct FlashcardStorage {
    /// Base data directory (e.g., ~/.local/share/studycards)
    data_dir: PathBuf,
    /// One lock per card id, serialising read-modify-write cycles and deletes.
    /// Entries are never removed, so every caller for an id shares one mutex.
    card_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl FlashcardStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            card_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the directory for a workspace
    fn workspace_dir(&self, workspace_id: Uuid) -> PathBuf {
        self.data_dir
            .join("workspaces")
            .join(workspace_id.to_string())
    }

    /// Get the cards directory for a workspace
    fn cards_dir(&self, workspace_id: Uuid) -> PathBuf {
        self.workspace_dir(workspace_id).join("cards")
    }

    fn subjects_path(&self, workspace_id: Uuid) -> PathBuf {
        self.workspace_dir(workspace_id).join("subjects.json")
    }

    fn courses_path(&self, workspace_id: Uuid) -> PathBuf {
        self.workspace_dir(workspace_id).join("courses.json")
    }

    /// Get the path for a specific card
    fn card_path(&self, workspace_id: Uuid, card_id: Uuid) -> PathBuf {
        self.cards_dir(workspace_id)
            .join(format!("{}.json", card_id))
    }

    /// Initialize storage for a workspace
    pub fn init(&self, workspace_id: Uuid) -> Result<()> {
        fs::create_dir_all(self.cards_dir(workspace_id))?;

        let subjects_path = self.subjects_path(workspace_id);
        if !subjects_path.exists() {
            let empty: Vec<Subject> = Vec::new();
            fs::write(&subjects_path, serde_json::to_string_pretty(&empty)?)?;
        }

        let courses_path = self.courses_path(workspace_id);
        if !courses_path.exists() {
            let empty: Vec<Course> = Vec::new();
            fs::write(&courses_path, serde_json::to_string_pretty(&empty)?)?;
        }

        Ok(())
    }

    // ==================== Card Operations ====================

    /// Get a specific card
    pub fn get_card(&self, workspace_id: Uuid, card_id: Uuid) -> Result<Card> {
        let card_path = self.card_path(workspace_id, card_id);
        if !card_path.exists() {
            return Err(FlashcardStorageError::CardNotFound(card_id));
        }

        let content = fs::read_to_string(&card_path)?;
        let card: Card = serde_json::from_str(&content)?;
        Ok(card)
    }

    /// Insert or replace a card
    pub fn put_card(&self, card: &Card) -> Result<()> {
        fs::create_dir_all(self.cards_dir(card.workspace_id))?;
        let card_path = self.card_path(card.workspace_id, card.id);
        fs::write(&card_path, serde_json::to_string_pretty(card)?)?;
        Ok(())
    }

    /// List the cards of a workspace matching a predicate, oldest first.
    ///
    /// Unreadable card files are skipped with a warning rather than failing the query.
    pub fn query_cards<F>(&self, workspace_id: Uuid, predicate: F) -> Result<Vec<Card>>
    where
        F: Fn(&Card) -> bool,
    {
        let cards_dir = self.cards_dir(workspace_id);
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        log::warn!("Skipping unreadable card file {:?}: {}", path, e);
                        continue;
                    }
                };
                match serde_json::from_str::<Card>(&content) {
                    Ok(card) if predicate(&card) => cards.push(card),
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable card file {:?}: {}", path, e),
                }
            }
        }

        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(cards)
    }

    /// List all cards in a workspace
    pub fn list_cards(&self, workspace_id: Uuid) -> Result<Vec<Card>> {
        self.query_cards(workspace_id, |_| true)
    }

    /// List the cards of one subject
    pub fn list_cards_by_subject(&self, workspace_id: Uuid, subject: &str) -> Result<Vec<Card>> {
        self.query_cards(workspace_id, |card| card.subject == subject)
    }

    /// Create a new card with default scheduling state, due immediately
    pub fn create_card(&self, workspace_id: Uuid, new_card: NewCard) -> Result<Card> {
        self.init(workspace_id)?;

        let subject = validate_name(&new_card.subject)?;
        self.require_subject(workspace_id, &subject)?;

        let card = Card::new(
            workspace_id,
            subject,
            new_card.question,
            new_card.answer,
            Utc::now(),
        );
        self.put_card(&card)?;

        log::info!("Created card {} in subject {}", card.id, card.subject);
        Ok(card)
    }

    /// Edit the question, answer or subject of a card.
    ///
    /// Scheduling fields are left untouched.
    pub fn edit_card(&self, workspace_id: Uuid, card_id: Uuid, edit: CardEdit) -> Result<Card> {
        let lock = self.card_lock(card_id)?;
        let _guard = lock.lock().map_err(|_| FlashcardStorageError::LockPoisoned)?;

        let mut card = self.get_card(workspace_id, card_id)?;
        if let Some(subject) = edit.subject {
            let subject = validate_name(&subject)?;
            self.require_subject(workspace_id, &subject)?;
            card.subject = subject;
        }
        if let Some(question) = edit.question {
            card.question = question;
        }
        if let Some(answer) = edit.answer {
            card.answer = answer;
        }
        card.updated_at = Utc::now();

        self.put_card(&card)?;
        Ok(card)
    }

    /// Delete a card
    pub fn delete_card(&self, workspace_id: Uuid, card_id: Uuid) -> Result<()> {
        let lock = self.card_lock(card_id)?;
        let _guard = lock.lock().map_err(|_| FlashcardStorageError::LockPoisoned)?;

        let card_path = self.card_path(workspace_id, card_id);
        if !card_path.exists() {
            return Err(FlashcardStorageError::CardNotFound(card_id));
        }
        fs::remove_file(&card_path)?;

        log::info!("Deleted card {}", card_id);
        Ok(())
    }

    // ==================== Review Operations ====================

    /// Get all due cards, optionally restricted to one subject, oldest due first
    pub fn due_cards(
        &self,
        workspace_id: Uuid,
        subject: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>> {
        let cards = self.cards_for(workspace_id, subject)?;

        for card in cards.iter().filter(|c| c.next_review.is_none()) {
            log::warn!("Card {} has no next review date and cannot be scheduled", card.id);
        }

        let mut due: Vec<Card> = select_due(&cards, now).into_iter().cloned().collect();
        // Stable sort keeps creation order among cards due at the same instant
        due.sort_by_key(|card| card.next_review);
        Ok(due)
    }

    /// Submit a review for a card and persist its new scheduling state.
    ///
    /// The read-modify-write runs under the card's lock so concurrent reviews of the
    /// same card cannot overwrite each other.
    pub fn submit_review(
        &self,
        workspace_id: Uuid,
        card_id: Uuid,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<Card> {
        let lock = self.card_lock(card_id)?;
        let _guard = lock.lock().map_err(|_| FlashcardStorageError::LockPoisoned)?;

        let card = self.get_card(workspace_id, card_id)?;
        let reviewed = grade_review(&card, grade, now)?;
        self.put_card(&reviewed)?;

        log::info!(
            "Reviewed card {} ({}), next review in {} day(s)",
            card_id,
            grade,
            reviewed.interval_days.unwrap_or_default()
        );
        Ok(reviewed)
    }

    /// Get review statistics, optionally restricted to one subject
    pub fn stats(
        &self,
        workspace_id: Uuid,
        subject: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ReviewStats> {
        let cards = self.cards_for(workspace_id, subject)?;
        let subjects = self.list_subjects(workspace_id)?;
        Ok(compute_stats(&cards, subjects.len(), now))
    }

    fn cards_for(&self, workspace_id: Uuid, subject: Option<&str>) -> Result<Vec<Card>> {
        match subject.filter(|s| *s != ALL_SUBJECTS) {
            Some(subject) => self.list_cards_by_subject(workspace_id, subject),
            None => self.list_cards(workspace_id),
        }
    }

    fn card_lock(&self, card_id: Uuid) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .card_locks
            .lock()
            .map_err(|_| FlashcardStorageError::LockPoisoned)?;
        Ok(Arc::clone(locks.entry(card_id).or_default()))
    }

    // ==================== Subject Operations ====================

    /// List all subjects in a workspace
    pub fn list_subjects(&self, workspace_id: Uuid) -> Result<Vec<Subject>> {
        let subjects_path = self.subjects_path(workspace_id);
        if !subjects_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&subjects_path)?;
        let subjects: Vec<Subject> = serde_json::from_str(&content)?;
        Ok(subjects)
    }

    fn save_subjects(&self, workspace_id: Uuid, subjects: &[Subject]) -> Result<()> {
        fs::write(
            self.subjects_path(workspace_id),
            serde_json::to_string_pretty(subjects)?,
        )?;
        Ok(())
    }

    /// Create a subject; names are unique within a workspace
    pub fn create_subject(&self, workspace_id: Uuid, name: &str) -> Result<Subject> {
        self.init(workspace_id)?;
        let name = validate_name(name)?;

        let mut subjects = self.list_subjects(workspace_id)?;
        if subjects.iter().any(|s| s.name == name) {
            return Err(FlashcardStorageError::SubjectExists(name));
        }

        let subject = Subject::new(workspace_id, name);
        subjects.push(subject.clone());
        self.save_subjects(workspace_id, &subjects)?;

        log::info!("Created subject {}", subject.name);
        Ok(subject)
    }

    /// Get a subject, creating it if it does not exist yet
    pub fn ensure_subject(&self, workspace_id: Uuid, name: &str) -> Result<Subject> {
        let name = validate_name(name)?;
        match self
            .list_subjects(workspace_id)?
            .into_iter()
            .find(|s| s.name == name)
        {
            Some(subject) => Ok(subject),
            None => self.create_subject(workspace_id, &name),
        }
    }

    /// Delete a subject and either delete or reassign its cards and courses
    pub fn delete_subject(
        &self,
        workspace_id: Uuid,
        name: &str,
        removal: SubjectRemoval,
    ) -> Result<()> {
        let mut subjects = self.list_subjects(workspace_id)?;
        if !subjects.iter().any(|s| s.name == name) {
            return Err(FlashcardStorageError::SubjectNotFound(name.to_string()));
        }

        let removal = match removal {
            SubjectRemoval::Reassign(target) => {
                let target = validate_name(&target)?;
                if target == name {
                    return Err(FlashcardStorageError::InvalidName(target));
                }
                self.ensure_subject(workspace_id, &target)?;
                subjects = self.list_subjects(workspace_id)?;
                SubjectRemoval::Reassign(target)
            }
            SubjectRemoval::DeleteCards => SubjectRemoval::DeleteCards,
        };

        let cards = self.list_cards_by_subject(workspace_id, name)?;
        let mut courses = self.list_courses(workspace_id)?;

        match &removal {
            SubjectRemoval::DeleteCards => {
                for card in &cards {
                    match self.delete_card(workspace_id, card.id) {
                        Ok(()) | Err(FlashcardStorageError::CardNotFound(_)) => {}
                        Err(e) => return Err(e),
                    }
                }
                courses.retain(|c| c.subject != name);
                log::info!("Deleted subject {} with {} card(s)", name, cards.len());
            }
            SubjectRemoval::Reassign(target) => {
                let now = Utc::now();
                for card_id in cards.iter().map(|c| c.id) {
                    self.reassign_card(workspace_id, card_id, name, target, now)?;
                }
                for course in courses.iter_mut().filter(|c| c.subject == name) {
                    course.subject = target.clone();
                    course.updated_at = now;
                }
                log::info!(
                    "Deleted subject {}, moved {} card(s) to {}",
                    name,
                    cards.len(),
                    target
                );
            }
        }

        self.save_courses(workspace_id, &courses)?;
        subjects.retain(|s| s.name != name);
        self.save_subjects(workspace_id, &subjects)?;
        Ok(())
    }

    /// Move one card to `target` under its lock, re-reading it so a concurrent
    /// review is not overwritten by a stale copy
    fn reassign_card(
        &self,
        workspace_id: Uuid,
        card_id: Uuid,
        from: &str,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let lock = self.card_lock(card_id)?;
        let _guard = lock.lock().map_err(|_| FlashcardStorageError::LockPoisoned)?;

        let mut card = match self.get_card(workspace_id, card_id) {
            Ok(card) => card,
            Err(FlashcardStorageError::CardNotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        if card.subject != from {
            return Ok(());
        }
        card.subject = target.to_string();
        card.updated_at = now;
        self.put_card(&card)
    }

    fn require_subject(&self, workspace_id: Uuid, name: &str) -> Result<()> {
        if self.list_subjects(workspace_id)?.iter().any(|s| s.name == name) {
            Ok(())
        } else {
            Err(FlashcardStorageError::SubjectNotFound(name.to_string()))
        }
    }

    // ==================== Course Operations ====================

    /// List all courses in a workspace
    pub fn list_courses(&self, workspace_id: Uuid) -> Result<Vec<Course>> {
        let courses_path = self.courses_path(workspace_id);
        if !courses_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&courses_path)?;
        let courses: Vec<Course> = serde_json::from_str(&content)?;
        Ok(courses)
    }

    fn save_courses(&self, workspace_id: Uuid, courses: &[Course]) -> Result<()> {
        fs::create_dir_all(self.workspace_dir(workspace_id))?;
        fs::write(
            self.courses_path(workspace_id),
            serde_json::to_string_pretty(courses)?,
        )?;
        Ok(())
    }

    /// List the courses of one subject
    pub fn courses_by_subject(&self, workspace_id: Uuid, subject: &str) -> Result<Vec<Course>> {
        Ok(self
            .list_courses(workspace_id)?
            .into_iter()
            .filter(|c| c.subject == subject)
            .collect())
    }

    /// Get a specific course
    pub fn get_course(&self, workspace_id: Uuid, course_id: Uuid) -> Result<Course> {
        self.list_courses(workspace_id)?
            .into_iter()
            .find(|c| c.id == course_id)
            .ok_or(FlashcardStorageError::CourseNotFound(course_id))
    }

    /// Create a course in an existing subject
    pub fn create_course(
        &self,
        workspace_id: Uuid,
        subject: &str,
        title: String,
        content: String,
    ) -> Result<Course> {
        self.init(workspace_id)?;
        let subject = validate_name(subject)?;
        self.require_subject(workspace_id, &subject)?;
        let title = validate_name(&title)?;

        let course = Course::new(workspace_id, subject, title, content);
        let mut courses = self.list_courses(workspace_id)?;
        courses.push(course.clone());
        self.save_courses(workspace_id, &courses)?;

        log::info!("Created course {} in subject {}", course.title, course.subject);
        Ok(course)
    }

    /// Delete a course
    pub fn delete_course(&self, workspace_id: Uuid, course_id: Uuid) -> Result<()> {
        let mut courses = self.list_courses(workspace_id)?;
        let before = courses.len();
        courses.retain(|c| c.id != course_id);
        if courses.len() == before {
            return Err(FlashcardStorageError::CourseNotFound(course_id));
        }
        self.save_courses(workspace_id, &courses)
    }
}

/// Trim a subject or title and reject empty ones
fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FlashcardStorageError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}
