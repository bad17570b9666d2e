use anyhow::{bail, Context, Result};
use uuid::Uuid;

use studycards_lib::config::Config;
use studycards_lib::flashcards::{Card, Course, FlashcardStorage};

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub storage: FlashcardStorage,
    pub workspace_id: Uuid,
}

impl App {
    /// Open storage for the configured workspace
    pub fn new(config: Config) -> Result<Self> {
        let storage = FlashcardStorage::new(config.data_dir.clone());
        let workspace_id = config.workspace_id();
        storage
            .init(workspace_id)
            .with_context(|| format!("Failed to initialize workspace '{}'", config.workspace))?;

        log::debug!(
            "Using workspace '{}' ({}) in {:?}",
            config.workspace,
            workspace_id,
            config.data_dir
        );

        Ok(Self {
            config,
            storage,
            workspace_id,
        })
    }

    /// Find a card by ID or unique ID prefix
    pub fn find_card(&self, id: &str) -> Result<Card> {
        let id = id.trim();
        if id.is_empty() {
            bail!("Card id must not be empty");
        }

        if let Ok(card_id) = Uuid::parse_str(id) {
            return self
                .storage
                .get_card(self.workspace_id, card_id)
                .context("Failed to get card");
        }

        let cards = self
            .storage
            .list_cards(self.workspace_id)
            .context("Failed to list cards")?;
        let prefix = id.to_lowercase();
        let matches: Vec<&Card> = cards
            .iter()
            .filter(|c| c.id.to_string().starts_with(&prefix))
            .collect();

        match matches.len() {
            0 => bail!("No card matching '{}'", id),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous card id '{}'. Matches:\n{}", id,
                matches.iter().map(|c| format!("  - {} {}", c.id, c.question)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Find a course by ID or unique ID prefix
    pub fn find_course(&self, id: &str) -> Result<Course> {
        let id = id.trim();
        if id.is_empty() {
            bail!("Course id must not be empty");
        }

        let courses = self
            .storage
            .list_courses(self.workspace_id)
            .context("Failed to list courses")?;
        let prefix = id.to_lowercase();

        if let Some(course) = courses.iter().find(|c| c.id.to_string() == prefix) {
            return Ok(course.clone());
        }

        let matches: Vec<&Course> = courses
            .iter()
            .filter(|c| c.id.to_string().starts_with(&prefix))
            .collect();

        match matches.len() {
            0 => bail!("No course matching '{}'", id),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous course id '{}'. Matches:\n{}", id,
                matches.iter().map(|c| format!("  - {} {}", c.id, c.title)).collect::<Vec<_>>().join("\n")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studycards_lib::flashcards::NewCard;
    use tempfile::TempDir;

    fn test_app() -> (App, TempDir) {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            ..Config::default()
        };
        let app = App::new(config).unwrap();
        app.storage.create_subject(app.workspace_id, "Math").unwrap();
        (app, temp)
    }

    #[test]
    fn test_find_card_by_prefix() {
        let (app, _temp) = test_app();
        let card = app
            .storage
            .create_card(
                app.workspace_id,
                NewCard {
                    subject: "Math".into(),
                    question: "2+2".into(),
                    answer: "4".into(),
                },
            )
            .unwrap();

        let full = card.id.to_string();
        assert_eq!(app.find_card(&full).unwrap().id, card.id);
        assert_eq!(app.find_card(&full[..8]).unwrap().id, card.id);
        assert!(app.find_card("zzzz").is_err());
    }

    #[test]
    fn test_find_rejects_empty_id() {
        let (app, _temp) = test_app();
        app.storage
            .create_card(
                app.workspace_id,
                NewCard {
                    subject: "Math".into(),
                    question: "2+2".into(),
                    answer: "4".into(),
                },
            )
            .unwrap();
        app.storage
            .create_course(app.workspace_id, "Math", "Algebra".into(), String::new())
            .unwrap();

        assert!(app.find_card("").is_err());
        assert!(app.find_card("  ").is_err());
        assert!(app.find_course("").is_err());
    }

    #[test]
    fn test_find_course_by_prefix() {
        let (app, _temp) = test_app();
        let course = app
            .storage
            .create_course(app.workspace_id, "Math", "Algebra".into(), String::new())
            .unwrap();

        assert_eq!(app.find_course(&course.id.to_string()[..6]).unwrap().id, course.id);
    }
}
