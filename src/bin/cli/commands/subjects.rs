use std::collections::HashMap;

use anyhow::{Context, Result};

use studycards_lib::flashcards::SubjectRemoval;

use crate::app::App;
use crate::render::terminal::{column_width, paint, rule, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subjects = app
        .storage
        .list_subjects(app.workspace_id)
        .context("Failed to list subjects")?;
    let cards = app
        .storage
        .list_cards(app.workspace_id)
        .context("Failed to list cards")?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for card in &cards {
        *counts.entry(card.subject.as_str()).or_default() += 1;
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = subjects.iter().map(|s| {
                serde_json::json!({
                    "id": s.id.to_string(),
                    "name": s.name,
                    "cardCount": counts.get(s.name.as_str()).copied().unwrap_or(0),
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if subjects.is_empty() {
                println!("No subjects. Add one with `subjects add <name>`.");
                return Ok(());
            }

            let name_w = column_width(subjects.iter().map(|s| s.name.as_str()), 7, 40);
            println!("{:<name_w$} {}", "Subject", "Cards", name_w = name_w);
            println!("{} {}", rule(name_w), rule(5));
            for subject in &subjects {
                let count = counts.get(subject.name.as_str()).copied().unwrap_or(0);
                println!("{} {}",
                    paint(&format!("{:<name_w$}", subject.name, name_w = name_w), Color::BOLD, use_color),
                    count);
            }
        }
    }

    Ok(())
}

pub fn run_add(app: &App, name: &str, format: &OutputFormat) -> Result<()> {
    let subject = app
        .storage
        .create_subject(app.workspace_id, name)
        .context("Failed to create subject")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&subject)?),
        OutputFormat::Plain => println!("Created subject \"{}\"", subject.name),
    }
    Ok(())
}

pub fn run_delete(app: &App, name: &str, reassign_to: Option<String>, format: &OutputFormat) -> Result<()> {
    let affected = app
        .storage
        .list_cards_by_subject(app.workspace_id, name)
        .context("Failed to list cards")?
        .len();

    let removal = match reassign_to.clone() {
        Some(target) => SubjectRemoval::Reassign(target),
        None => SubjectRemoval::DeleteCards,
    };
    app.storage
        .delete_subject(app.workspace_id, name, removal)
        .with_context(|| format!("Failed to delete subject '{}'", name))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "deleted": name,
                "cards": affected,
                "reassignedTo": reassign_to,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match reassign_to {
            Some(target) => println!("Deleted subject \"{}\", moved {} card(s) to \"{}\"", name, affected, target),
            None => println!("Deleted subject \"{}\" and {} card(s)", name, affected),
        },
    }
    Ok(())
}
