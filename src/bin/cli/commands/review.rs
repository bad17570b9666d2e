use anyhow::{Context, Result};
use chrono::Utc;

use studycards_lib::flashcards::algorithm::{format_interval, preview_intervals};
use studycards_lib::flashcards::{Card, Grade};

use super::cards::{card_json, print_table};
use crate::app::App;
use crate::render::terminal::{paint, phase_label, Color};
use crate::OutputFormat;

pub fn run_due(
    app: &App,
    subject: Option<&str>,
    limit: Option<usize>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut due = app
        .storage
        .due_cards(app.workspace_id, subject, Utc::now())
        .context("Failed to load due cards")?;
    let total = due.len();
    if let Some(limit) = limit {
        due.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = due.iter().map(card_json).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing to review.");
                return Ok(());
            }
            let refs: Vec<&Card> = due.iter().collect();
            print_table(&refs, use_color);
            println!("\n{} card(s) due", total);
        }
    }

    Ok(())
}

pub fn run_review(app: &App, card: &str, grade: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    // Reject unknown grades before looking the card up
    let grade: Grade = grade.parse()?;
    let card = app.find_card(card)?;

    let reviewed = app
        .storage
        .submit_review(app.workspace_id, card.id, grade, Utc::now())
        .context("Failed to record review")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card_json(&reviewed))?),
        OutputFormat::Plain => {
            let interval = reviewed.interval_days.unwrap_or_default();
            println!("Graded {} as {}", paint(&reviewed.question, Color::BOLD, use_color), grade);
            println!("  Phase: {}", phase_label(reviewed.phase(), use_color));
            println!("  Next review in {} ({})",
                format_interval(interval),
                reviewed.next_review.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default());
            println!("  Ease factor: {:.2}", reviewed.ease_factor.unwrap_or_default());
        }
    }

    Ok(())
}

pub fn run_preview(app: &App, card: &str, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(card)?;
    let intervals = preview_intervals(&card, Utc::now())?;

    match format {
        OutputFormat::Json => {
            let output: serde_json::Map<String, serde_json::Value> = Grade::ALL
                .iter()
                .zip(intervals)
                .map(|(grade, days)| (grade.to_string(), serde_json::json!(days)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", card.question);
            for (grade, days) in Grade::ALL.iter().zip(intervals) {
                println!("  {:<6} {}", grade.to_string(), format_interval(days));
            }
        }
    }

    Ok(())
}
