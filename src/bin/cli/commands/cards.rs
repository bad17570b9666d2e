use anyhow::{bail, Context, Result};

use studycards_lib::flashcards::filter::filter_cards;
use studycards_lib::flashcards::{Card, CardEdit, NewCard};

use crate::app::App;
use crate::render::terminal::{column_width, paint, phase_label, rule, truncate, Color};
use crate::OutputFormat;

pub fn card_json(card: &Card) -> serde_json::Value {
    serde_json::json!({
        "id": card.id.to_string(),
        "subject": card.subject,
        "question": card.question,
        "answer": card.answer,
        "nextReview": card.next_review.map(|d| d.to_rfc3339()),
        "intervalDays": card.interval_days,
        "easeFactor": card.ease_factor,
        "repetitions": card.repetitions,
        "phase": card.phase(),
    })
}

/// Print cards as a table: id, subject, question, phase, next review
pub fn print_table(cards: &[&Card], use_color: bool) {
    let subject_w = column_width(cards.iter().map(|c| c.subject.as_str()), 7, 16);
    let question_w = column_width(cards.iter().map(|c| c.question.as_str()), 8, 40);

    println!("{:<8} {:<sw$} {:<qw$} {:<8} {}",
        "ID", "Subject", "Question", "Phase", "Next review",
        sw = subject_w, qw = question_w);
    println!("{} {} {} {} {}", rule(8), rule(subject_w), rule(question_w), rule(8), rule(16));

    for card in cards {
        let id = card.id.to_string()[..8].to_string();
        let next = card
            .next_review
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let phase = phase_label(card.phase(), use_color);
        // Pad before coloring so escape codes don't count towards the width
        let phase_pad = " ".repeat(8usize.saturating_sub(card.phase().map_or(7, |p| p.to_string().len())));

        println!("{} {:<sw$} {:<qw$} {}{} {}",
            paint(&id, Color::GRAY, use_color),
            truncate(&card.subject, subject_w),
            truncate(&card.question, question_w),
            phase, phase_pad, next,
            sw = subject_w, qw = question_w);
    }
}

pub fn run_list(
    app: &App,
    subject: Option<&str>,
    search: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let cards = app
        .storage
        .list_cards(app.workspace_id)
        .context("Failed to list cards")?;
    let filtered = filter_cards(&cards, subject, search);

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = filtered.iter().map(|c| card_json(c)).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if filtered.is_empty() {
                println!("No cards found.");
                return Ok(());
            }
            print_table(&filtered, use_color);
            println!("\n{} of {} cards", filtered.len(), cards.len());
        }
    }

    Ok(())
}

pub fn run_add(
    app: &App,
    subject: String,
    question: String,
    answer: String,
    format: &OutputFormat,
) -> Result<()> {
    let card = app
        .storage
        .create_card(app.workspace_id, NewCard { subject, question, answer })
        .context("Failed to create card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card_json(&card))?),
        OutputFormat::Plain => {
            println!("Created card in \"{}\"", card.subject);
            println!("  ID: {}", card.id);
        }
    }
    Ok(())
}

pub fn run_edit(
    app: &App,
    card: &str,
    question: Option<String>,
    answer: Option<String>,
    subject: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    if question.is_none() && answer.is_none() && subject.is_none() {
        bail!("Nothing to edit: pass --question, --answer or --subject");
    }

    let card = app.find_card(card)?;
    let edited = app
        .storage
        .edit_card(app.workspace_id, card.id, CardEdit { question, answer, subject })
        .context("Failed to edit card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card_json(&edited))?),
        OutputFormat::Plain => println!("Updated card {}", edited.id),
    }
    Ok(())
}

pub fn run_delete(app: &App, card: &str, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(card)?;
    app.storage
        .delete_card(app.workspace_id, card.id)
        .context("Failed to delete card")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "deleted": card.id.to_string() })),
        OutputFormat::Plain => println!("Deleted card {}", card.id),
    }
    Ok(())
}
