use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, subject: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let stats = app
        .storage
        .stats(app.workspace_id, subject, Utc::now())
        .context("Failed to compute statistics")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            let scope = subject.unwrap_or("all subjects");
            println!("{}", paint(&format!("Workspace '{}' ({})", app.config.workspace, scope), Color::BOLD, use_color));
            println!("  Cards:     {}", stats.total_cards);
            println!("  Due:       {}", paint(&stats.due_cards.to_string(), Color::YELLOW, use_color));
            println!("  New:       {}", stats.new_cards);
            println!("  Learning:  {}", stats.learning_cards);
            println!("  Review:    {}", stats.review_cards);
            println!("  Subjects:  {}", stats.subjects);
        }
    }

    Ok(())
}
