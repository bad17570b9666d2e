use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, subject: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subjects = app
        .storage
        .list_subjects(app.workspace_id)
        .context("Failed to list subjects")?;
    let courses = app
        .storage
        .list_courses(app.workspace_id)
        .context("Failed to list courses")?;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = courses.iter()
                .filter(|c| subject.map_or(true, |s| c.subject == s))
                .map(|c| serde_json::json!({
                    "id": c.id.to_string(),
                    "subject": c.subject,
                    "title": c.title,
                }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let mut shown = 0;
            // Grouped by subject, in subject order; subjects without courses are skipped
            for s in subjects.iter().filter(|s| subject.map_or(true, |name| s.name == name)) {
                let subject_courses: Vec<_> = courses.iter().filter(|c| c.subject == s.name).collect();
                if subject_courses.is_empty() {
                    continue;
                }

                println!("{}", paint(&s.name, Color::BOLD, use_color));
                for course in subject_courses {
                    println!("  {} {}",
                        paint(&course.id.to_string()[..8], Color::GRAY, use_color),
                        course.title);
                    shown += 1;
                }
                println!();
            }

            if shown == 0 {
                println!("No courses.");
            }
        }
    }

    Ok(())
}

pub fn run_add(
    app: &App,
    subject: &str,
    title: String,
    content: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let course = app
        .storage
        .create_course(app.workspace_id, subject, title, content.unwrap_or_default())
        .context("Failed to create course")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&course)?),
        OutputFormat::Plain => {
            println!("Created course \"{}\" in \"{}\"", course.title, course.subject);
            println!("  ID: {}", course.id);
        }
    }
    Ok(())
}

pub fn run_show(app: &App, course: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let course = app.find_course(course)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&course)?),
        OutputFormat::Plain => {
            println!("{}", paint(&course.title, Color::BOLD, use_color));
            println!("{}", paint(&format!("Subject: {}", course.subject), Color::GRAY, use_color));
            if !course.content.is_empty() {
                println!();
                println!("{}", course.content.trim_end());
            }
        }
    }
    Ok(())
}

pub fn run_delete(app: &App, course: &str, format: &OutputFormat) -> Result<()> {
    let course = app.find_course(course)?;
    app.storage
        .delete_course(app.workspace_id, course.id)
        .context("Failed to delete course")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "deleted": course.id.to_string() })),
        OutputFormat::Plain => println!("Deleted course \"{}\"", course.title),
    }
    Ok(())
}
