mod app;
mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use studycards_lib::config::Config;

#[derive(Parser)]
#[command(name = "studycards-cli", about = "Flashcards with spaced repetition review", version)]
struct Cli {
    /// Path to a config file (default: <config dir>/studycards/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a specific workspace (default: from config)
    #[arg(long, global = true)]
    workspace: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Manage subjects
    #[command(subcommand)]
    Subjects(SubjectCommand),

    /// Manage cards
    #[command(subcommand)]
    Cards(CardCommand),

    /// Manage courses
    #[command(subcommand)]
    Courses(CourseCommand),

    /// List cards due for review
    Due {
        /// Only cards of this subject
        #[arg(long)]
        subject: Option<String>,
        /// Maximum cards to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record a review of a card
    Review {
        /// Card ID (or unique prefix)
        card: String,
        /// again, hard, good or easy (or 1-4)
        grade: String,
    },

    /// Show the interval each grade would give a card
    Preview {
        /// Card ID (or unique prefix)
        card: String,
    },

    /// Show review statistics
    Stats {
        /// Only cards of this subject
        #[arg(long)]
        subject: Option<String>,
    },
}

#[derive(Subcommand)]
enum SubjectCommand {
    /// List subjects with card counts
    List,

    /// Add a subject
    Add {
        /// Subject name
        name: String,
    },

    /// Delete a subject and its cards
    Delete {
        /// Subject name
        name: String,
        /// Move the subject's cards and courses to the default subject instead of deleting them
        #[arg(long)]
        reassign: bool,
        /// Subject to move them to (implies --reassign)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// List cards
    List {
        /// Filter by subject ("all" for every subject)
        #[arg(long)]
        subject: Option<String>,
        /// Case-insensitive search in question and answer
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a card
    Add {
        /// Subject name (must exist)
        subject: String,
        /// Question (front)
        question: String,
        /// Answer (back)
        answer: String,
    },

    /// Edit a card's question, answer or subject
    Edit {
        /// Card ID (or unique prefix)
        card: String,
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        answer: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card ID (or unique prefix)
        card: String,
    },
}

#[derive(Subcommand)]
enum CourseCommand {
    /// List courses grouped by subject
    List {
        /// Only courses of this subject
        #[arg(long)]
        subject: Option<String>,
    },

    /// Add a course
    Add {
        /// Subject name (must exist)
        subject: String,
        /// Course title
        title: String,
        /// Course content (use "-" to read from stdin)
        #[arg(long)]
        content: Option<String>,
    },

    /// Show a course
    Show {
        /// Course ID (or unique prefix)
        course: String,
    },

    /// Delete a course
    Delete {
        /// Course ID (or unique prefix)
        course: String,
    },
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
            Some(buf)
        }
        Some(_) => content,
        None => {
            // Auto-detect piped stdin
            if !stdin_is_tty() {
                let mut buf = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
                if buf.is_empty() { None } else { Some(buf) }
            } else {
                None
            }
        }
    }
}

/// Check if stdin is a terminal (not piped)
fn stdin_is_tty() -> bool {
    unsafe { libc_isatty(0) != 0 }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(workspace) = cli.workspace {
        config.workspace = workspace;
        config.validate().context("Invalid workspace")?;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(config)?;
    let format = &cli.format;

    match cli.command {
        Command::Subjects(subcmd) => match subcmd {
            SubjectCommand::List => commands::subjects::run_list(&app, format, use_color)?,
            SubjectCommand::Add { name } => commands::subjects::run_add(&app, &name, format)?,
            SubjectCommand::Delete { name, reassign, to } => {
                let target = match (reassign, to) {
                    (_, Some(to)) => Some(to),
                    (true, None) => Some(app.config.default_subject.clone()),
                    (false, None) => None,
                };
                commands::subjects::run_delete(&app, &name, target, format)?;
            }
        },
        Command::Cards(subcmd) => match subcmd {
            CardCommand::List { subject, search } => {
                commands::cards::run_list(&app, subject.as_deref(), search.as_deref(), format, use_color)?;
            }
            CardCommand::Add { subject, question, answer } => {
                commands::cards::run_add(&app, subject, question, answer, format)?;
            }
            CardCommand::Edit { card, question, answer, subject } => {
                commands::cards::run_edit(&app, &card, question, answer, subject, format)?;
            }
            CardCommand::Delete { card } => commands::cards::run_delete(&app, &card, format)?,
        },
        Command::Courses(subcmd) => match subcmd {
            CourseCommand::List { subject } => {
                commands::courses::run_list(&app, subject.as_deref(), format, use_color)?;
            }
            CourseCommand::Add { subject, title, content } => {
                let content = resolve_content(content);
                commands::courses::run_add(&app, &subject, title, content, format)?;
            }
            CourseCommand::Show { course } => {
                commands::courses::run_show(&app, &course, format, use_color)?;
            }
            CourseCommand::Delete { course } => commands::courses::run_delete(&app, &course, format)?,
        },
        Command::Due { subject, limit } => {
            commands::review::run_due(&app, subject.as_deref(), limit, format, use_color)?;
        }
        Command::Review { card, grade } => {
            commands::review::run_review(&app, &card, &grade, format, use_color)?;
        }
        Command::Preview { card } => commands::review::run_preview(&app, &card, format)?,
        Command::Stats { subject } => {
            commands::stats::run(&app, subject.as_deref(), format, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
