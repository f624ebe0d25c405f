//! Interactive blocking session.
//!
//! Reads one command per line from stdin and runs it against a shared
//! [`Blocker`]. A [`SessionClock`] ticks the same blocker in the background
//! so blocks expire while the shell waits for input. State lives only as
//! long as the shell.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use calculock_core::{AppId, Blocker, DisplayStatus, Event, SessionClock, UnblockOutcome};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::load_config;

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Show block status
    Status,
    /// List the app catalog (selected apps marked with *)
    Apps,
    /// Replace the selection with the given apps
    Select {
        apps: Vec<String>,
    },
    /// Replace the selection with every app in a category
    SelectCategory {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Start blocking the selected apps
    Block {
        /// Minutes (defaults to the configured default duration)
        minutes: Option<u32>,
    },
    /// Show the current calculus problem
    Problem,
    /// Show a hint for the current problem
    Hint,
    /// Swap the current problem for a new one
    NewProblem,
    /// Answer the current problem to unblock
    Answer {
        #[arg(required = true, allow_hyphen_values = true)]
        answer: Vec<String>,
    },
    /// List categories
    Categories,
    /// Edit categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Create an empty category
    Create {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete a category
    Delete {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Show members and apps that can still be added
    Show {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Rename a category
    Rename {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long, required = true, num_args = 1..)]
        to: Vec<String>,
    },
    /// Add an app to a category
    Add {
        app: String,
        #[arg(required = true)]
        category: Vec<String>,
    },
    /// Remove an app from a category
    Remove {
        app: String,
        #[arg(required = true)]
        category: Vec<String>,
    },
}

enum Flow {
    Continue,
    Quit,
}

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let default_minutes = config.default_duration().minutes();
    let blocker = Blocker::from_config(&config)?;
    let mut events = blocker.subscribe();
    let shared = Arc::new(Mutex::new(blocker));

    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let mut clock = SessionClock::new(config.tick_interval());
    clock.start(Arc::clone(&shared));

    runtime.spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::BlockExpired { .. }) => println!("Block finished. Apps are unblocked."),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    let interactive = std::io::stdin().is_terminal();
    {
        let blocker = lock(&shared)?;
        println!("CalcuLock. Type `help` for commands.");
        println!("{}", blocker.status(Utc::now()));
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        debug!(line = %line, "shell command");
        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                println!("{}", e.render());
                continue;
            }
        };
        let mut blocker = lock(&shared)?;
        match execute(&mut blocker, command, default_minutes) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    clock.stop();
    Ok(())
}

fn lock(shared: &Arc<Mutex<Blocker>>) -> Result<std::sync::MutexGuard<'_, Blocker>, Box<dyn std::error::Error>> {
    shared.lock().map_err(|_| "blocker state poisoned".into())
}

/// Resolve a typed app name against the catalog, keeping unknown names as-is
/// so the core can reject them.
fn resolve_app(blocker: &Blocker, name: &str) -> AppId {
    blocker
        .catalog()
        .find(name)
        .cloned()
        .unwrap_or_else(|| AppId::from(name))
}

fn execute(
    blocker: &mut Blocker,
    command: ShellCommand,
    default_minutes: u32,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let now = Utc::now();
    match command {
        ShellCommand::Status => {
            let status = blocker.status(now);
            println!("{status}");
            if let DisplayStatus::Active { remaining_secs, .. } = status {
                println!("remaining: {}m {:02}s", remaining_secs / 60, remaining_secs % 60);
            }
        }
        ShellCommand::Apps => {
            let selected = blocker.session().selected_apps();
            for app in blocker.catalog().apps() {
                let mark = if selected.contains(app) { "*" } else { " " };
                println!("{mark} {app}");
            }
        }
        ShellCommand::Select { apps } => {
            let apps: Vec<AppId> = apps.iter().map(|name| resolve_app(blocker, name)).collect();
            blocker.select_apps(apps, now)?;
            println!("{}", blocker.status(now));
        }
        ShellCommand::SelectCategory { name } => {
            let count = blocker.select_category(&name.join(" "), now)?;
            println!("Selected {count} apps");
        }
        ShellCommand::Block { minutes } => {
            let minutes = minutes.unwrap_or(default_minutes);
            let expires_at = blocker.start_block(minutes, now)?;
            println!(
                "Blocked {} apps until {}",
                blocker.session().selected_apps().len(),
                expires_at.with_timezone(&Local).format("%H:%M")
            );
        }
        ShellCommand::Problem => println!("{}", blocker.current_problem().question),
        ShellCommand::Hint => println!("Hint: {}", blocker.hint()),
        ShellCommand::NewProblem => println!("{}", blocker.request_new_problem(now).question),
        ShellCommand::Answer { answer } => {
            match blocker.attempt_unblock(&answer.join(" "), now)? {
                UnblockOutcome::Unblocked => println!("Correct! Apps have been unblocked."),
                UnblockOutcome::Incorrect => println!("Incorrect. Try again or get a hint."),
            }
        }
        ShellCommand::Categories => {
            for name in blocker.list_categories() {
                let count = blocker.category_members(&name).map_or(0, <[AppId]>::len);
                println!("{name} ({count} apps)");
            }
        }
        ShellCommand::Category { action } => run_category(blocker, action, now)?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn run_category(
    blocker: &mut Blocker,
    action: CategoryAction,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CategoryAction::Create { name } => {
            blocker.create_category(&name.join(" "), now)?;
            println!("ok");
        }
        CategoryAction::Delete { name } => {
            let name = name.join(" ");
            if blocker.delete_category(&name, now) {
                println!("deleted '{name}'");
            } else {
                println!("no category named '{name}'");
            }
        }
        CategoryAction::Show { name } => {
            let name = name.join(" ");
            let members = blocker
                .category_members(&name)
                .ok_or_else(|| format!("Unknown category: {name}"))?;
            let members: Vec<String> = members.iter().map(ToString::to_string).collect();
            let available: Vec<String> = blocker
                .available_apps(&name)?
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("{name}: {}", members.join(", "));
            println!("can add: {}", available.join(", "));
        }
        CategoryAction::Rename { name, to } => {
            blocker.rename_category(&name.join(" "), &to.join(" "), now)?;
            println!("ok");
        }
        CategoryAction::Add { app, category } => {
            let app = resolve_app(blocker, &app);
            blocker.add_app(&category.join(" "), app, now)?;
            println!("ok");
        }
        CategoryAction::Remove { app, category } => {
            let app = resolve_app(blocker, &app);
            let category = category.join(" ");
            if blocker.remove_app(&category, &app, now) {
                println!("removed {app} from '{category}'");
            } else {
                println!("{app} is not in '{category}'");
            }
        }
    }
    Ok(())
}
