//! fittrack - Personal workout log
//!
//! Records, body measurements, history and progress charts

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use fittrack::analytics::bucket_label;
use fittrack::config::{LogTarget, Settings};
use fittrack::exercises::{find_exercise, tutorial_url};
use fittrack::share::{share_link, share_text};
use fittrack::tui::App;
use fittrack::validation::{BodyForm, WorkoutForm};
use fittrack::workflows::{
    AuthFlow, BodyEntry, HistoryListing, PlanBrowser, ProgressChart, RecordEntry, SignUpOutcome,
    TodayView, require_session, share_record,
};

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(author, version, about = "Personal workout log")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Create an account
    Signup {
        email: String,

        /// Account password (or set FITTRACK_PASSWORD env var)
        #[arg(short, long, env = "FITTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and remember the session
    Login {
        email: String,

        /// Account password (or set FITTRACK_PASSWORD env var)
        #[arg(short, long, env = "FITTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Mark a pending account as confirmed (embedded backend only)
    ConfirmEmail { email: String },

    /// Record a workout
    Add {
        /// Exercise name (e.g., "Bench Press", "Squat")
        exercise: String,

        /// Weight in kg
        #[arg(short, long)]
        weight: String,

        /// Reps per set
        #[arg(short, long)]
        reps: String,

        /// Number of sets
        #[arg(short, long)]
        sets: String,
    },

    /// List the exercise catalog
    Exercises,

    /// Show today's workouts
    Today,

    /// Body measurements
    Body {
        #[command(subcommand)]
        command: BodyCommands,
    },

    /// List workout history grouped by date
    History,

    /// Copy a workout's share text to the clipboard
    Share {
        /// Workout id (see `fittrack history`)
        id: String,

        /// Print a share link instead of copying
        #[arg(long)]
        link: bool,
    },

    /// Show weight progress for an exercise over the last 30 days
    Chart { exercise: String },

    /// Browse training plans
    Plans {
        /// Plan id or name to expand
        #[arg(long)]
        show: Option<String>,
    },
}

#[derive(Subcommand)]
enum BodyCommands {
    /// Record a body measurement
    Add {
        /// Body weight in kg
        #[arg(short, long)]
        weight: String,

        /// Body fat percentage
        #[arg(short, long)]
        body_fat: Option<String>,

        /// Muscle mass in kg
        #[arg(short, long)]
        muscle_mass: Option<String>,

        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List recent measurements
    List,
}

fn init_tracing(target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match target {
        LogTarget::Stderr => subscriber.with_writer(std::io::stderr).init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            subscriber.with_writer(Arc::new(file)).with_ansi(false).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_tracing(cli.settings.log_target(interactive))?;

    let connection = cli.settings.connect()?;
    let backend = connection.backend();
    let sessions = cli.settings.session_store();

    match cli.command {
        Some(Commands::Signup { email, password }) => {
            match AuthFlow::new(backend, &sessions).sign_up(&email, &password).await? {
                SignUpOutcome::Authenticated(user) => println!("Welcome, {}! You are signed in.", user.email),
                SignUpOutcome::PendingVerification(user) => println!(
                    "Account created for {}. Check your inbox and click the verification link, then run `fittrack login`.",
                    user.email
                ),
            }
        }

        Some(Commands::Login { email, password }) => {
            let user = AuthFlow::new(backend, &sessions).sign_in(&email, &password).await?;
            println!("Signed in as {}", user.email);
        }

        Some(Commands::Logout) => {
            AuthFlow::new(backend, &sessions).sign_out().await?;
            println!("Signed out");
        }

        Some(Commands::Whoami) => {
            let auth = require_session(backend, &sessions).await?;
            println!("{} (id: {})", auth.identity.email, auth.identity.id);
        }

        Some(Commands::ConfirmEmail { email }) => {
            let Some(local) = connection.local() else {
                bail!("confirm-email only works with the embedded backend; use the link in your inbox");
            };
            if local.confirm_email(&email).await? {
                println!("Confirmed {}", email);
            } else {
                bail!("No account for {}", email);
            }
        }

        Some(Commands::Add { exercise, weight, reps, sets }) => {
            let exercise = find_exercise(&exercise)
                .map(|e| e.name.to_string())
                .unwrap_or(exercise);
            let form = WorkoutForm { exercise, weight, reps, sets };
            let record = RecordEntry::new(backend, &sessions).submit(&form).await?;
            println!(
                "Logged: {} - {}kg {}x{} (id: {})",
                record.exercise_name, record.weight, record.sets, record.reps, record.id
            );
        }

        Some(Commands::Exercises) => {
            let exercises = RecordEntry::new(backend, &sessions).exercises().await?;
            let mut category = None;
            for e in &exercises {
                if category != Some(&e.category) {
                    println!("\n{}", e.category);
                    println!("{:-<60}", "");
                    category = Some(&e.category);
                }
                let link = tutorial_url(&e.name).map(|u| u.to_string()).unwrap_or_default();
                println!("  {:24} {}", e.name, link);
            }
        }

        Some(Commands::Today) => {
            let today = TodayView::new(backend, &sessions).load().await?;
            println!("Today for {}", today.identity.email);
            println!("{:-<60}", "");
            if today.workouts.is_empty() {
                println!("No workouts yet today");
            }
            for w in &today.workouts {
                println!(
                    "{} | {:24} | {:>7}kg | {}x{}",
                    w.created_at.with_timezone(&Local).format("%H:%M"),
                    w.exercise_name,
                    w.weight,
                    w.sets,
                    w.reps
                );
            }
            println!("Total volume: {:.0}kg", today.volume());
        }

        Some(Commands::Body { command }) => {
            let entry = BodyEntry::new(backend, &sessions);
            let list = match command {
                BodyCommands::Add { weight, body_fat, muscle_mass, note } => {
                    let form = BodyForm {
                        weight,
                        body_fat_percent: body_fat,
                        muscle_mass,
                        note,
                    };
                    let list = entry.submit(&form).await?;
                    println!("Measurement saved");
                    list
                }
                BodyCommands::List => entry.recent().await?,
            };

            let now = Utc::now();
            println!("Recent measurements:");
            println!("{:-<60}", "");
            for m in &list {
                println!(
                    "{:12} | {:>6}kg | fat {:>6} | muscle {:>7} | {}",
                    bucket_label(m.created_at, now).to_string(),
                    m.weight,
                    m.body_fat_percent.map(|b| format!("{}%", b)).unwrap_or_else(|| "-".into()),
                    m.muscle_mass.map(|v| format!("{}kg", v)).unwrap_or_else(|| "-".into()),
                    m.note.as_deref().unwrap_or("-")
                );
            }
        }

        Some(Commands::History) => {
            let groups = HistoryListing::new(backend, &sessions).load().await?;
            if groups.is_empty() {
                println!("No workouts recorded yet");
            }
            for group in &groups {
                println!("\n{}", group.label);
                println!("{:-<60}", "");
                for w in &group.items {
                    println!(
                        "{} | {:24} | {:>7}kg | {}x{} | {}",
                        w.created_at.with_timezone(&Local).format("%H:%M"),
                        w.exercise_name,
                        w.weight,
                        w.sets,
                        w.reps,
                        w.id
                    );
                }
            }
        }

        Some(Commands::Share { id, link }) => {
            let Some(record) = HistoryListing::new(backend, &sessions).find(&id).await? else {
                bail!("No workout with id {}", id);
            };
            if link {
                match share_link(&record) {
                    Some(url) => println!("{}", url),
                    None => bail!("Could not build share link"),
                }
            } else if share_record(&record) {
                println!("Copied to clipboard:\n\n{}", share_text(&record));
            } else {
                println!("Could not reach a clipboard, here is the text:\n\n{}", share_text(&record));
            }
        }

        Some(Commands::Chart { exercise }) => {
            let exercise = find_exercise(&exercise)
                .map(|e| e.name.to_string())
                .unwrap_or(exercise);
            let data = ProgressChart::new(backend, &sessions).load(&exercise).await?;
            println!("{} - last 30 days", data.exercise);
            println!("{:-<40}", "");
            if data.is_empty() {
                println!("No records in the last 30 days");
            }
            for p in &data.points {
                println!("{} | {:>7}kg", p.label(), p.weight);
            }
            if let Some(progress) = data.progress {
                println!("Progress: {} ({})", progress.percent_label(), progress.delta_label());
            }
        }

        Some(Commands::Plans { show }) => {
            let mut browser = PlanBrowser::default();
            browser.load(backend, &sessions).await?;
            if let Some(key) = &show
                && !browser.expand(key)
            {
                bail!("No plan named {}", key);
            }

            for plan in browser.plans() {
                let weeks = plan
                    .duration_weeks
                    .map(|w| format!(", {} weeks", w))
                    .unwrap_or_default();
                println!("{} [{}] ({}{})", plan.name, plan.id, plan.difficulty, weeks);
                if browser.expanded().map(|p| &p.id) == Some(&plan.id) {
                    if let Some(desc) = &plan.description {
                        println!("    {}", desc);
                    }
                    for day in &plan.days {
                        println!("    Day {}: {}", day.day_number, day.exercise_names.join(", "));
                    }
                }
            }
        }

        Some(Commands::Tui) | None => {
            // Default: show TUI
            let mut app = App::new(backend, &sessions);
            app.run().await?;
        }
    }

    Ok(())
}
