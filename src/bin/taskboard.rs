use std::convert::TryFrom;
use std::error::Error;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use taskboard::auth::{AuthClient, AuthContext};
use taskboard::calendar::CalendarCursor;
use taskboard::client::Client;
use taskboard::config::{self, Settings};
use taskboard::utils::Palette;
use taskboard::views::{self, CalendarView, DashboardView, Page, TasksView};
use taskboard::{parse_due_date, Priority, Provider, TaskColor, TaskId, TaskStatus};

const PASSWORD_ENV_VAR: &str = "TASKBOARD_PASSWORD";


#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Manage your tasks from the terminal")]
struct Cli {
    /// Backend URL (overrides TASKBOARD_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Public API key of the backend (overrides TASKBOARD_ANON_KEY and the config file)
    #[arg(long, global = true)]
    anon_key: Option<String>,

    /// Do not use colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from TASKBOARD_PASSWORD or stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show the counters and the most recent tasks
    Dashboard,
    /// List every task
    Tasks,
    /// Create a task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(long)]
        priority: Option<Priority>,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// A hex color such as #3b82f6
        #[arg(long)]
        color: Option<String>,
    },
    /// Set the status of a task (pending, in_progress or completed)
    Status {
        id: String,
        status: TaskStatus,
    },
    /// Mark a task completed, or pending again if it already was
    Toggle {
        id: String,
    },
    /// Show a month and the tasks that are due in it
    Calendar {
        /// YYYY-MM, defaults to the current month
        #[arg(long)]
        month: Option<String>,
        /// Go back this many months
        #[arg(long, conflicts_with = "next")]
        prev: Option<u32>,
        /// Go forward this many months
        #[arg(long)]
        next: Option<u32>,
    },
}


#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let palette = if cli.no_color { Palette::plain() } else { Palette::colored() };
    let settings = Settings::load(&Settings { url: cli.url, anon_key: cli.anon_key })?;
    let resource = settings.resource()?;
    let session_path = config::session_path()?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let session = AuthClient::new(resource).sign_in(&email, &password).await?;
            session.save_to_file(&session_path)?;
            println!("Signed in as {}", session.user.display_name());
        },
        Commands::Logout => {
            match AuthContext::restore(&session_path) {
                None => println!("Not signed in"),
                Some(auth) => {
                    auth.sign_out(&AuthClient::new(resource), Some(&session_path)).await?;
                    println!("Signed out");
                },
            }
        },
        Commands::Whoami => {
            let auth = signed_in(&session_path)?;
            let user = auth.current_user();
            println!("{} <{}>", user.display_name(), user.email);
            println!("Role:   {:?}", user.role);
            println!("Avatar: {}", user.avatar_or_placeholder());
        },
        Commands::Dashboard => {
            let provider = open_provider(resource, &session_path)?;
            println!("{}", views::render_sidebar(&palette, provider.auth().current_user(), Page::Dashboard));
            let mut view = DashboardView::mount(provider);
            view.loaded().await;
            print!("{}", view.render(&palette));
        },
        Commands::Tasks => {
            let provider = open_provider(resource, &session_path)?;
            println!("{}", views::render_sidebar(&palette, provider.auth().current_user(), Page::Tasks));
            let mut view = TasksView::mount(provider);
            view.loaded().await;
            print!("{}", view.render(&palette));
        },
        Commands::Add { title, description, priority, due, color } => {
            let due_date = match due {
                None => None,
                Some(d) => Some(parse_due_date(&d).ok_or_else(|| format!("Invalid due date {:?}, expected YYYY-MM-DD", d))?),
            };
            let color = match color {
                None => None,
                Some(c) => Some(TaskColor::parse(&c)?),
            };

            let mut view = TasksView::mount(open_provider(resource, &session_path)?);
            let form = view.open_form();
            form.title = title;
            form.description = description.unwrap_or_default();
            form.priority = priority;
            form.due_date = due_date;
            form.color = color;

            match view.submit_form().await {
                Ok(task) => println!("Created task {} ({})", task.title(), task.id()),
                Err(err) => {
                    eprint!("{}", view.render(&palette));
                    return Err(err.into());
                },
            }
        },
        Commands::Status { id, status } => {
            let mut view = TasksView::mount(open_provider(resource, &session_path)?);
            let task = view.set_status(&TaskId::from(id), status).await?;
            println!("{} is now {}", task.title(), task.status());
        },
        Commands::Toggle { id } => {
            let mut view = TasksView::mount(open_provider(resource, &session_path)?);
            view.loaded().await;
            let task = view.toggle(&TaskId::from(id)).await?;
            println!("{} is now {}", task.title(), task.status());
        },
        Commands::Calendar { month, prev, next } => {
            let provider = open_provider(resource, &session_path)?;
            let today = Local::now().date_naive();
            let mut cursor = match month {
                None => CalendarCursor::new(today),
                Some(m) => CalendarCursor::new(parse_month(&m)?),
            };
            if let Some(n) = prev {
                cursor.shift(-month_offset(n)?);
            }
            if let Some(n) = next {
                cursor.shift(month_offset(n)?);
            }

            println!("{}", views::render_sidebar(&palette, provider.auth().current_user(), Page::Calendar));
            let mut view = CalendarView::mount_at(provider, cursor, today);
            view.loaded().await;
            print!("{}", view.render(&palette));
        },
    }
    Ok(())
}

fn signed_in(session_path: &Path) -> Result<AuthContext, Box<dyn Error>> {
    AuthContext::restore(session_path)
        .ok_or_else(|| "Not signed in. Run `taskboard login --email <email>` first".into())
}

fn open_provider(resource: taskboard::resource::Resource, session_path: &Path) -> Result<Provider<Client>, Box<dyn Error>> {
    let auth = signed_in(session_path)?;
    let client = Client::new(auth.authorize_resource(&resource));
    Ok(Provider::new(Arc::new(client), auth))
}

fn parse_month(s: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| format!("Invalid month {:?}, expected YYYY-MM", s).into())
}

/// A number of months to move by, as accepted by [`CalendarCursor::shift`]
fn month_offset(n: u32) -> Result<i32, Box<dyn Error>> {
    i32::try_from(n).map_err(|_| format!("Cannot move by {} months, the maximum is {}", n, i32::MAX).into())
}

fn read_password() -> Result<String, Box<dyn Error>> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR) {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_offsets_are_range_checked() {
        assert_eq!(month_offset(3).unwrap(), 3);
        assert_eq!(month_offset(i32::MAX as u32).unwrap(), i32::MAX);
        assert!(month_offset(2_147_483_648).is_err());
        assert!(month_offset(3_000_000_000).is_err());
    }

    #[test]
    fn calendar_arguments() {
        let cli = Cli::try_parse_from(["taskboard", "calendar", "--month", "2024-03", "--prev", "1"]).unwrap();
        match cli.command {
            Commands::Calendar { month, prev, next } => {
                assert_eq!(month.as_deref(), Some("2024-03"));
                assert_eq!(prev, Some(1));
                assert_eq!(next, None);
            },
            other => panic!("Unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["taskboard", "calendar", "--prev", "1", "--next", "2"]).is_err());
        assert!(Cli::try_parse_from(["taskboard", "calendar", "--prev", "-1"]).is_err());
    }

    #[test]
    fn month_argument() {
        assert_eq!(parse_month("2024-02").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("February").is_err());
    }
}
