use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tasktrail::cli::{
    handle_audit_command, handle_notify_command, handle_task_command, handle_user_command,
};
use tasktrail::config::{Settings, TrailPaths};
use tasktrail::services::{Actor, UserService};
use tasktrail::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "tasktrail",
    version,
    about = "Task management with a structured audit trail",
    long_about = "TaskTrail tracks tasks and records every change to them as an \
                  immutable, queryable audit trail. It can also queue reminders \
                  for tasks that are due soon or overdue."
)]
struct Cli {
    /// Act as this user (email or ID); omit to act as the system operator
    #[arg(long = "as", global = true, env = "TASKTRAIL_USER", value_name = "USER")]
    as_user: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// User management commands
    #[command(subcommand)]
    User(tasktrail::cli::UserCommands),

    /// Task management commands
    #[command(subcommand)]
    Task(tasktrail::cli::TaskCommands),

    /// Audit trail commands
    #[command(subcommand)]
    Audit(tasktrail::cli::AuditCommands),

    /// Due-date reminder commands
    #[command(subcommand)]
    Notify(tasktrail::cli::NotifyCommands),
}

fn init_tracing(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("TASKTRAIL_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let paths = TrailPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let acting_user = cli
        .as_user
        .as_deref()
        .map(|identifier| UserService::new(&storage).require(identifier))
        .transpose()
        .context("could not resolve --as user")?;
    let actor = Actor::from_user(acting_user.as_ref());

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing TaskTrail at: {}", paths.base_dir().display());
            if initialize_storage(&paths)? {
                println!("Initialization complete!");
                println!();
                println!("Next steps:");
                println!("  tasktrail user add <name> <email> --role admin");
                println!("  tasktrail --as <email> task add <title>");
            } else {
                println!("Already initialized.");
            }
        }
        Some(Commands::Config) => {
            println!("TaskTrail Configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit journal:  {}", paths.audit_journal().display());
            println!("Outbox:         {}", paths.outbox_file().display());
            println!();
            println!("Notifications:");
            let notifications = &settings.notifications;
            println!("  Due window:     {} day(s)", notifications.due_window_days);
            println!("  Check overdue:  {}", notifications.check_overdue);
            println!("  Overdue window: {} day(s)", notifications.overdue_window_days);
            println!(
                "  Admin email:    {}",
                notifications.admin_email.as_deref().unwrap_or("(not set)")
            );
        }
        Some(Commands::User(cmd)) => handle_user_command(&storage, actor, cmd)?,
        Some(Commands::Task(cmd)) => handle_task_command(&storage, actor, cmd)?,
        Some(Commands::Audit(cmd)) => handle_audit_command(&storage, actor, cmd)?,
        Some(Commands::Notify(cmd)) => handle_notify_command(&storage, &settings, cmd)?,
        None => {
            println!("TaskTrail - tasks with an audit trail");
            println!();
            println!("Run 'tasktrail --help' for usage information.");
        }
    }

    Ok(())
}
