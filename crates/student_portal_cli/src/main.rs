//! Operator CLI for the student registry.
//!
//! # Responsibility
//! - Deploy a registry into a SQLite file and drive its CRUD operations.
//! - Print records as JSON so 256-bit dates survive copy/paste.

use clap::{Args, Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use student_portal_core::db::open_db;
use student_portal_core::{
    core_version, default_log_level, init_logging, DateOfBirth, Principal, RegistryError,
    SqliteStudentRepository, StudentId, StudentProfile, StudentRegistry,
};

#[derive(Parser)]
#[command(name = "student-portal")]
#[command(about = "Owner-gated student record registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Registry database file
    #[arg(
        long,
        env = "STUDENT_PORTAL_DB",
        default_value = "student_portal.sqlite3",
        global = true
    )]
    db: PathBuf,

    /// Identity performing the call; required for mutating commands
    #[arg(long, env = "STUDENT_PORTAL_CALLER", global = true)]
    caller: Option<Principal>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the registry with the caller as its owner
    Deploy,
    /// Register a new student (owner only)
    Register(ProfileArgs),
    /// Show one active student
    Get { id: StudentId },
    /// List every slot, deleted ones included
    List,
    /// Overwrite a student; also restores deleted slots (owner only)
    Update {
        id: StudentId,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Soft-delete a student (owner only)
    Delete { id: StudentId },
    /// Number of slots ever allocated
    Count,
    /// Show the registry owner
    Owner,
    /// Show the notification log
    Events,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    /// Unsigned 256-bit decimal, usually a unix timestamp
    #[arg(long, default_value = "0")]
    date_of_birth: DateOfBirth,
    #[arg(long, default_value = "")]
    lga: String,
    #[arg(long, default_value = "")]
    country: String,
    #[arg(long, default_value = "")]
    state: String,
}

impl From<ProfileArgs> for StudentProfile {
    fn from(args: ProfileArgs) -> Self {
        StudentProfile::new(
            args.name,
            args.email,
            args.date_of_birth,
            args.lga,
            args.country,
            args.state,
        )
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let conn = open_db(&cli.db)?;
    let repo = SqliteStudentRepository::try_new(&conn)?;
    let caller = cli.caller.as_ref();

    match cli.command {
        Command::Deploy => {
            let registry = StudentRegistry::deploy(repo, require_caller(caller)?.clone())?;
            println!("student_portal version={}", core_version());
            println!("StudentPortal deployed to: {}", cli.db.display());
            println!("owner: {}", registry.owner());
        }
        command => {
            let registry = StudentRegistry::attach(repo)?;
            dispatch(&registry, caller, command)?;
        }
    }
    Ok(())
}

fn dispatch(
    registry: &StudentRegistry<SqliteStudentRepository<'_>>,
    caller: Option<&Principal>,
    command: Command,
) -> CliResult {
    match command {
        Command::Deploy => {
            return Err(RegistryError::AlreadyDeployed {
                owner: registry.owner().clone(),
            }
            .into());
        }
        Command::Register(profile) => {
            let id = registry.register_student(require_caller(caller)?, profile.into())?;
            println!("{id}");
        }
        Command::Get { id } => print_json(&registry.get_student(id)?)?,
        Command::List => print_json(&registry.get_all_students()?)?,
        Command::Update { id, profile } => {
            registry.update_student(require_caller(caller)?, id, profile.into())?;
        }
        Command::Delete { id } => registry.delete_student(require_caller(caller)?, id)?,
        Command::Count => println!("{}", registry.get_student_count()?),
        Command::Owner => println!("{}", registry.owner()),
        Command::Events => print_json(&registry.events()?)?,
    }
    Ok(())
}

fn require_caller(caller: Option<&Principal>) -> Result<&Principal, String> {
    caller.ok_or_else(|| "--caller (or STUDENT_PORTAL_CALLER) is required".to_string())
}

fn print_json(value: &impl serde::Serialize) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
