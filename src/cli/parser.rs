use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rAttendance
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "A simple attendance tracker: mark lectures per subject and watch your totals, using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Act as this student instead of the configured one
    #[arg(global = true, long = "student")]
    pub student: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or edit the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use instead of the default")]
        editor: Option<String>,
    },

    /// Database maintenance (migrations, integrity checks, info)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity and counter drift")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage the subject catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Configure the subjects you attend
    Subject {
        #[command(subcommand)]
        action: SubjectAction,
    },

    /// Mark attendance for one lecture
    Mark {
        /// Subject code (e.g. CN)
        subject: String,

        #[arg(long = "note", short = 'n', help = "Optional note (max 280 characters)")]
        note: Option<String>,
    },

    /// Delete an attendance record by id
    Del {
        /// Record id as shown by `history`
        id: i64,

        #[arg(long = "yes", short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    /// Show attendance totals per subject
    List {
        #[arg(long = "bars", help = "Draw a progress bar per subject")]
        bars: bool,
    },

    /// Show attendance records, newest first
    History {
        #[arg(long = "subject", short = 's', help = "Only records of this subject")]
        subject: Option<String>,

        #[arg(long = "limit", help = "Show at most N records")]
        limit: Option<usize>,
    },

    /// Rebuild every counter from the attendance records
    Recount,

    /// Deferred subject setup, applied after account verification
    Onboard {
        #[command(subcommand)]
        action: OnboardAction,
    },

    /// Export attendance records
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long = "subject", short = 's')]
        subject: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum CatalogAction {
    /// Add a subject to the catalog
    Add {
        code: String,
        name: String,

        #[arg(long = "total", allow_hyphen_values = true, help = "Default lecture count")]
        total: Option<String>,
    },

    /// List catalog subjects
    List,

    /// Import subjects from a YAML file (list of code/name/default_total)
    Import { file: String },
}

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Start tracking a catalog subject
    Add {
        code: String,

        #[arg(
            long = "total",
            allow_hyphen_values = true,
            help = "Lecture count (default: catalog value, 0 = uncapped)"
        )]
        total: Option<String>,
    },

    /// Change the target lecture count of a subject
    Total {
        code: String,

        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Stop tracking a subject and delete its records
    Remove {
        code: String,

        #[arg(long = "yes", short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum OnboardAction {
    /// Save a subject selection and print the token to finish it later
    Start {
        /// CODE or CODE=TOTAL
        #[arg(required = true)]
        subjects: Vec<String>,
    },

    /// Apply a saved selection
    Finish { token: String },
}
