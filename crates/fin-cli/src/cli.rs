//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fin - Financial infrastructure toolkit
#[derive(Parser)]
#[command(name = "fin")]
#[command(about = "Budgets, spending analytics, credit data and goal planning", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fin.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FIN_DB_KEY environment variable with your passphrase.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable API key authentication (local development only)
        #[arg(long)]
        no_auth: bool,
    },

    /// Analyze spending for a period
    Spending {
        /// User to analyze
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Period such as 7d, 30d or 90d
        #[arg(short, long, default_value = "30d")]
        period: String,

        /// Only include these categories (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Analyze a CSV export (date,description,amount[,category]) instead of sample data
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Manage budgets
    Budgets {
        #[command(subcommand)]
        action: BudgetsAction,
    },

    /// Pull credit bureau data
    Credit {
        #[command(subcommand)]
        action: CreditAction,
    },

    /// Generate persistence scaffolding for a domain
    Scaffold {
        /// Domain to scaffold: budgets, goals
        domain: String,

        /// Directory to write into
        #[arg(long)]
        dest_dir: PathBuf,

        /// Entity type name (defaults to the domain's)
        #[arg(long)]
        entity: Option<String>,

        /// Table name (defaults to the domain's)
        #[arg(long)]
        table: Option<String>,

        /// Add a tenant_id column and field
        #[arg(long)]
        include_tenant: bool,

        /// Replace files that already exist
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List a user's budgets
    List {
        #[arg(short, long)]
        user: String,

        /// Filter by type: personal, household, business, project, custom
        #[arg(short = 't', long = "type")]
        budget_type: Option<String>,
    },

    /// Show built-in templates
    Templates,

    /// Create a budget from a template
    FromTemplate {
        #[arg(short, long)]
        user: String,

        /// Template name (e.g. 50/30/20)
        #[arg(short, long)]
        template: String,

        /// Total income to allocate
        #[arg(short, long)]
        income: f64,

        /// Budget name (defaults to the template's)
        #[arg(short, long)]
        name: Option<String>,

        /// Start date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        start: Option<String>,
    },

    /// Show progress for the current period
    Progress {
        /// Budget ID
        id: String,
    },

    /// Check a budget for alerts
    Alerts {
        /// Budget ID
        id: String,

        /// Warn when a category reaches this percent of its budget
        #[arg(long, default_value = "80")]
        approaching: f64,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CreditAction {
    /// Current credit score
    Score {
        #[arg(short, long)]
        user: String,

        /// Bureau to query
        #[arg(short, long, default_value = "experian")]
        bureau: String,
    },

    /// Full credit report
    Report {
        #[arg(short, long)]
        user: String,

        /// Bureau to query
        #[arg(short, long, default_value = "experian")]
        bureau: String,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
