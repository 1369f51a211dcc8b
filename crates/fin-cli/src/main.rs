//! fin CLI - Financial infrastructure toolkit
//!
//! Usage:
//!   fin init                          Initialize database
//!   fin spending --period 30d         Analyze spending
//!   fin budgets from-template ...     Create a budget from a template
//!   fin serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
        Commands::Spending {
            user,
            period,
            categories,
            file,
            json,
        } => {
            let categories = (!categories.is_empty()).then_some(categories);
            commands::cmd_spending(
                &user,
                &period,
                categories.as_deref(),
                file.as_deref(),
                json,
            )
            .await
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                BudgetsAction::List { user, budget_type } => {
                    commands::cmd_budgets_list(&db, &user, budget_type.as_deref())
                }
                BudgetsAction::Templates => commands::cmd_budgets_templates(),
                BudgetsAction::FromTemplate {
                    user,
                    template,
                    income,
                    name,
                    start,
                } => commands::cmd_budgets_from_template(
                    &db,
                    &user,
                    &template,
                    income,
                    name,
                    start.as_deref(),
                ),
                BudgetsAction::Progress { id } => commands::cmd_budgets_progress(&db, &id).await,
                BudgetsAction::Alerts { id, approaching } => {
                    commands::cmd_budgets_alerts(&db, &id, approaching).await
                }
                BudgetsAction::Delete { id } => commands::cmd_budgets_delete(&db, &id),
            }
        }
        Commands::Credit { action } => match action {
            CreditAction::Score { user, bureau } => commands::cmd_credit_score(&bureau, &user).await,
            CreditAction::Report { user, bureau, json } => {
                commands::cmd_credit_report(&bureau, &user, json).await
            }
        },
        Commands::Scaffold {
            domain,
            dest_dir,
            entity,
            table,
            include_tenant,
            overwrite,
        } => commands::cmd_scaffold(
            &domain,
            &dest_dir,
            entity,
            table,
            include_tenant,
            overwrite,
        ),
    }
}
