use clap::Parser;
use oportuna::application::service::DEFAULT_RETENTION_DAYS;
use oportuna::application::worker::RecommendationWorker;
use oportuna::cli::commands::{Cli, Commands};
use oportuna::domain::values::opportunity_status::OpportunityStatus;
use oportuna::Oportuna;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("OPORTUNA_DB").unwrap_or_else(|_| "./oportuna.db".into());

    let op = match Oportuna::new(&db_path) {
        Ok(op) => op,
        Err(e) => {
            eprintln!("Error initializing oportuna: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(op, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(op: Oportuna, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Recommend { user_id, limit } => {
            let recommendations = op.recommendations(user_id, limit)?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        Commands::Explain {
            user_id,
            opportunity_id,
        } => match op.explanation(user_id, opportunity_id)? {
            Some(explanation) => println!("{}", serde_json::to_string_pretty(&explanation)?),
            None => {
                eprintln!("No active recommendation for user {user_id} and opportunity {opportunity_id}");
                std::process::exit(1);
            }
        },
        Commands::Refresh { user_id, strategy } => {
            let count = match strategy {
                Some(name) => op.refresh_strategy(user_id, &name)?,
                None => op.refresh_user(user_id)?,
            };
            println!("Stored recommendations for {count} opportunities");
        }
        Commands::RefreshAll { delay } => {
            let outcome = op.refresh_all_users(Duration::from_secs(delay))?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::InvalidateOpportunity { opportunity_id } => {
            let count = op.invalidate_opportunity(opportunity_id)?;
            println!("Invalidated {count} recommendations for opportunity {opportunity_id}");
        }
        Commands::InvalidateUser { user_id } => {
            let count = op.invalidate_user(user_id)?;
            println!("Invalidated {count} recommendations for user {user_id}");
        }
        Commands::Stats => {
            let stats = op.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Purge { days } => {
            let count = op.purge(days)?;
            println!("Purged {count} inactive recommendations");
        }
        Commands::Worker { interval_hours } => {
            let worker = Arc::new(RecommendationWorker::new(
                op.service(),
                Duration::from_secs(interval_hours * 60 * 60),
                DEFAULT_RETENTION_DAYS,
            ));
            let handle = worker.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.request_stop();
                }
            });
            worker.run().await?;
        }
        Commands::UserAdd { json } => {
            let data: serde_json::Value = serde_json::from_str(&json)?;
            let name = data["name"]
                .as_str()
                .ok_or("Missing required field: name")?;
            let email = data["email"]
                .as_str()
                .ok_or("Missing required field: email")?;
            let is_student = data["is_student"].as_bool().unwrap_or(false);
            let email_verified = data["email_verified"].as_bool().unwrap_or(false);
            let interests: Vec<i64> = data["interests"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_i64()).collect())
                .unwrap_or_default();
            let id = op.user_add(name, email, is_student, email_verified, &interests)?;
            println!("Created user {id}");
        }
        Commands::InterestAdd { name, category } => {
            let id = op.interest_add(&name, category.as_deref())?;
            println!("Created interest {id}");
        }
        Commands::OpportunityAdd { json } => {
            let data: serde_json::Value = serde_json::from_str(&json)?;
            let title = data["title"]
                .as_str()
                .ok_or("Missing required field: title")?;
            let description = data["description"]
                .as_str()
                .ok_or("Missing required field: description")?;
            let status: OpportunityStatus = data["status"]
                .as_str()
                .unwrap_or("aguardando")
                .parse()
                .map_err(|e: String| e)?;
            let deadline = data["deadline"]
                .as_str()
                .map(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .transpose()?;
            let interests: Vec<i64> = data["interests"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_i64()).collect())
                .unwrap_or_default();
            let id = op.opportunity_add(title, description, status, deadline, &interests)?;
            println!("Created opportunity {id}");
        }
        Commands::OpportunityStatus {
            opportunity_id,
            status,
        } => {
            let status: OpportunityStatus = status.parse().map_err(|e: String| e)?;
            op.opportunity_set_status(opportunity_id, status)?;
            println!("Opportunity {opportunity_id} is now {status}");
        }
        Commands::UserInterests {
            user_id,
            interest_ids,
        } => {
            op.user_set_interests(user_id, &interest_ids)?;
            println!("Updated interests for user {user_id}");
        }
        Commands::Apply {
            user_id,
            opportunity_id,
        } => {
            op.apply(user_id, opportunity_id)?;
            println!("User {user_id} applied to opportunity {opportunity_id}");
        }
        Commands::Withdraw {
            user_id,
            opportunity_id,
        } => {
            op.withdraw(user_id, opportunity_id)?;
            println!("User {user_id} withdrew from opportunity {opportunity_id}");
        }
    }
    Ok(())
}
