use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oportuna", about = "Opportunity recommendation engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ranked recommendations for a user
    Recommend {
        user_id: i64,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Per-strategy breakdown for one recommendation
    Explain { user_id: i64, opportunity_id: i64 },
    /// Recompute a user's recommendations (all strategies, or one with --strategy)
    Refresh {
        user_id: i64,
        /// Recompute only this strategy (common_interests, popular)
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Recompute recommendations for every eligible student
    RefreshAll {
        /// Pause between users, in seconds
        #[arg(long, default_value = "2")]
        delay: u64,
    },
    /// Deactivate every user's recommendations for an opportunity
    InvalidateOpportunity { opportunity_id: i64 },
    /// Deactivate all of a user's recommendations
    InvalidateUser { user_id: i64 },
    /// Recommendation system statistics
    Stats,
    /// Delete recommendations inactive longer than the retention window
    Purge {
        #[arg(long, default_value = "30")]
        days: i64,
    },
    /// Run the periodic background refresh loop
    Worker {
        #[arg(long, default_value = "2")]
        interval_hours: u64,
    },
    /// Register a user
    UserAdd {
        /// JSON with name, email, is_student, email_verified, interests
        json: String,
    },
    /// Register an interest
    InterestAdd {
        name: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Post an opportunity
    OpportunityAdd {
        /// JSON with title, description, status, deadline, interests
        json: String,
    },
    /// Change an opportunity's status (closing one invalidates its recommendations)
    OpportunityStatus {
        opportunity_id: i64,
        /// aguardando, em_analise, finalizada, encerrada, em_andamento
        status: String,
    },
    /// Replace a user's declared interests
    UserInterests {
        user_id: i64,
        interest_ids: Vec<i64>,
    },
    /// Submit an application
    Apply { user_id: i64, opportunity_id: i64 },
    /// Withdraw an application
    Withdraw { user_id: i64, opportunity_id: i64 },
}
