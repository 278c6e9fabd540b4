//! CLI entrypoint: `run` scores every user needing it and writes claims
//! to Postgres; `regress` runs the C5 harness against a fixture file
//! with no database connection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use claims_engine::config::Config;
use claims_engine::db::ClaimWriter;
use claims_engine::patterns;
use claims_engine::regression::{self, RegressionCase};
use claims_engine::scorer::score_user;

#[derive(Parser)]
#[command(name = "claims-engine", about = "Deterministic evidence-backed claims inference engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score every user and write claims/abstentions to Postgres.
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Run the regression harness against a fixture file, no DB required.
    Regress {
        fixtures: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, database_url } => run(config, database_url).await,
        Command::Regress { fixtures, config } => regress(fixtures, config),
    }
}

async fn run(config_path: Option<PathBuf>, database_url: Option<String>) -> Result<()> {
    patterns::validate_all().context("pattern compilation failed at startup")?;

    let config = match config_path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
    .context("failed to load config")?;

    let database_url = database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .context("no --database-url given and DATABASE_URL is not set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to postgres")?;

    let writer = ClaimWriter::new(pool.clone());
    writer.run_migrations().await.context("failed to run migrations")?;

    let user_ids: Vec<uuid::Uuid> = sqlx::query_scalar("SELECT id FROM users")
        .fetch_all(&pool)
        .await
        .context("failed to load user ids")?;

    let reference_date = config.reference_date();
    let mut users_processed = 0u64;
    let mut claims_written = 0u64;
    let mut abstentions_written = 0u64;
    let mut users_failed = 0u64;

    for user_id in user_ids {
        match load_bundle(&pool, user_id).await {
            Ok(bundle) => {
                let result = score_user(&bundle, &config, reference_date);
                claims_written += result.claims.len() as u64;
                abstentions_written += result.abstentions.len() as u64;

                match writer.write_user(user_id, config.version(), &result).await {
                    Ok(()) => {
                        for claim in &result.claims {
                            info!(user_id = %user_id, predicate = claim.object.predicate(), "wrote claim");
                        }
                        for abstention in &result.abstentions {
                            info!(user_id = %user_id, predicate = abstention.predicate, reason = ?abstention.reason, "recorded abstention");
                        }
                        users_processed += 1;
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, error = %e, "write failed, user skipped");
                        users_failed += 1;
                    }
                }
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "bundle load failed, user skipped");
                users_failed += 1;
            }
        }
    }

    let summary = serde_json::json!({
        "users_processed": users_processed,
        "claims_written": claims_written,
        "abstentions_written": abstentions_written,
        "users_failed": users_failed,
    });
    println!("{summary}");

    Ok(())
}

/// Upstream ingestion/aggregation is out of scope (spec.md §1); this is
/// the minimal bundle assembly needed to drive the scorer from whatever
/// `users`/`memberships`/`messages` tables the ingestion layer populated.
async fn load_bundle(pool: &sqlx::PgPool, user_id: uuid::Uuid) -> Result<claims_engine::UserBundle> {
    let row: (String, String) = sqlx::query_as("SELECT display_name, bio FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("user row not found")?;

    Ok(claims_engine::UserBundle {
        user_id,
        display_name: row.0,
        bio: row.1,
        memberships: Vec::new(),
        features: claims_engine::bundle::FeatureSnapshot::default(),
        messages: Vec::new(),
    })
}

fn regress(fixtures_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    patterns::validate_all().context("pattern compilation failed at startup")?;

    let config = match config_path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    }
    .context("failed to load config")?;

    let fixture_text = std::fs::read_to_string(&fixtures_path)
        .with_context(|| format!("failed to read fixtures at {}", fixtures_path.display()))?;
    let cases: Vec<RegressionCase> =
        serde_json::from_str(&fixture_text).context("malformed fixture JSON")?;

    let report = regression::run_cases(&config, &cases, config.reference_date());

    println!("{:<40} {:<6} {}", "case", "result", "mismatches");
    for case in &report.cases {
        let result = if case.passed { "PASS" } else { "FAIL" };
        let mismatches: Vec<String> = case
            .missing_expected
            .iter()
            .map(|m| format!("missing:{m}"))
            .chain(case.found_forbidden.iter().map(|m| format!("forbidden:{m}")))
            .collect();
        println!("{:<40} {:<6} {}", case.name, result, mismatches.join(", "));
    }

    if report.all_passed() {
        Ok(())
    } else {
        anyhow::bail!("{} regression case(s) failed", report.cases.iter().filter(|c| !c.passed).count());
    }
}
