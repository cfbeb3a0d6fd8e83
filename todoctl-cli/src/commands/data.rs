//! Data maintenance commands: seed, clear, generate, stats

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use todoctl_core::fixtures::{self, Profile};
use todoctl_core::stats::percentage;
use todoctl_core::{open_store, StoreConfig, TodoFilter, TodoStats, TodoStore};

use crate::ui;

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// JSON array of todos to import
    #[arg(long, short = 'f', default_value = "data/seed.json")]
    pub file: PathBuf,
}

/// Fixture flavor
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileArg {
    /// Uniform random titles, dates within six months
    Basic,
    /// Templated titles, recency-weighted dates, correlated completion
    Realistic,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Basic => Profile::Basic,
            ProfileArg::Realistic => Profile::Realistic,
        }
    }
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Number of todos to generate
    #[arg(long, short = 'n', default_value_t = 1000)]
    pub count: usize,

    /// Fixture profile
    #[arg(long, value_enum, default_value_t = ProfileArg::Basic)]
    pub profile: ProfileArg,

    /// Todos inserted per batch
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Seed the random generator for reproducible data
    #[arg(long)]
    pub rng_seed: Option<u64>,
}

async fn connect(config: &StoreConfig) -> Result<std::sync::Arc<dyn TodoStore>> {
    open_store(config)
        .await
        .with_context(|| format!("Failed to open store {}", config.describe()))
}

/// Clear the collection, then import a seed file with fresh timestamps
pub async fn run_seed(args: SeedArgs, config: &StoreConfig) -> Result<()> {
    let records = fixtures::load_seed_file(&args.file)
        .await
        .with_context(|| format!("Failed to read seed file {}", args.file.display()))?;

    let store = connect(config).await?;
    let result = async {
        let removed = store.clear().await.context("Failed to clear todos")?;
        tracing::info!(removed, "cleared existing todos");
        store.import(records).await.context("Failed to import seed data")
    }
    .await;
    store.shutdown().await;

    let inserted = result?;
    println!("Seed completed. Inserted {} todos.", inserted);
    Ok(())
}

/// Delete every todo
pub async fn run_clear(config: &StoreConfig) -> Result<()> {
    let store = connect(config).await?;
    let result = store.clear().await.context("Failed to clear todos");
    store.shutdown().await;

    println!("Removed {} todos.", result?);
    Ok(())
}

async fn insert_generated(store: &dyn TodoStore, args: &GenerateArgs) -> Result<usize> {
    let mut rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let profile = Profile::from(args.profile);
    let batch_size = usize::try_from(args.batch_size).unwrap_or(usize::MAX);

    let removed = store.clear().await.context("Failed to clear todos")?;
    tracing::info!(removed, "cleared existing todos");

    let pb = ui::progress_bar(args.count as u64, "Generating todos");
    let mut inserted = 0;
    while inserted < args.count {
        let batch = fixtures::generate(&mut rng, profile, batch_size.min(args.count - inserted));
        match store.import(batch).await {
            Ok(n) => inserted += n,
            Err(e) => {
                ui::finish_error(pb, format!("failed after {} todos", inserted));
                return Err(e).context("Failed to insert generated todos");
            }
        }
        if let Some(pb) = &pb {
            pb.set_position(inserted as u64);
        }
        tracing::debug!(inserted, total = args.count, "batch inserted");
    }
    ui::finish_success(pb, format!("Generated {} todos", inserted));
    Ok(inserted)
}

/// Replace all todos with generated fixtures and print the resulting stats
pub async fn run_generate(args: GenerateArgs, config: &StoreConfig) -> Result<()> {
    let store = connect(config).await?;
    let result = async {
        let inserted = insert_generated(store.as_ref(), &args).await?;
        let stats = fetch_stats(store.as_ref()).await?;
        Ok::<_, anyhow::Error>((inserted, stats))
    }
    .await;
    store.shutdown().await;

    let (inserted, stats) = result?;
    println!("Generation completed: {} todos created", inserted);
    println!();
    print_stats(&stats);
    Ok(())
}

/// Print the statistics summary
pub async fn run_stats(config: &StoreConfig) -> Result<()> {
    let store = connect(config).await?;
    let result = fetch_stats(store.as_ref()).await;
    store.shutdown().await;

    print_stats(&result?);
    Ok(())
}

async fn fetch_stats(store: &dyn TodoStore) -> Result<TodoStats> {
    let todos = store
        .list(&TodoFilter::default())
        .await
        .context("Failed to fetch todos")?;
    Ok(TodoStats::from_todos(&todos))
}

fn format_stats(stats: &TodoStats) -> String {
    format!(
        "Total:           {}\n\
         Completed:       {} ({}%)\n\
         Pending:         {} ({}%)\n\
         High priority:   {}\n\
         Medium priority: {}\n\
         Low priority:    {}",
        stats.total,
        stats.completed,
        stats.completion_rate,
        stats.pending,
        percentage(stats.pending, stats.total),
        stats.by_priority.high,
        stats.by_priority.medium,
        stats.by_priority.low,
    )
}

fn print_stats(stats: &TodoStats) {
    println!("{}", format_stats(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoctl_core::stats::PriorityCounts;

    #[test]
    fn stats_block_lists_every_count() {
        let stats = TodoStats {
            total: 3,
            completed: 1,
            pending: 2,
            completion_rate: 33,
            by_priority: PriorityCounts {
                high: 1,
                medium: 2,
                low: 0,
            },
        };
        let text = format_stats(&stats);
        assert!(text.contains("Total:           3"));
        assert!(text.contains("Completed:       1 (33%)"));
        assert!(text.contains("Pending:         2 (67%)"));
        assert!(text.contains("Medium priority: 2"));
    }

    #[test]
    fn profile_arg_maps_to_fixture_profile() {
        assert_eq!(Profile::from(ProfileArg::Realistic), Profile::Realistic);
        assert_eq!(Profile::from(ProfileArg::Basic), Profile::Basic);
    }
}
