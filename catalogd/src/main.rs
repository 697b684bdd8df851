use catalogd::config::{Args, Command, Config};
use catalogd::db::handlers::{Economies, Indicators, Repository, Users};
use catalogd::db::pools;
use clap::Parser;
use std::io::{BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// The reset gate: proceeds only on a literal `yes`.
fn confirm_reset() -> anyhow::Result<bool> {
    print!("This deletes ALL catalog data. Type 'yes' to continue: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "yes")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    let pool = pools::create_pool(&config.database).await?;

    match args.command {
        Some(Command::Migrate) | None => {
            catalogd::migrator().run(&pool).await?;
            tracing::info!("migrations applied");
        }
        Some(Command::Reset { yes }) => {
            if !yes && !confirm_reset()? {
                println!("Aborted.");
                return Ok(());
            }
            catalogd::migrator().run(&pool).await?;
            let mut tx = pool.begin().await?;
            // users cascades through providers, permissions, and indicators;
            // the rest is cleared explicitly so nothing survives a reset
            Users::new(&mut tx).truncate_cascade().await?;
            Economies::new(&mut tx).truncate_cascade().await?;
            Indicators::new(&mut tx).truncate_cascade().await?;
            tx.commit().await?;
            tracing::info!("all tables truncated");
        }
    }

    pool.close().await;
    Ok(())
}
