use clap::{Args, Parser, Subcommand};
use log::*;
use simplelog::*;
use std::fs::File;

use lateshow::config::{normalize_database_url, Config};
use lateshow::{interface, sources, Database};

const LOG_FILE: &str = "lateshow.log";

#[derive(Debug, Parser)]
#[command(name = "lateshow", version, about = "Late show guest ratings over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Address to bind (overrides LATESHOW_HOST).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides LATESHOW_PORT).
        #[arg(long)]
        port: Option<u16>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Reset the database to the initial episodes, guests and appearances.
    Seed {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Sqlite database (overrides DATABASE_URL).
    #[arg(long)]
    database_url: Option<String>,
    /// Log at debug level.
    #[arg(long)]
    debug: bool,
}

impl CommonArgs {
    fn apply(self, config: &mut Config) {
        if let Some(url) = self.database_url {
            config.database_url = normalize_database_url(&url);
        }
        config.debug |= self.debug;
    }
}

fn init_logging(debug: bool) -> eyre::Result<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(level, simplelog::Config::default(), File::create(LOG_FILE)?),
    ])?;
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Command::Serve { host, port, common } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            common.apply(&mut config);
            init_logging(config.debug)?;

            interface::run(&config).await
        }
        Command::Seed { common } => {
            common.apply(&mut config);
            init_logging(config.debug)?;

            let db = Database::open(&config.database_url)?;
            let summary = sources::seed(&db)?;
            info!(
                "Database seeded successfully! ({} episodes, {} guests, {} appearances)",
                summary.episodes, summary.guests, summary.appearances
            );
            Ok(())
        }
    }
}
