mod database;
mod schema;
mod status;

use std::{path::PathBuf, process::ExitCode};

use clap::{Args as ClapArgs, Parser, Subcommand};
use database::{Init, Reset};
use mbs_orm::DatabaseConfig;
use schema::{CheckSchema, DumpSchema};
use status::Status;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::{
    fmt::{format, layer},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Subcommand, Debug)]
enum Subcommands {
    Init(Init),
    Reset(Reset),
    CheckSchema(CheckSchema),
    DumpSchema(DumpSchema),
    Status(Status),
}

/// Options shared by every command. Unset options are pulled from the environment, or a
/// corresponding `.env` file.
#[derive(ClapArgs, Debug)]
pub struct Connection {
    /// The URL of the database, `DATABASE_URL` by default.
    #[arg(short, long, global = true, value_name = "DATABASE_URL")]
    database_url: Option<String>,

    /// The SQL script creating the schema, `MBS_INIT_SCRIPT` by default.
    #[arg(short, long, global = true, value_name = "PATH")]
    init_script: Option<PathBuf>,
}

impl Connection {
    pub fn config(&self) -> eyre::Result<DatabaseConfig> {
        let mut config = DatabaseConfig::from_env()?;

        if let Some(url) = &self.database_url {
            config.url.clone_from(url);
        }
        if let Some(script) = &self.init_script {
            config.init_script = Some(script.clone());
        }

        Ok(config)
    }
}

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Subcommands,

    #[command(flatten)]
    connection: Connection,

    /// Log every executed statement.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(if args.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        })
        .with(layer().event_format(format().without_time().with_target(false).compact()))
        .init();

    let r = match &args.command {
        Subcommands::Init(cmd) => cmd.run(&args.connection).await,
        Subcommands::Reset(cmd) => cmd.run(&args.connection).await,
        Subcommands::CheckSchema(cmd) => cmd.run(&args.connection).await,
        Subcommands::DumpSchema(cmd) => cmd.run(&args.connection).await,
        Subcommands::Status(cmd) => cmd.run(&args.connection).await,
    };

    if let Err(e) = r {
        error!("Command execution failed: {e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
