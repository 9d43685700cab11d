pub mod cli;
pub mod columns;
pub mod consolidate;
pub mod inspect;
pub mod order;
pub mod schema;
pub mod segment;
pub mod table;
pub mod validate;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_consolidate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Consolidate(args) => consolidate::execute(&args),
        Commands::Tables(args) => inspect::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
    }
}
