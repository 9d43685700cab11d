use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Consolidate stacked spreadsheet tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract every table from the inputs and consolidate them into one workbook
    Consolidate(ConsolidateArgs),
    /// List the tables found in each input without consolidating
    Tables(TablesArgs),
    /// Show the target column order consolidation would use for the inputs
    Columns(ColumnsArgs),
}

#[derive(Debug, Args)]
pub struct ConsolidateArgs {
    /// One or more Excel workbooks to consolidate
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Destination workbook for the consolidated table
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Reference schema JSON overriding the built-in column template
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,
    /// Write the anomaly report to this file instead of logging it
    #[arg(long = "anomalies")]
    pub anomalies: Option<PathBuf>,
    /// Write the integrity validation report to this file instead of logging it
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// Write the validation summary as JSON to this file
    #[arg(long = "summary")]
    pub summary: Option<PathBuf>,
    /// Skip the post-consolidation integrity validation
    #[arg(long = "skip-validation")]
    pub skip_validation: bool,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// One or more Excel workbooks to inspect
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// One or more Excel workbooks to inspect
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Reference schema JSON overriding the built-in column template
    #[arg(short = 's', long = "schema")]
    pub schema: Option<PathBuf>,
}
