//! Command line interface of the operator binary.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, PartialEq, Eq, Parser)]
#[command(
    name = "cronjob-sample-operator",
    author,
    version,
    about = "Tooling for the CronJobSample custom resource"
)]
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print CRD objects.
    Crd(CrdArguments),

    /// Decode manifests through the API scheme and list the objects they contain.
    Decode(DecodeArguments),
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct CrdArguments {
    /// Write the CRD to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE", env = "CRONJOB_SAMPLE_OPERATOR_CRD_OUTPUT")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct DecodeArguments {
    /// YAML manifest files, each possibly containing multiple documents
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}
