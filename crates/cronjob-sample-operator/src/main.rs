use clap::Parser;
use cronjob_sample_api::{
    CustomResourceExt,
    scheme::{self, Scheme},
    v1::{self, CronJobSample},
    yaml,
};
use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::cli::{Command, CrdArguments, DecodeArguments, Opts};

mod cli;
mod decode;
mod logging;

const APP_NAME: &str = "cronjob-sample-operator";
const LOG_ENV: &str = "CRONJOB_SAMPLE_OPERATOR_LOG";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to initialize logging"))]
    InitializeLogging { source: logging::Error },

    #[snafu(display("failed to register API kinds"))]
    RegisterKinds { source: scheme::Error },

    #[snafu(display("failed to print CRD"))]
    PrintCrd { source: yaml::Error },

    #[snafu(display("failed to write CRD"))]
    WriteCrd { source: yaml::Error },

    #[snafu(display("failed to describe manifests"))]
    DescribeManifests { source: decode::Error },
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let opts = Opts::parse();
    logging::initialize_logging(LOG_ENV, APP_NAME).context(InitializeLoggingSnafu)?;

    match opts.command {
        Command::Crd(CrdArguments { output: None }) => {
            CronJobSample::print_yaml_schema().context(PrintCrdSnafu)?;
        }
        Command::Crd(CrdArguments { output: Some(path) }) => {
            CronJobSample::write_yaml_schema(&path).context(WriteCrdSnafu)?;
            info!(path = %path.display(), "wrote CRD");
        }
        Command::Decode(DecodeArguments { files }) => {
            let mut scheme = Scheme::new();
            v1::add_to_scheme(&mut scheme).context(RegisterKindsSnafu)?;

            for path in &files {
                for line in decode::describe_file(&scheme, path).context(DescribeManifestsSnafu)? {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}
