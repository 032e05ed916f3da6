use clap::Parser;
use log::{debug, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::survey::config_reader::{read_config, SurveyConfig};

mod args;
mod survey;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
    debug!("main: args: {:?}", args);

    let config = match &args.config {
        Some(path) => read_config(path),
        None => Ok(SurveyConfig::default()),
    }
    .map(|c| c.with_overrides(args.responses.clone(), args.schema.clone()));

    let res = config.and_then(|c| survey::run(&c, &args.command));

    if let Err(e) = res {
        warn!("main: error: {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
