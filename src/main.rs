use clap::Parser;
use log::{debug, warn};
use snafu::ErrorCompat;

mod args;
mod report;

fn main() {
    let args = args::Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    if let Err(e) = report::run_report(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
