use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, warn};
use srix_tools::config::CONFIG_PATH;
use srix_tools::otp::{reset_otp, ResetOptions};
use srix_tools::reader::nfc;
use srix_tools::{presenter, Config, Interrupt, Result, TagVariant};

/// Reset the resettable OTP area of the SRIX4K tag on the reader.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// libnfc connection string of the reader (first reader found by default)
    #[arg(short, long)]
    device: Option<String>,

    /// Decrement the reset counter even when it is already zero
    #[arg(long, default_value = "false")]
    allow_counter_wrap: bool,
}

fn run(args: &Args, config: &Config) -> Result<()> {
    if config.tag_type != TagVariant::Srix4k {
        warn!("OTP reset targets SRIX4K tags, ignoring tag_type {}", config.tag_type);
    }

    let options = ResetOptions {
        skip_confirmation: config.skip_confirmation,
        allow_counter_wrap: args.allow_counter_wrap,
    };
    let interrupt = Interrupt::install()?;
    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();

    let outcome = nfc::with_tag(args.device.as_deref(), &interrupt, &mut out, |tag, out| {
        reset_otp(tag, options, &mut input, out)
    })?;
    debug!("OTP reset finished: {:?}", outcome);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            presenter::init_logging(false);
            presenter::report_failure(&err);
            return ExitCode::FAILURE;
        }
    };
    presenter::init_logging(config.verbose);

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            presenter::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
