use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use srix_tools::config::CONFIG_PATH;
use srix_tools::dump::dump_eeprom;
use srix_tools::reader::nfc;
use srix_tools::{presenter, Config, Interrupt, Result};

/// Print every EEPROM block of the SRI512/SRIX4K tag on the reader.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file
    #[arg(short, long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// libnfc connection string of the reader (first reader found by default)
    #[arg(short, long)]
    device: Option<String>,
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let interrupt = Interrupt::install()?;
    let mut out = io::stdout().lock();

    nfc::with_tag(args.device.as_deref(), &interrupt, &mut out, |tag, out| {
        dump_eeprom(tag, config.tag_type, out).map(|_| ())
    })
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
