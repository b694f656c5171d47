/// This file contains all of the logic necessary to formulate a coherent
/// Config data structure for the `branchmap` driver. We use the `clap` crate
/// and parse args here
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::err::BitmapErr;
use crate::misc::parse_addr;

// Everything the driver needs to know to replay a trace
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub bitmap: String,
    pub trace: String,
    pub image_base: usize,
    pub verbose: bool,
    pub stats: bool,
}

fn command() -> Command {
    Command::new("branchmap")
    .version("0.0.1")
    .about("Branch novelty oracle for taint-guided hybrid fuzzing")
    .arg(Arg::new("bitmap")
        .long("bitmap")
        .value_name("PATH")
        .help("Shared bitmap file to load and commit to (in-memory only if omitted)"))
    .arg(Arg::new("trace")
        .long("trace")
        .value_name("PATH")
        .help("Branch trace to replay, one '<pc> <taken>' pair per line")
        .required(true))
    .arg(Arg::new("image-base")
        .long("image-base")
        .value_name("ADDR")
        .help("Load address subtracted from every pc before hashing (hex or decimal)"))
    .arg(Arg::new("verbose")
        .long("verbose")
        .help("Print every interesting branch")
        .action(ArgAction::SetTrue))
    .arg(Arg::new("stats")
        .long("stats")
        .help("Print bitmap statistics after the replay")
        .action(ArgAction::SetTrue))
}

fn from_matches(matches: &ArgMatches) -> Result<Config, BitmapErr> {
    // Unwrap safe on required arg
    let trace = matches.get_one::<String>("trace").unwrap().to_string();

    // Missing bitmap means we never touch the disk
    let bitmap = matches
        .get_one::<String>("bitmap")
        .cloned()
        .unwrap_or_default();

    let image_base = match matches.get_one::<String>("image-base") {
        None => 0,
        Some(str_repr) => {
            let Some(base) = parse_addr(str_repr) else {
                return Err(BitmapErr::from("Invalid --image-base value"));
            };

            base
        }
    };

    Ok(Config {
        bitmap,
        trace,
        image_base,
        verbose: matches.get_flag("verbose"),
        stats: matches.get_flag("stats"),
    })
}

pub fn parse_args() -> Result<Config, BitmapErr> {
    from_matches(&command().get_matches())
}
