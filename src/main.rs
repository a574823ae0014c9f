mod cli;

use std::process;

use cli::commands::Command;
use cli::Abagent;
use structopt::StructOpt;

fn main() {
    env_logger::init();

    #[cfg(feature = "instrumentation")]
    abagent::instrumentation::init_tracing();

    let result = Abagent::from_args().execute();

    #[cfg(feature = "instrumentation")]
    abagent::instrumentation::print_timing_statistics();

    if let Err(error) = result {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
