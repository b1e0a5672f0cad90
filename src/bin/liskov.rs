use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use liskov::cli::args::{CliArgs, Command};
use liskov::cli::driver;
use liskov::cli::reporter::{Reporter, to_json};

/// Exit status when the pair is unrelated (`check`) or an expectation failed (`run`).
const EXIT_NEGATIVE: i32 = 1;

fn main() -> Result<()> {
    // No-op unless LISKOV_LOG or RUST_LOG is set; presets in src/tracing_config.rs.
    liskov::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let reporter = Reporter::new(std::io::stdout().is_terminal());

    let success = match &args.command {
        Command::Check(check) => {
            let loaded = driver::load(&check.universe)?;
            let options = driver::effective_options(args.max_depth, &loaded.file);
            let outcome =
                driver::check_query(&loaded.universe, options, &check.source, &check.target)?;
            if check.json {
                println!("{}", to_json(&outcome)?);
            } else {
                println!("{}", reporter.format_check(&outcome));
            }
            outcome.related
        }
        Command::Run(run) => {
            let loaded = driver::load(&run.universe)?;
            let options = driver::effective_options(args.max_depth, &loaded.file);
            let summary = driver::run_queries(&loaded.universe, &loaded.file, options)?;
            if run.json {
                println!("{}", to_json(&summary)?);
            } else {
                println!("{}", reporter.format_run(&summary));
            }
            summary.all_passed()
        }
    };

    if !success {
        std::process::exit(EXIT_NEGATIVE);
    }
    Ok(())
}
