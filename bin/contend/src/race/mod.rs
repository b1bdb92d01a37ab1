use contend_testing::{ComparisonReport, CounterHarness, Strategy, WorkerPool};

use crate::CliError;

pub fn register(command: clap::Command) -> clap::Command {
    command.subcommand(
        clap::Command::new("race")
            .about("increments a shared counter from several workers with each strategy")
            .arg(crate::config_arg())
            .arg(
                clap::Arg::new("workers")
                    .short('w')
                    .long("workers")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                clap::Arg::new("increments")
                    .short('n')
                    .long("increments")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                clap::Arg::new("strategy")
                    .short('s')
                    .long("strategy")
                    .action(clap::ArgAction::Append)
                    .value_parser(clap::value_parser!(Strategy))
                    .help("repeatable; defaults to every strategy"),
            )
            .arg(
                clap::Arg::new("timeout")
                    .long("timeout-ms")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(u64)),
            ),
    )
}

pub fn run(args: &clap::ArgMatches) -> std::result::Result<(), CliError> {
    let mut section = crate::lab_config(args)?.counter;

    if let Some(workers) = args.get_one::<usize>("workers") {
        section.workers = *workers;
    }
    if let Some(increments) = args.get_one::<usize>("increments") {
        section.increments = *increments;
    }
    if let Some(strategies) = args.get_many::<Strategy>("strategy") {
        section.strategies = strategies.copied().collect();
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        section.timeout_ms = Some(*timeout);
    }

    let config = section.harness_config();
    let pool = WorkerPool::new(section.workers.max(1))?;
    let harness = CounterHarness::new(&pool);
    let reports = harness.compare(&config, &section.strategies)?;

    let table = ComparisonReport::new(
        format!("{} workers x {} increments", section.workers, section.increments),
        &reports,
    );
    println!("{table}");

    let broken: Vec<Strategy> = table
        .incorrect()
        .filter(|strategy| strategy.is_synchronized())
        .collect();
    if broken.is_empty() {
        Ok(())
    } else {
        Err(CliError::Incorrect(broken))
    }
}
