use contend_sync::{BoundedBuffer, BufferStyle};
use contend_testing::run_producer_consumer;

use crate::CliError;

pub fn register(command: clap::Command) -> clap::Command {
    command.subcommand(
        clap::Command::new("buffer")
            .about("runs one paced producer and one paced consumer over a bounded buffer")
            .arg(crate::config_arg())
            .arg(
                clap::Arg::new("style")
                    .short('s')
                    .long("style")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(BufferStyle))
                    .help("monitor or semaphore"),
            )
            .arg(
                clap::Arg::new("capacity")
                    .long("capacity")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                clap::Arg::new("items")
                    .long("items")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                clap::Arg::new("producer_delay")
                    .long("producer-delay-ms")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(u64)),
            )
            .arg(
                clap::Arg::new("consumer_delay")
                    .long("consumer-delay-ms")
                    .action(clap::ArgAction::Set)
                    .value_parser(clap::value_parser!(u64)),
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
    let mut section = crate::lab_config(args)?.buffer;

    if let Some(style) = args.get_one::<BufferStyle>("style") {
        section.style = *style;
    }
    if let Some(capacity) = args.get_one::<usize>("capacity") {
        section.capacity = *capacity;
    }
    if let Some(items) = args.get_one::<usize>("items") {
        section.items = *items;
    }
    if let Some(delay) = args.get_one::<u64>("producer_delay") {
        section.producer_delay_ms = *delay;
    }
    if let Some(delay) = args.get_one::<u64>("consumer_delay") {
        section.consumer_delay_ms = *delay;
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        section.timeout_ms = Some(*timeout);
    }

    let buffer = BoundedBuffer::with_style(section.style, section.capacity)?;
    let outcome = run_producer_consumer(&buffer, &section.scenario_config())?;

    println!(
        "{} buffer (capacity {}): consumed {:?}, peak length {}, took {:?}",
        section.style, section.capacity, outcome.consumed, outcome.peak_len, outcome.elapsed
    );
    Ok(())
}
