use contend_config::{ConfigError, LabConfig};
use contend_sync::{BufferError, WaitError};
use contend_testing::{HarnessError, PoolError, Strategy};
use derive_more::From;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod buffer;
mod race;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, From)]
pub enum CliError {
    Config(ConfigError),
    Buffer(BufferError),
    Pool(PoolError),
    Harness(HarnessError),
    Wait(WaitError),
    #[from(ignore)]
    Incorrect(Vec<Strategy>),
}

impl std::error::Error for CliError {}

impl core::fmt::Display for CliError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CliError::Config(err) => write!(f, "config: {err}"),
            CliError::Buffer(err) => write!(f, "buffer: {err}"),
            CliError::Pool(err) => write!(f, "pool: {err}"),
            CliError::Harness(err) => write!(f, "harness: {err}"),
            CliError::Wait(err) => write!(f, "run gave up: {err}"),
            CliError::Incorrect(strategies) => {
                write!(f, "synchronized strategies lost updates: {strategies:?}")
            }
        }
    }
}

fn main() -> std::result::Result<(), BoxedError> {
    let commander = race::register(buffer::register(
        clap::Command::new("contend")
            .about("Bounded buffer and shared counter contention demos")
            .arg_required_else_help(true)
            .arg(
                clap::Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .global(true)
                    .action(clap::ArgAction::Count)
                    .help("raise log verbosity (-v debug, -vv trace)"),
            ),
    ));

    let matches = commander.get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("buffer", arguments)) => buffer::run(arguments)?,
        Some(("race", arguments)) => race::run(arguments)?,
        _ => {}
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_thread_names(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber was already installed");
    }
}

/// Shared `--config` argument.
pub(crate) fn config_arg() -> clap::Arg {
    clap::Arg::new("config")
        .short('c')
        .long("config")
        .action(clap::ArgAction::Set)
        .value_parser(clap::value_parser!(std::path::PathBuf))
        .help("TOML file with [counter] and [buffer] sections")
}

/// The `--config` file if one was given, defaults otherwise.
pub(crate) fn lab_config(args: &clap::ArgMatches) -> Result<LabConfig, CliError> {
    match args.get_one::<std::path::PathBuf>("config") {
        Some(path) => Ok(contend_config::load_lab_config(path)?),
        None => Ok(LabConfig::default()),
    }
}
