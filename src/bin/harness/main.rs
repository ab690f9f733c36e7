use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use tracing::Level;

use xorsync::{ingest, Config, Index, Party, Session};

/// Reconciles the two record sets described by the input and prints what
/// each party found, one `xor,<party>,<HAVE|NEED>,<id>` line per id.
#[derive(Debug, Parser)]
#[command(name = "xorsync-harness", version)]
struct Cli {
    /// Input file with `holder,timestamp,hex_id` lines. Reads stdin if omitted.
    input: Option<PathBuf>,

    /// Id width in bytes.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u8).range(8..=32))]
    id_size: u8,

    #[arg(long, default_value_t = Config::DEFAULT_BUCKETS)]
    buckets: usize,

    /// Defaults to twice the bucket count.
    #[arg(long)]
    skip_threshold: Option<usize>,

    #[arg(long, default_value_t = Config::DEFAULT_MAX_EXCHANGES)]
    max_exchanges: usize,

    /// Log more to stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xorsync-harness: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> xorsync::Result<()> {
    let config = Config {
        buckets: cli.buckets,
        skip_threshold: cli.skip_threshold.unwrap_or(2 * cli.buckets),
        max_exchanges: cli.max_exchanges,
    };

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };

    macro_rules! dispatch {
        ($($w:literal)*) => {
            match cli.id_size {
                $($w => reconcile_sets::<$w>(input, config),)*
                _ => unreachable!("id size is range checked by clap"),
            }
        };
    }

    dispatch!(8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32)
}

fn reconcile_sets<const W: usize>(input: impl BufRead, config: Config) -> xorsync::Result<()> {
    let mut a = Index::<W>::new();
    let mut b = Index::<W>::new();
    ingest::load(input, &mut a, &mut b)?;
    a.seal()?;
    b.seal()?;

    let report = Session::new(&a, &b, config)?.run()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for exchange in &report.exchanges {
        let party = match exchange.party {
            Party::A => 1,
            Party::B => 2,
        };
        for id in &exchange.have {
            writeln!(out, "xor,{party},HAVE,{id}")?;
        }
        for id in &exchange.need {
            writeln!(out, "xor,{party},NEED,{id}")?;
        }
    }
    out.flush()?;

    Ok(())
}
