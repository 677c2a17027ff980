use clap::{Args, Parser, Subcommand, ValueEnum};
use ratemeter::RateUnit;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy stdin to stdout while metering throughput
    Pipe(Pipe),
    /// Mark synthetic events from worker threads and report the rates
    Simulate(Simulate),
}

#[derive(Parser, Clone, Debug)]
pub struct Pipe {
    /// Count lines instead of bytes
    #[arg(long)]
    pub lines: bool,

    /// Read buffer size in bytes
    #[arg(long, default_value_t = 8192, value_parser = clap::value_parser!(u64).range(1..))]
    pub buffer: u64,

    #[command(flatten)]
    pub report: Report,
}

#[derive(Parser, Clone, Debug)]
pub struct Simulate {
    /// Number of worker threads
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..=1024))]
    pub threads: u64,

    /// Target aggregate events per second across all workers
    #[arg(long, default_value_t = 100.0)]
    pub rate: f64,

    /// How long to run, in seconds (runs until Ctrl-C when omitted)
    #[arg(long)]
    pub duration: Option<u64>,

    #[command(flatten)]
    pub report: Report,
}

#[derive(Args, Clone, Debug)]
pub struct Report {
    /// Seconds between periodic reports
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Unit rates are reported per
    #[arg(long, value_enum, default_value_t = UnitOpt::Seconds)]
    pub unit: UnitOpt,

    /// Format of the final summary
    #[arg(long, value_enum, default_value_t = FormatOpt::Text)]
    pub format: FormatOpt,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum UnitOpt {
    Seconds,
    Minutes,
    Hours,
}

impl From<UnitOpt> for RateUnit {
    fn from(v: UnitOpt) -> Self {
        match v {
            UnitOpt::Seconds => RateUnit::Seconds,
            UnitOpt::Minutes => RateUnit::Minutes,
            UnitOpt::Hours => RateUnit::Hours,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatOpt {
    Text,
    Json,
}
