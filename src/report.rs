use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use ratemeter::{MeterSnapshot, Metered, RateUnit};
use tracing::info;

use crate::cli::FormatOpt;

/// Logs a snapshot every `every` until `stop` fires or its sender is dropped.
pub fn spawn_reporter<M: Metered + 'static>(
    meter: Arc<M>,
    every: Duration,
    unit: RateUnit,
    stop: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match stop.recv_timeout(every) {
            Err(RecvTimeoutError::Timeout) => {
                let snap = meter.snapshot(unit);
                info!(
                    count = snap.count,
                    mean = snap.mean_rate,
                    m1 = snap.one_minute_rate,
                    m5 = snap.five_minute_rate,
                    m15 = snap.fifteen_minute_rate,
                    unit = %unit,
                    "Rate"
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    })
}

pub fn render_summary(snap: &MeterSnapshot, format: FormatOpt) -> Result<String> {
    Ok(match format {
        FormatOpt::Text => snap.to_string(),
        FormatOpt::Json => serde_json::to_string_pretty(snap)?,
    })
}

pub fn print_summary(snap: &MeterSnapshot, format: FormatOpt) -> Result<()> {
    // stdout may be carrying piped data
    eprintln!("{}", render_summary(snap, format)?);
    Ok(())
}
