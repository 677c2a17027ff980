use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossbeam_channel as channel;
use ratemeter::{Clock, Meter, Metered};
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::Simulate;
use crate::report::{print_summary, spawn_reporter};

#[derive(Debug, Error)]
pub enum SimulateError {
    #[error("event rate must be a positive number, got {0}")]
    InvalidRate(f64),
}

pub fn run_simulate(sim: Simulate, interrupt: channel::Receiver<()>) -> Result<()> {
    if !(sim.rate.is_finite() && sim.rate > 0.0) {
        return Err(SimulateError::InvalidRate(sim.rate).into());
    }
    let meter = Arc::new(Meter::new());
    let unit = sim.report.unit.into();
    info!(threads = sim.threads, rate = sim.rate, duration = ?sim.duration, "Starting simulation");

    let (stop_tx, stop_rx) = channel::bounded::<()>(1);
    let reporter = spawn_reporter(
        Arc::clone(&meter),
        Duration::from_secs(sim.report.interval),
        unit,
        stop_rx,
    );

    let stop_flag = Arc::new(AtomicBool::new(false));
    let per_thread = sim.rate / sim.threads as f64;
    let workers: Vec<_> = (0..sim.threads)
        .map(|id| {
            let meter = Arc::clone(&meter);
            let stop = Arc::clone(&stop_flag);
            thread::spawn(move || {
                let marked = run_worker(&*meter, per_thread, &stop);
                debug!(worker = id, marked, "Worker finished");
                marked
            })
        })
        .collect();

    match sim.duration {
        Some(secs) => {
            if interrupt.recv_timeout(Duration::from_secs(secs)).is_ok() {
                info!("Interrupted");
            }
        }
        None => {
            let _ = interrupt.recv();
            info!("Interrupted");
        }
    }

    stop_flag.store(true, Ordering::Relaxed);
    let mut total = 0u64;
    for w in workers {
        total += w.join().map_err(|_| anyhow!("worker thread panicked"))?;
    }
    let _ = stop_tx.send(());
    let _ = reporter.join();

    debug!(total, count = meter.count(), "Workers joined");
    print_summary(&meter.snapshot(unit), sim.report.format)
}

/// Marks events at `per_second` until `stop` is set. Returns how many were marked.
fn run_worker<C: Clock>(meter: &Meter<C>, per_second: f64, stop: &AtomicBool) -> u64 {
    let started = Instant::now();
    let pause = Duration::from_secs_f64((1.0 / per_second).clamp(0.001, 1.0));
    let mut marked = 0u64;
    while !stop.load(Ordering::Relaxed) {
        let due = (started.elapsed().as_secs_f64() * per_second) as u64;
        if due > marked {
            meter.mark_n(due - marked);
            marked = due;
        }
        thread::sleep(pause);
    }
    marked
}
