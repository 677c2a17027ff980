use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use crossbeam_channel as channel;
use ratemeter::{Clock, Meter, Metered};
use tracing::{info, warn};

use crate::cli::Pipe;
use crate::report::{print_summary, spawn_reporter};

pub fn run_pipe(pipe: Pipe, interrupt: channel::Receiver<()>) -> Result<()> {
    let meter = Arc::new(Meter::new());
    let unit = pipe.report.unit.into();
    let what = if pipe.lines { "lines" } else { "bytes" };
    info!(counting = what, interval = pipe.report.interval, "Starting ratemeter pipe");

    let (stop_tx, stop_rx) = channel::bounded::<()>(1);
    let reporter = spawn_reporter(
        Arc::clone(&meter),
        Duration::from_secs(pipe.report.interval),
        unit,
        stop_rx,
    );

    let (reader, writer) = copy_metered(
        io::stdin(),
        io::stdout(),
        Arc::clone(&meter),
        pipe.lines,
        pipe.buffer as usize,
    );

    // Supervisor so the main thread can wait on the copy and Ctrl-C at once
    let (done_tx, done_rx) = channel::bounded(1);
    thread::spawn(move || {
        let res = writer.join().unwrap_or_else(|_| Err(anyhow!("writer thread panicked")));
        let _ = done_tx.send(res);
    });

    let outcome = channel::select! {
        recv(done_rx) -> res => match res {
            Ok(Ok(_stdout)) => reader
                .join()
                .unwrap_or_else(|_| Err(anyhow!("reader thread panicked"))),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(anyhow!("writer supervisor exited without a result")),
        },
        recv(interrupt) -> _ => {
            info!("Interrupted");
            Ok(())
        },
    };

    let _ = stop_tx.send(());
    let _ = reporter.join();
    print_summary(&meter.snapshot(unit), pipe.report.format)?;
    outcome
}

/// Copies `input` to `output` on two threads, marking every byte (or every
/// line when `count_lines`) that reaches `output`. The writer thread hands
/// `output` back once the input is exhausted.
pub fn copy_metered<R, W, C>(
    mut input: R,
    mut output: W,
    meter: Arc<Meter<C>>,
    count_lines: bool,
    buffer: usize,
) -> (JoinHandle<Result<()>>, JoinHandle<Result<W>>)
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
    C: Clock + 'static,
{
    let (tx, rx) = channel::bounded::<Bytes>(64);

    let reader = thread::spawn(move || -> Result<()> {
        let mut buf = vec![0u8; buffer.max(1)];
        loop {
            match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(Bytes::copy_from_slice(&buf[..n])).is_err() {
                        // Writer is gone; it reports its own error
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e).context("Reading input"),
            }
        }
        Ok(())
    });

    let writer = thread::spawn(move || -> Result<W> {
        let mut open_line = false;
        for chunk in rx {
            if let Err(e) = output.write_all(&chunk) {
                warn!(?e, "Write error");
                return Err(e).context("Writing output");
            }
            if count_lines {
                let newlines = chunk.iter().filter(|&&b| b == b'\n').count() as u64;
                meter.mark_n(newlines);
                open_line = chunk.last() != Some(&b'\n');
            } else {
                meter.mark_n(chunk.len() as u64);
            }
        }
        if open_line {
            // unterminated last line
            meter.mark();
        }
        output.flush().context("Flushing output")?;
        Ok(output)
    });

    (reader, writer)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use ratemeter::ManualClock;

    fn run(input: &[u8], count_lines: bool, buffer: usize) -> (Vec<u8>, u64) {
        let meter = Arc::new(Meter::with_clock(ManualClock::new()));
        let (reader, writer) = copy_metered(
            Cursor::new(input.to_vec()),
            Vec::new(),
            Arc::clone(&meter),
            count_lines,
            buffer,
        );
        let out = writer.join().unwrap().unwrap();
        reader.join().unwrap().unwrap();
        (out, meter.count())
    }

    #[test]
    fn copies_and_counts_bytes() {
        let data = b"hello world, this is metered".repeat(10);
        let (out, count) = run(&data, false, 7);
        assert_eq!(out, data);
        assert_eq!(count, data.len() as u64);
    }

    #[test]
    fn counts_lines_across_chunks() {
        let (out, count) = run(b"one\ntwo\nthree\n", true, 3);
        assert_eq!(out, b"one\ntwo\nthree\n");
        assert_eq!(count, 3);
    }

    #[test]
    fn counts_unterminated_last_line() {
        let (_, count) = run(b"one\ntwo", true, 4);
        assert_eq!(count, 2);
    }

    #[test]
    fn empty_input_counts_nothing() {
        let (out, count) = run(b"", true, 16);
        assert!(out.is_empty());
        assert_eq!(count, 0);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_propagate() {
        let meter = Arc::new(Meter::with_clock(ManualClock::new()));
        let (reader, writer) = copy_metered(
            Cursor::new(b"data".to_vec()),
            FailingWriter,
            Arc::clone(&meter),
            false,
            16,
        );
        let err = writer.join().unwrap().err().unwrap();
        assert!(err.chain().any(|c| c.downcast_ref::<io::Error>().is_some()));
        reader.join().unwrap().unwrap();
        assert_eq!(meter.count(), 0);
    }
}
