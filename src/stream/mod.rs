//! Event stream: build, write and pace events until shutdown
//!
//! - `event` - the `{"eventId", "message"}` record
//! - `emitter` - writes an event and its progress line
//! - `run` - the paced loop around the emitter

pub mod emitter;
pub mod event;

pub use emitter::Emitter;
pub use event::Event;

use eyre::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::time::Duration;

/// Time a write already in flight gets to finish once shutdown is requested
const SHUTDOWN_WRITE_GRACE: Duration = Duration::from_millis(200);

/// Emit an event, then wait `interval`, until `shutdown` resolves.
///
/// Writes run on the blocking pool so a reader that stops draining the pipe
/// cannot hold off shutdown. A write still blocked after the grace period is
/// abandoned; the caller must not wait on blocking tasks when tearing down the
/// runtime. Returns the number of events fully emitted. A write failure ends
/// the loop with the error.
pub async fn run<O, D, S>(emitter: Emitter<O, D>, interval: Duration, shutdown: S) -> Result<u64>
where
    O: Write + Send + 'static,
    D: Write + Send + 'static,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut emitter = emitter;
    let mut emitted = 0;

    loop {
        let mut write = tokio::task::spawn_blocking(move || {
            let result = emitter.emit();
            (emitter, result)
        });

        let joined = tokio::select! {
            biased;
            joined = &mut write => Some(joined),
            _ = &mut shutdown => None,
        };

        let (returned, result) = match joined {
            Some(joined) => joined.context("Event writer panicked")?,
            None => {
                log::info!("Shutdown requested while writing event {}", emitted + 1);
                return match tokio::time::timeout(SHUTDOWN_WRITE_GRACE, write).await {
                    Ok(joined) => {
                        let (mut emitter, result) = joined.context("Event writer panicked")?;
                        result?;
                        emitter.finish()?;
                        Ok(emitter.emitted())
                    }
                    Err(_) => {
                        log::warn!("Abandoning blocked write after {} events", emitted);
                        Ok(emitted)
                    }
                };
            }
        };

        result?;
        emitter = returned;
        emitted = emitter.emitted();

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("Shutdown requested after {} events", emitted);
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    emitter.finish()?;
    Ok(emitted)
}
