//! Rate limiting for search input

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

enum Command<T> {
    /// New input; rearms the quiet timer
    Input(T),
    /// Deliver now, dropping anything pending
    Flush(T),
    /// Drop anything pending and deliver the cleared value now
    Cancel,
}

/// Rearm-on-input debouncer.
///
/// Every [`input`](Debouncer::input) replaces the pending value and restarts
/// the quiet interval; only when the interval passes without new input is the
/// latest value delivered on the receiver returned by [`Debouncer::new`]. At
/// most one delivery is pending at any time.
///
/// Must be created inside a tokio runtime. Dropping the debouncer discards a
/// pending value and closes the receiver.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
}

impl<T> Debouncer<T>
where
    T: Default + Send + 'static,
{
    /// Spawn the timer task and return the debouncer with its output channel
    pub fn new(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(quiet, rx, out_tx));
        (Self { tx }, out_rx)
    }

    /// Record new input; delivered once input pauses for the quiet interval
    pub fn input(&self, value: T) {
        self.send(Command::Input(value));
    }

    /// Deliver `value` immediately, discarding pending input
    pub fn flush(&self, value: T) {
        self.send(Command::Flush(value));
    }

    /// Discard pending input and deliver `T::default()` immediately
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    fn send(&self, command: Command<T>) {
        if self.tx.send(command).is_err() {
            tracing::debug!("Debouncer task has stopped; dropping input");
        }
    }
}

async fn run<T: Default>(
    quiet: Duration,
    mut commands: mpsc::UnboundedReceiver<Command<T>>,
    out: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;
    let mut deadline = Instant::now();

    loop {
        let ready = tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Input(value)) => {
                    pending = Some(value);
                    deadline = Instant::now() + quiet;
                    None
                }
                Some(Command::Flush(value)) => {
                    pending = None;
                    Some(value)
                }
                Some(Command::Cancel) => {
                    pending = None;
                    Some(T::default())
                }
                None => break,
            },
            _ = sleep_until(deadline), if pending.is_some() => pending.take(),
        };

        if let Some(value) = ready {
            if out.send(value).is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_burst_delivers_last_value_once() {
        let (debouncer, mut rx) = Debouncer::<String>::new(QUIET);

        for value in ["r", "ru", "rus", "rust", "rusty"] {
            debouncer.input(value.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(rx.recv().await.as_deref(), Some("rusty"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_quiet_interval() {
        let (debouncer, mut rx) = Debouncer::<String>::new(QUIET);
        let start = Instant::now();

        debouncer.input("a".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.input("ab".to_string());

        assert_eq!(rx.recv().await.as_deref(), Some("ab"));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_pauses_deliver_separately() {
        let (debouncer, mut rx) = Debouncer::<String>::new(QUIET);

        debouncer.input("first".to_string());
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.input("second".to_string());
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_bypasses_delay() {
        let (debouncer, mut rx) = Debouncer::<String>::new(QUIET);
        let start = Instant::now();

        debouncer.input("half typed".to_string());
        debouncer.cancel();

        assert_eq!(rx.recv().await.as_deref(), Some(""));
        assert!(start.elapsed() < QUIET);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err(), "cancelled input must not fire later");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_delivers_immediately() {
        let (debouncer, mut rx) = Debouncer::<String>::new(QUIET);

        debouncer.input("draft".to_string());
        debouncer.flush("final".to_string());

        assert_eq!(rx.recv().await.as_deref(), Some("final"));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_closes_output() {
        let (debouncer, mut rx) = Debouncer::<String>::new(QUIET);
        debouncer.input("lost".to_string());
        drop(debouncer);
        assert_eq!(rx.recv().await, None);
    }
}
