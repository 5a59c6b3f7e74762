use tokio::sync::mpsc;

use crate::cycle::{self, CycleOutcome};
use crate::reporter;

/// Signaling endpoint the benchmark drives.
pub const SERVER_URL: &str = "ws://127.0.0.1:11290";

/// Runs registration cycles back to back, as fast as the server answers,
/// while the reporter task prints a summary once per second. Cycles are
/// strictly sequential; a failed cycle simply does not count and the next
/// attempt starts immediately.
pub async fn run(url: &str) {
    let (tx, rx) = mpsc::unbounded_channel::<CycleOutcome>();
    tokio::spawn(reporter::report_loop(rx));

    loop {
        let outcome = cycle::run_cycle(url).await;
        let _ = tx.send(outcome);
    }
}
