use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::cycle::CycleOutcome;
use crate::stats::Stats;

/// Wakes once per second, drains finished cycles into the stats and prints
/// the window summary. Runs for the life of the process.
pub async fn report_loop(mut rx: UnboundedReceiver<CycleOutcome>) {
    let mut stats = Stats::new();
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        drain(&mut rx, &mut stats);
        if let Some(report) = stats.report() {
            println!("{report}");
        }
    }
}

fn drain(rx: &mut UnboundedReceiver<CycleOutcome>, stats: &mut Stats) {
    while let Ok(outcome) = rx.try_recv() {
        match outcome {
            CycleOutcome::Success { latency_secs } => stats.record(latency_secs),
            CycleOutcome::Failure(_) => stats.record_failure(),
        }
    }
}
