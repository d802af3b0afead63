use std::future::Future;

use tokio::task::JoinHandle;
use tracing::Instrument;

/// Spawns a tracked task, labelled by spawn site so leaked tasks show up in `task_count`.
pub fn spawn<F>(file: &str, line: u32, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let label = format!("{file}:{line}");

    tokio::spawn(
        async move {
            let metric = crate::metrics::TASK_COUNT.with_label_values(&[label.as_str()]);
            metric.inc();
            let result = future.await;
            metric.dec();
            result
        }
        .in_current_span(),
    )
}
