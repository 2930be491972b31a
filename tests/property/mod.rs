//! Property-based tests

mod drain_proptest;
mod queue_proptest;

/// Run a future to completion on a fresh current-thread runtime
fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}
