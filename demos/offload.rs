//! # Example: offload
//!
//! Moves parts of a subscription between threads and sequences three variants.
//!
//! Demonstrates how to:
//! - Offload the subscribe path to a dedicated pool with `subscribe_on`.
//! - Deliver results on the application runtime with `publish_on`.
//! - Gate an operator so the first decision stays inline ([`Countdown`]).
//! - Chain a `Completion`, a `Stream` and a `Single` with `concat_with`.
//!
//! ## Flow
//! ```text
//! main (tokio runtime "app")
//!   ├─► warm_cache : Completion  subscribe_on(io pool)
//!   ├─► rows       : Stream      subscribe_on(io pool)
//!   ├─► summary    : Single      computed inline
//!   └─► warm_cache ++ rows ++ summary ──publish_on(app runtime)──► to_future().await
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example offload
//! ```

use std::sync::Arc;

use sigflow::gate::Countdown;
use sigflow::{
    Completion, ConcatWith, ExecutorConfig, ExecutorRef, Single, SignalError, Stream,
    TokioExecutor,
};
use tokio::runtime::Handle;

fn thread() -> String {
    std::thread::current().name().unwrap_or("unnamed").to_string()
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    let io_pool = Arc::new(TokioExecutor::start(
        &ExecutorConfig::named("io").with_workers(2).with_thread_name("io-worker"),
    )?);
    let io: ExecutorRef = io_pool.clone();
    let app: ExecutorRef = Arc::new(TokioExecutor::from_handle("app", Handle::current()));

    let warm_cache = Completion::from_fn(|| {
        println!("[{}] warming cache", thread());
        Ok(())
    })
    .subscribe_on(Arc::clone(&io));

    let rows = Stream::from_iter(vec![10, 20, 30])
        .before_subscribe(|| println!("[{}] opening rows", thread()))
        .subscribe_on_when(Arc::clone(&io), Countdown::new(1));

    let summary = Single::from_fn(|| {
        println!("[{}] computing summary", thread());
        Ok::<_, SignalError>(60)
    });

    let pipeline = warm_cache
        .concat_with(rows)
        .concat_with(summary)
        .before_on_next(|n| println!("[{}] value {n}", thread()))
        .publish_on(app);

    println!("effective strategy: {:?}", pipeline.strategy());
    let values = pipeline.to_future().await?;
    println!("collected {values:?}");

    io_pool.shutdown();
    Ok(())
}
