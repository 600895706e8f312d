//! # Visibility Example
//!
//! Submits work at every priority class, hides the session while a batch is pending
//! and shows it again, then tears the session down.
//!
//! Demonstrates:
//! - One controller per priority class
//! - Demotion to `background` while hidden, restoration when visible
//! - Detached work outliving teardown
//! - Suppressed aborts vs `throw_on_abort`
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example visibility --features logging
//! ```

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use priovisor::{
    LogWriter, PostTaskOptions, Session, SessionConfig, Subscribe, TaskError, TaskFn, TaskPriority,
    TaskRef,
};
use tracing_subscriber::EnvFilter;

fn work(name: &'static str, ms: u64) -> TaskRef<&'static str> {
    TaskFn::arc(name, move || async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok::<_, TaskError>(name)
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let session = Session::builder(SessionConfig::default())
        .with_subscribers(subs)
        .build();
    let visibility = session
        .visibility()
        .ok_or_else(|| anyhow::anyhow!("session has no owned visibility source"))?;

    let batch = [
        ("input", TaskPriority::UserBlocking),
        ("thumbnails", TaskPriority::UserVisible),
        ("analytics", TaskPriority::Background),
    ];
    let results = join_all(batch.iter().map(|&(name, priority)| {
        session.post_task(work(name, 10), PostTaskOptions::new().with_priority(priority))
    }))
    .await;
    println!("first batch: {results:?}");

    visibility.observe(false);
    println!("hidden:  {:?}", session.effective_priorities());
    visibility.observe(true);
    println!("visible: {:?}", session.effective_priorities());

    let pending = {
        let session = session.clone();
        tokio::spawn(async move {
            let quiet = session.post_task(work("prefetch", 500), PostTaskOptions::new());
            let strict = session.post_task(
                work("save-draft", 500),
                PostTaskOptions::new().throw_on_abort(),
            );
            let detached = session.post_task(
                work("upload", 100),
                PostTaskOptions::new()
                    .with_priority("not-a-priority")
                    .detached(),
            );
            futures::join!(quiet, strict, detached)
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let aborted = session.teardown();
    println!("teardown aborted {aborted} controllers");

    let (quiet, strict, detached) = pending.await?;
    println!("prefetch:   {quiet:?}");
    println!("save-draft: {strict:?}");
    println!("upload:     {detached:?}");

    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok(())
}
