//! Example: Driving a backoff policy from a retry loop
//!
//! This example demonstrates:
//! 1. A minimal async retry loop that sleeps the computed delays
//! 2. Exponential backoff built on the previous (jittered) value
//! 3. Loading a policy from a configuration snippet
//!
//! Run with:
//! ```bash
//! cargo run -p backoff-policy --example retry_example
//! ```

use backoff_policy::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, std::io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!(
                "  Attempt {}: FAILED (simulating transient error)",
                attempt + 1
            );
            Err(std::io::Error::other(format!(
                "Transient error on attempt {}",
                attempt + 1
            )))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }
}

/// Retry `api` up to `max_retries` times, sleeping whatever `policy` says.
async fn run_with_retries(
    api: &UnreliableApi,
    policy: &dyn Backoff,
    jitter: Jitter,
    max_retries: u32,
) -> Result<String, std::io::Error> {
    let mut context = RetryContext::first();
    loop {
        match api.call().await {
            Ok(value) => return Ok(value),
            Err(err) if context.iteration() > max_retries => return Err(err),
            Err(_) => {
                let wait = jitter.apply(&policy.evaluate(&context));
                println!("    waiting {:?}", wait);
                tokio::time::sleep(wait).await;
                context = context.next(wait);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Example 1: Fixed backoff ===");
    let api = UnreliableApi::new(2);
    let policy = BackoffPolicy::fixed(Duration::from_millis(20));
    let start = Instant::now();
    let result = run_with_retries(&api, &policy, Jitter::none(), 3).await?;
    println!("Result: {} after {:?}\n", result, start.elapsed());

    println!("=== Example 2: Exponential backoff with jitter ===");
    let api = UnreliableApi::new(4);
    let policy = BackoffPolicy::exponential(
        Duration::from_millis(10),
        Some(Duration::from_millis(200)),
        2,
        true,
    )?;
    let start = Instant::now();
    let result = run_with_retries(&api, &policy, Jitter::random_default(), 5).await?;
    println!("Result: {} after {:?}\n", result, start.elapsed());

    println!("=== Example 3: Policy from configuration ===");
    let config: BackoffConfig = toml::from_str(
        r#"
        strategy = "exponential"
        first_backoff_ms = 5
        max_backoff_ms = 100
        factor = 3
        "#,
    )?;
    let policy = config.build()?;
    let api = UnreliableApi::new(3);
    let result = run_with_retries(&api, &policy, Jitter::none(), 5).await?;
    println!("Result: {}", result);

    println!("\n=== Example 4: Retries exhausted ===");
    let api = UnreliableApi::new(10);
    match run_with_retries(&api, &BackoffPolicy::zero(), Jitter::none(), 2).await {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("Gave up: {}", err),
    }

    Ok(())
}
