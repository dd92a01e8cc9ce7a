//! Counter store with a projected view
//!
//! Run with `RUST_LOG=fluxcan=debug cargo run --example counter` to see
//! the store's own logging.

use std::sync::Arc;

use fluxcan::{create_store, Action, Projection, State};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn reducer(state: State, action: Action) -> Value {
    let count = state.get("count").and_then(Value::as_i64).unwrap_or(0);
    let step = state.get("step").and_then(Value::as_i64).unwrap_or(1);

    match action.kind.as_str() {
        "INCREMENT" => json!({ "count": count + step }),
        "DECREMENT" => json!({ "count": count - step }),
        "SET_STEP" => json!({ "step": action.payload }),
        "RESET" => json!({ "count": 0 }),
        _ => Value::Object(state),
    }
}

#[tokio::main]
async fn main() -> fluxcan::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Counter Store ===\n");

    let store = create_store(json!({"count": 0, "step": 1}), reducer)?;

    // A view tracking both fields
    let view = Arc::new(Projection::new());
    store.subscribe(view.clone(), ["count", "step"])?;

    // A closure subscriber logging every change of count
    store.subscribe(
        Arc::new(|field: &str, value: Option<Value>| {
            println!("   [{field}] -> {}", value.unwrap_or(Value::Null));
        }),
        ["count"],
    )?;

    println!("\nIncrementing twice...");
    store.dispatch("INCREMENT", Value::Null).await?;
    store.dispatch("INCREMENT", Value::Null).await?;

    println!("\nSetting step to 5 and incrementing...");
    store.dispatch("SET_STEP", json!(5)).await?;
    store.dispatch("INCREMENT", Value::Null).await?;

    println!("\nDecrementing...");
    store.dispatch("DECREMENT", Value::Null).await?;

    println!("\nResetting...");
    store.dispatch("RESET", Value::Null).await?;

    println!("\nView: count={:?} step={:?}", view.get("count"), view.get("step"));
    println!("Final state: {}", Value::Object(store.state()));
    Ok(())
}
