//! Todo list with an asynchronous reducer and a custom state binding

use std::sync::Arc;
use std::time::Duration;

use fluxcan::subscriber::project;
use fluxcan::{Action, Projection, State, StoreBuilder};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

async fn reducer(state: State, action: Action) -> anyhow::Result<Value> {
    let mut todos = state
        .get("todos")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    match action.kind.as_str() {
        "ADD" => {
            // Pretend the new item has to be saved somewhere first.
            tokio::time::sleep(Duration::from_millis(10)).await;
            let text = action
                .payload
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("ADD expects a string payload"))?;
            todos.push(json!({ "id": todos.len() + 1, "text": text, "completed": false }));
        }
        "COMPLETE" => {
            let id = action.payload.as_u64().unwrap_or_default();
            for todo in todos.iter_mut() {
                if todo["id"] == json!(id) {
                    todo["completed"] = json!(true);
                }
            }
        }
        _ => return Ok(Value::Object(state)),
    }

    let active = todos.iter().filter(|t| t["completed"] == json!(false)).count();
    Ok(json!({ "todos": todos, "summary": { "active": active } }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Todo Store ===\n");

    let store = StoreBuilder::with_async_reducer(json!({"todos": [], "filter": "all"}), reducer)
        // Commit, then fan out with a line per notified subscriber.
        .bind_state(|subscribers, candidate, commit| {
            let state = commit.commit(candidate)?;
            for record in subscribers {
                println!("   notifying {} on {}", record.id, commit.store_id());
                project(record, &state);
            }
            Ok(Value::Object(state))
        })
        .build()?;

    let view = Arc::new(Projection::new());
    store.subscribe(view.clone(), ["summary.active", "todos[0].text", "filter"])?;
    println!("Initial view: {:?}", view.fields());

    store.dispatch("ADD", json!("Learn reducers")).await?;
    store.dispatch("ADD", json!("Write tests")).await?;
    println!("After adding: active={:?} first={:?}", view.get("active"), view.get("text"));

    store.dispatch("COMPLETE", json!(1)).await?;
    println!("After completing: active={:?}", view.get("active"));

    if let Err(err) = store.dispatch("ADD", json!(42)).await {
        println!("Rejected: {err}");
    }

    println!("\nFinal state: {:#}", Value::Object(store.state()));
    Ok(())
}
