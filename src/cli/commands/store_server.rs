//! Line-delimited key-value server.
//!
//! Speaks one JSON command per line over stdin/stdout:
//! `{"action":"set","key":"k","value":...}`, `{"action":"get","key":"k"}`,
//! `{"action":"clear"}`. Peripheral glue with no invariants; state lives
//! only for the process lifetime.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[derive(Debug, Deserialize)]
struct Command {
    action: String,
    key: Option<String>,
    value: Option<Value>,
}

fn apply(memory: &mut HashMap<String, Value>, line: &str) -> Value {
    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(err) => return json!({ "error": err.to_string() }),
    };

    match (command.action.as_str(), command.key) {
        ("set", Some(key)) => {
            memory.insert(key, command.value.unwrap_or(Value::Null));
            json!({ "status": "ok" })
        }
        ("get", Some(key)) => json!({ "value": memory.get(&key) }),
        ("clear", _) => {
            memory.clear();
            json!({ "status": "cleared" })
        }
        _ => json!({ "error": "unknown action" }),
    }
}

pub async fn run() -> Result<()> {
    info!("store server listening on stdin");

    let mut memory: HashMap<String, Value> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = apply(&mut memory, &line);
        stdout
            .write_all(format!("{}\n", response).as_bytes())
            .await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut memory = HashMap::new();

        let response = apply(&mut memory, r#"{"action":"set","key":"a","value":42}"#);
        assert_eq!(response["status"], "ok");

        let response = apply(&mut memory, r#"{"action":"get","key":"a"}"#);
        assert_eq!(response["value"], 42);
    }

    #[test]
    fn test_get_missing_key_is_null() {
        let mut memory = HashMap::new();
        let response = apply(&mut memory, r#"{"action":"get","key":"nope"}"#);
        assert_eq!(response["value"], Value::Null);
    }

    #[test]
    fn test_clear_and_bad_input() {
        let mut memory = HashMap::new();
        apply(&mut memory, r#"{"action":"set","key":"a","value":1}"#);

        let response = apply(&mut memory, r#"{"action":"clear"}"#);
        assert_eq!(response["status"], "cleared");
        assert!(memory.is_empty());

        let response = apply(&mut memory, "not json");
        assert!(response["error"].is_string());

        let response = apply(&mut memory, r#"{"action":"zap"}"#);
        assert_eq!(response["error"], "unknown action");
    }
}
