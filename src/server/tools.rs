//! Tool catalogue and typed tool arguments.

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::gateway::DEFAULT_LIST_LIMIT;

pub const EXECUTE_COMMAND: &str = "execute_command";
pub const LIST_RECENT_COMMANDS: &str = "list_recent_commands";
pub const LIST_ALLOWED_COMMANDS: &str = "list_allowed_commands";

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteCommandArgs {
    pub command: String,
    /// Anything other than a string falls back to the default shell.
    #[serde(default, deserialize_with = "string_or_none")]
    pub shell: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRecentArgs {
    /// JSON numbers may arrive as floats.
    #[serde(default)]
    pub limit: Option<f64>,
}

impl ListRecentArgs {
    /// Requested limit; zero, negative or non-finite values mean "all".
    pub fn limit(&self) -> usize {
        match self.limit {
            None => DEFAULT_LIST_LIMIT,
            Some(n) if n.is_finite() && n >= 1.0 => n as usize,
            Some(_) => 0,
        }
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn input_schema(schema: Value) -> Arc<JsonObject> {
    match schema {
        Value::Object(map) => Arc::new(map),
        _ => Arc::default(),
    }
}

/// The three tools, in the order `tools/list` reports them.
pub fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            EXECUTE_COMMAND,
            "Execute a shell command using bash or zsh.",
            input_schema(json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The command to execute"
                    },
                    "shell": {
                        "type": "string",
                        "description": "The shell to use (bash or zsh)"
                    }
                },
                "required": ["command"]
            })),
        ),
        Tool::new(
            LIST_RECENT_COMMANDS,
            "List recently executed commands.",
            input_schema(json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of commands to return"
                    }
                }
            })),
        ),
        Tool::new(
            LIST_ALLOWED_COMMANDS,
            "List all commands that are allowed to be executed.",
            input_schema(json!({
                "type": "object",
                "properties": {}
            })),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_mapping() {
        assert_eq!(ListRecentArgs::default().limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(ListRecentArgs { limit: Some(3.0) }.limit(), 3);
        assert_eq!(ListRecentArgs { limit: Some(2.7) }.limit(), 2);
        assert_eq!(ListRecentArgs { limit: Some(0.0) }.limit(), 0);
        assert_eq!(ListRecentArgs { limit: Some(-4.0) }.limit(), 0);
    }

    #[test]
    fn test_execute_args_require_string_command() {
        let ok: ExecuteCommandArgs =
            serde_json::from_value(json!({"command": "ls", "shell": "zsh"})).unwrap();
        assert_eq!(ok.command, "ls");
        assert_eq!(ok.shell.as_deref(), Some("zsh"));

        assert!(serde_json::from_value::<ExecuteCommandArgs>(json!({"command": 5})).is_err());
        assert!(serde_json::from_value::<ExecuteCommandArgs>(json!({})).is_err());
    }

    #[test]
    fn test_non_string_shell_is_ignored() {
        for shell in [json!(5), json!(null), json!(["zsh"]), json!({"name": "zsh"})] {
            let args: ExecuteCommandArgs =
                serde_json::from_value(json!({"command": "ls", "shell": shell})).unwrap();
            assert_eq!(args.command, "ls");
            assert_eq!(args.shell, None);
        }
    }

    #[test]
    fn test_definitions_list_three_tools() {
        let tools = definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, [EXECUTE_COMMAND, LIST_RECENT_COMMANDS, LIST_ALLOWED_COMMANDS]);

        let execute = &tools[0].input_schema;
        assert_eq!(execute.get("required"), Some(&json!(["command"])));
    }
}
