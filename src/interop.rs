#![allow(missing_docs)]

//! Host-facing surface: a registry of independent sessions driven through
//! line-delimited JSON requests.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::CounselorConfig;
use crate::error::{CounselorError, Result};
use crate::perspective::swap_perspective;
use crate::session::ConversationSession;
use crate::types::TurnOutput;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub name: String,
    pub description: String,
    pub version: String,
    pub language: String,
    pub interop_protocols: Vec<String>,
    pub methods: Vec<String>,
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self {
            name: "eliza-counselor".to_string(),
            description: "ELIZA career counselor - rule-based reflective conversation".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            language: "rust".to_string(),
            interop_protocols: vec!["ipc".to_string()],
            methods: [
                "getManifest",
                "createSession",
                "respond",
                "transcript",
                "endSession",
                "swapPerspective",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        }
    }
}

pub fn get_manifest_json() -> String {
    serde_json::to_string(&PluginManifest::default())
        .unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Sessions keyed by id. Each session owns all of its mutable state.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, ConversationSession>,
    next_id: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session; returns its id and opening lines.
    pub fn create(&mut self, config: &CounselorConfig) -> Result<(String, Vec<String>)> {
        let mut session = ConversationSession::new(config)?;
        self.next_id += 1;
        let id = format!("session-{}", self.next_id);
        let lines = session.start();
        debug!(session = %id, "session created");
        self.sessions.insert(id.clone(), session);
        Ok((id, lines))
    }

    /// Answer one input. A session that ends on this turn is dropped, so its
    /// transcript must be fetched before the user quits.
    pub fn respond(&mut self, id: &str, input: &str) -> Result<TurnOutput> {
        let output = self.get_mut(id)?.respond(input);
        if output.ended {
            self.sessions.remove(id);
            debug!(session = %id, "session ended by user");
        }
        Ok(output)
    }

    pub fn transcript(&self, id: &str) -> Result<Vec<String>> {
        self.sessions
            .get(id)
            .map(ConversationSession::transcript_lines)
            .ok_or_else(|| CounselorError::SessionNotFound(id.to_string()))
    }

    /// Close a session, returning the farewell if it was still open.
    pub fn end(&mut self, id: &str) -> Result<Vec<String>> {
        let mut session = self
            .sessions
            .remove(id)
            .ok_or_else(|| CounselorError::SessionNotFound(id.to_string()))?;
        debug!(session = %id, "session removed");
        Ok(session.end().into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut ConversationSession> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| CounselorError::SessionNotFound(id.to_string()))
    }

    /// Dispatch one request against this registry.
    pub fn handle(&mut self, request: &IpcRequest) -> IpcResponse {
        match self.dispatch(request) {
            Ok(result) => IpcResponse::success(request.id, result),
            Err(e) => IpcResponse::error(request.id, &e.to_string()),
        }
    }

    fn dispatch(&mut self, request: &IpcRequest) -> Result<Value> {
        let params = &request.params;
        match request.method.as_str() {
            "getManifest" => Ok(serde_json::to_value(PluginManifest::default())?),
            "createSession" => {
                let config = match params.get("config") {
                    Some(v) if !v.is_null() => serde_json::from_value::<CounselorConfig>(v.clone())?,
                    _ => CounselorConfig::default(),
                };
                let (session_id, lines) = self.create(&config)?;
                Ok(json!({ "sessionId": session_id, "lines": lines }))
            }
            "respond" => {
                let id = str_param(params, "sessionId")?;
                let input = params.get("input").and_then(Value::as_str).unwrap_or("");
                let output = self.respond(id, input)?;
                Ok(serde_json::to_value(output)?)
            }
            "transcript" => {
                let id = str_param(params, "sessionId")?;
                Ok(json!({ "lines": self.transcript(id)? }))
            }
            "endSession" => {
                let id = str_param(params, "sessionId")?;
                Ok(json!({ "lines": self.end(id)? }))
            }
            "swapPerspective" => {
                let text = params.get("text").and_then(Value::as_str).unwrap_or("");
                Ok(json!({ "swapped": swap_perspective(text) }))
            }
            other => Err(CounselorError::InvalidRequest(format!(
                "Unknown method: {}",
                other
            ))),
        }
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| CounselorError::InvalidRequest(format!("missing string param `{}`", key)))
}

lazy_static::lazy_static! {
    static ref REGISTRY: Mutex<SessionRegistry> = Mutex::new(SessionRegistry::new());
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpcRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpcResponse {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, error: &str) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// Handle a request against the process-wide registry.
pub fn handle_ipc_request(request: &IpcRequest) -> IpcResponse {
    match REGISTRY.lock() {
        Ok(mut registry) => registry.handle(request),
        Err(e) => IpcResponse::error(request.id, &e.to_string()),
    }
}

/// Parse and handle one request line, producing the response line.
pub fn handle_ipc_line(line: &str) -> String {
    let response = match serde_json::from_str::<IpcRequest>(line) {
        Ok(request) => handle_ipc_request(&request),
        Err(e) => IpcResponse::error(0, &format!("Invalid JSON: {}", e)),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|e| format!(r#"{{"id": 0, "error": "{}"}}"#, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: u64, method: &str, params: Value) -> IpcRequest {
        IpcRequest {
            id,
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn test_manifest() {
        let manifest = PluginManifest::default();
        assert_eq!(manifest.name, "eliza-counselor");
        assert!(manifest.methods.contains(&"respond".to_string()));
        assert!(get_manifest_json().contains("eliza-counselor"));
    }

    #[test]
    fn test_session_lifecycle() {
        let mut registry = SessionRegistry::new();
        let created = registry.handle(&request(1, "createSession", json!({"config": {"seed": 3}})));
        let result = created.result.unwrap();
        let id = result["sessionId"].as_str().unwrap().to_string();
        assert_eq!(result["lines"][1], "What is your name?");

        let reply = registry.handle(&request(2, "respond", json!({"sessionId": id, "input": "Kara"})));
        assert!(reply.error.is_none());
        assert_eq!(reply.result.unwrap()["lines"][0], "Hello, Kara!");

        let transcript = registry.handle(&request(3, "transcript", json!({"sessionId": id})));
        assert_eq!(transcript.result.unwrap()["lines"][2], "< Kara");

        let ended = registry.handle(&request(4, "endSession", json!({"sessionId": id})));
        assert_eq!(
            ended.result.unwrap()["lines"][0],
            "Goodbye and good luck in your future endeavors!"
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut registry = SessionRegistry::new();
        let config = CounselorConfig::default().with_seed(1).with_name_chance(0.0);
        let (a, _) = registry.create(&config).unwrap();
        let (b, _) = registry.create(&config).unwrap();
        registry.respond(&a, "I need a resume").unwrap();
        let output = registry.respond(&b, "I need a resume").unwrap();
        assert_eq!(output.lines, vec!["Is your resume updated?"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_quit_drops_session() {
        let mut registry = SessionRegistry::new();
        let config = CounselorConfig::default().with_seed(4);
        let (id, _) = registry.create(&config).unwrap();
        let output = registry.respond(&id, "quit").unwrap();
        assert!(output.ended);
        assert_eq!(output.lines, vec!["Goodbye and good luck in your future endeavors!"]);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.respond(&id, "hello"),
            Err(CounselorError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_session() {
        let mut registry = SessionRegistry::new();
        let reply = registry.handle(&request(9, "respond", json!({"sessionId": "nope", "input": "hi"})));
        assert!(reply.error.unwrap().contains("nope"));
    }

    #[test]
    fn test_unknown_method() {
        let mut registry = SessionRegistry::new();
        let reply = registry.handle(&request(5, "dance", Value::Null));
        assert!(reply.error.unwrap().contains("dance"));
    }

    #[test]
    fn test_swap_perspective_method() {
        let mut registry = SessionRegistry::new();
        let reply = registry.handle(&request(6, "swapPerspective", json!({"text": "I am lost"})));
        assert_eq!(reply.result.unwrap()["swapped"], "you are lost");
    }

    #[test]
    fn test_ipc_line_rejects_bad_json() {
        let line = handle_ipc_line("{not json");
        assert!(line.contains("Invalid JSON"));
    }
}
