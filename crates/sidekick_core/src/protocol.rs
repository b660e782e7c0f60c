//! Line-delimited exchange with the host process.
//!
//! Inbound lines are JSON objects tagged by `type`. Outbound lines are either
//! a marker prefix followed by a payload, or a bare JSON envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{OmniboxContext, OmniboxRequest, SuggestionEnvelope};

pub const OMNIBOX_PREFIX: &str = "OMNIBOX_RESULTS:";
pub const LUA_PREFIX: &str = "LUA:";
pub const STATUS_PREFIX: &str = "STATUS:";

/// Script sent to the host when the bridge is fired.
pub const LUA_BRIDGE_SCRIPT: &str = r#"return "Bridge Successful: " .. os.date("%Y-%m-%d %H:%M:%S")"#;

const ASK_PREFIXES: &[&str] = &["ask ", "sor "];

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Omnibox(OmniboxRequest),
    /// Free-text `query` message; only `ask`/`sor` commands are acted on.
    Query(String),
    /// Well-formed, but of a type this process does not handle.
    Ignored,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireMessage {
    OmniboxQuery {
        #[serde(default)]
        query: QueryField,
        #[serde(default)]
        context: OmniboxContext,
    },
    Query {
        #[serde(default)]
        content: String,
    },
    #[serde(other)]
    Other,
}

/// The host has shipped both `{"query": {...}}` and `{"query": "..", "context": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryField {
    Text(String),
    Nested(OmniboxRequest),
}

impl Default for QueryField {
    fn default() -> Self {
        QueryField::Text(String::new())
    }
}

/// Decode one input line.
pub fn parse_line(line: &str) -> Result<Inbound, ProtocolError> {
    let message: WireMessage = serde_json::from_str(line)?;
    Ok(match message {
        WireMessage::OmniboxQuery { query, context } => Inbound::Omnibox(match query {
            QueryField::Nested(request) => request,
            QueryField::Text(query) => OmniboxRequest { query, context },
        }),
        WireMessage::Query { content } => Inbound::Query(content),
        WireMessage::Other => Inbound::Ignored,
    })
}

/// The question carried by an `ask <question>` / `sor <question>` command.
pub fn ask_command(content: &str) -> Option<&str> {
    let head = content.get(..4)?;
    if !ASK_PREFIXES
        .iter()
        .any(|prefix| head.eq_ignore_ascii_case(prefix))
    {
        return None;
    }
    let question = content[4..].trim();
    (!question.is_empty()).then_some(question)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    OmniboxResults(SuggestionEnvelope),
    AiResponse(String),
    Lua(String),
    Status(String),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum JsonReply<'a> {
    AiResponse { content: &'a str },
}

impl Reply {
    /// Render as a single output line, without the trailing newline.
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        Ok(match self {
            Reply::OmniboxResults(envelope) => {
                format!("{OMNIBOX_PREFIX} {}", serde_json::to_string(envelope)?)
            }
            Reply::AiResponse(content) => {
                serde_json::to_string(&JsonReply::AiResponse { content })?
            }
            Reply::Lua(script) => format!("{LUA_PREFIX} {}", single_line(script)),
            Reply::Status(text) => format!("{STATUS_PREFIX} {}", single_line(text)),
        })
    }
}

/// Raw text lines must not break framing.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
