//! Machine-readable description of the HTTP API, served at `/api-spec.json`.

use serde_json::{json, Value};

pub fn api_spec() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "npc-dialogue API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Branching NPC dialogue driven by an LLM intent classifier"
        },
        "paths": {
            "/chat": {
                "post": {
                    "summary": "Process a user message and return the NPC response",
                    "description": "Classifies the player's message against the nodes reachable from node_id and returns the chosen node. Without message or node_id, returns the first conversation node.",
                    "tags": ["Conversation"],
                    "requestBody": {
                        "required": false,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ChatRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Conversation node for the detected intent, or the first node when starting a conversation",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ConversationNode" }
                                }
                            }
                        },
                        "400": {
                            "description": "Request body is not valid JSON",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                }
                            }
                        },
                        "500": {
                            "description": "Turn failed",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                }
                            }
                        }
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Liveness check",
                    "responses": { "200": { "description": "Service is up" } }
                }
            }
        },
        "components": {
            "schemas": {
                "ChatRequest": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "description": "Player's message" },
                        "node_id": { "type": "string", "description": "Current conversation node id" },
                        "previousMessage": { "type": "string", "description": "Player's previous message" },
                        "chatSummary": { "type": "string", "description": "Running summary returned by the previous turn" },
                        "characterId": {
                            "oneOf": [{ "type": "string" }, { "type": "integer" }],
                            "description": "Character key; unknown keys use the default character"
                        }
                    }
                },
                "ConversationIntent": {
                    "type": "object",
                    "properties": {
                        "content": { "type": "string" },
                        "targetNodeId": { "type": "string" }
                    }
                },
                "ConversationNode": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "content": { "type": "string" },
                        "intents": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/ConversationIntent" }
                        },
                        "global": { "type": "boolean" },
                        "action": { "type": "string" },
                        "chatSummary": { "type": "string", "description": "Present on classified turns" }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_documents_chat() {
        let spec = api_spec();
        assert!(spec["paths"]["/chat"]["post"].is_object());
        assert_eq!(spec["info"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
