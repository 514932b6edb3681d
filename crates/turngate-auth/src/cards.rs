// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default sign-in card payloads.
//!
//! Hosts that render platform-specific cards supply their own
//! [`CardFactory`]; this one builds a neutral attachment shape that most
//! chat surfaces can map onto a button card.

use serde_json::json;

use turngate_core::{CardFactory, TokenExchangeResource};

/// Built-in card factory with configurable prompt text.
#[derive(Debug, Clone)]
pub struct BasicCardFactory {
    /// Card body shown above the sign-in button.
    pub text: String,
    /// Sign-in button label.
    pub button_title: String,
}

impl Default for BasicCardFactory {
    fn default() -> Self {
        Self {
            text: "Please sign in to continue.".into(),
            button_title: "Sign in".into(),
        }
    }
}

impl CardFactory for BasicCardFactory {
    fn sign_in_card(&self, link: &str) -> serde_json::Value {
        json!({
            "contentType": "application/vnd.turngate.card.signin",
            "content": {
                "text": self.text,
                "buttons": [
                    { "type": "signin", "title": self.button_title, "value": link }
                ]
            }
        })
    }

    fn oauth_card(
        &self,
        link: &str,
        connection: &str,
        resource: Option<&TokenExchangeResource>,
    ) -> serde_json::Value {
        let mut content = json!({
            "text": self.text,
            "connectionName": connection,
            "buttons": [
                { "type": "signin", "title": self.button_title, "value": link }
            ]
        });
        if let Some(resource) = resource {
            content["tokenExchangeResource"] = json!({
                "id": resource.id,
                "uri": resource.uri,
            });
        }
        json!({
            "contentType": "application/vnd.turngate.card.oauth",
            "content": content
        })
    }
}
