//! Reply generation strategies.
//!
//! Three interchangeable implementations of `Responder`: a language-model
//! provider over HTTPS, deterministic keyword-routed canned replies, and a
//! static placeholder. All honor the same contract: given the user's message
//! and the prior turns, produce a non-empty reply and never fail. Provider
//! failures degrade to a fixed apology string.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde_json::{json, Value};
use tracing::warn;

use helpdesk_core::config::ProviderConfig;
use helpdesk_core::error::{HelpdeskError, Result};
use helpdesk_core::types::Message;

/// Returned whenever the provider call fails, instead of an error.
pub const APOLOGY: &str = "I'm sorry, I'm having trouble responding right now. \
    Please try again in a moment, or ask to speak with a human agent.";

const SYSTEM_PROMPT: &str = "You are a concise, empathetic, professional \
    customer support agent. Keep replies short and helpful.";

/// Strategy interface for producing the assistant's reply.
///
/// `history` holds the prior user/assistant turns, oldest first, usually
/// including the message being answered.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, message: &str, history: &[Message]) -> String;
}

/// Build a responder from a config strategy name. Unknown names fall back to
/// the scripted responder.
pub fn responder_for(strategy: &str, provider: &ProviderConfig) -> Box<dyn Responder> {
    match strategy {
        "llm" => Box::new(LlmResponder::new(provider.clone())),
        "static" => Box::new(StaticResponder),
        "scripted" => Box::new(ScriptedResponder::new()),
        other => {
            warn!(strategy = %other, "Unknown responder strategy, using scripted");
            Box::new(ScriptedResponder::new())
        }
    }
}

// =============================================================================
// LlmResponder
// =============================================================================

/// Delegates reply generation to an OpenAI-compatible chat completion API.
pub struct LlmResponder {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl LlmResponder {
    pub fn new(config: ProviderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client with timeout, using default");
                reqwest::Client::new()
            });
        Self { client, config }
    }

    /// Build the chat-completion message list: system instruction, prior
    /// turns, and the current message if the history does not already end
    /// with it.
    fn build_messages(&self, message: &str, history: &[Message]) -> Vec<Value> {
        let mut messages = vec![json!({"role": "system", "content": SYSTEM_PROMPT})];

        for turn in history {
            messages.push(json!({
                "role": turn.role.as_str(),
                "content": turn.content,
            }));
        }

        let ends_with_message = history
            .last()
            .is_some_and(|m| m.content == message);
        if !ends_with_message {
            messages.push(json!({"role": "user", "content": message}));
        }

        messages
    }

    async fn request(&self, message: &str, history: &[Message]) -> Result<String> {
        let payload = json!({
            "model": self.config.model,
            "messages": self.build_messages(message, history),
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| HelpdeskError::Provider(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HelpdeskError::Provider(format!(
                "Provider returned {}",
                response.status()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| HelpdeskError::Provider(format!("Invalid response body: {}", e)))?;

        extract_reply(&data)
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_reply(data: &Value) -> Result<String> {
    let content = data["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .ok_or_else(|| HelpdeskError::Provider("No completion in response".to_string()))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(HelpdeskError::Provider("Empty completion".to_string()));
    }
    Ok(content.to_string())
}

#[async_trait]
impl Responder for LlmResponder {
    async fn reply(&self, message: &str, history: &[Message]) -> String {
        match self.request(message, history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Provider call failed, returning apology");
                APOLOGY.to_string()
            }
        }
    }
}

// =============================================================================
// ScriptedResponder
// =============================================================================

/// One canned-reply category: matched in priority order, first hit wins.
struct Category {
    keywords: &'static [&'static str],
    reply: &'static str,
}

const CATEGORIES: &[Category] = &[
    Category {
        // greeting
        keywords: &["hello", "hey", "good morning", "good afternoon", "greetings"],
        reply: "Hello! Thanks for reaching out to support. What can I help you with today?",
    },
    Category {
        // order
        keywords: &["order", "delivery", "shipping", "track", "package"],
        reply: "I can help with your order. Could you share your order number so I can take a look?",
    },
    Category {
        // frustration
        keywords: &[
            "frustrated",
            "angry",
            "terrible",
            "awful",
            "unacceptable",
            "ridiculous",
        ],
        reply: "I'm really sorry about the trouble you've had. I understand how frustrating that \
                is. Let me see what I can do to make this right.",
    },
    Category {
        // refund
        keywords: &["refund", "return", "money back"],
        reply: "I can start a refund request for you. Could you confirm which order it concerns \
                and the reason for the return?",
    },
    Category {
        // account
        keywords: &["account", "profile", "login", "password", "sign in"],
        reply: "For account issues I can help you regain access. Could you confirm the email \
                address on the account?",
    },
    Category {
        // payment
        keywords: &["payment", "charge", "billing", "card", "invoice"],
        reply: "I'm sorry about the billing trouble. Could you tell me which charge looks wrong \
                so I can investigate?",
    },
    Category {
        // product
        keywords: &["product", "item", "broken", "defective", "not working"],
        reply: "Sorry the product isn't working as expected. Could you describe what happens when \
                you try to use it?",
    },
    Category {
        // thanks
        keywords: &["thank", "thanks", "appreciate"],
        reply: "You're very welcome! Is there anything else I can help you with?",
    },
    Category {
        // help
        keywords: &["help", "support", "question", "issue", "problem"],
        reply: "Of course, I'm here to help. Could you give me a few more details about the issue?",
    },
];

const FALLBACKS: &[&str] = &[
    "Could you tell me a bit more about that?",
    "I want to make sure I understand. Could you rephrase that?",
    "Let me look into that for you. Could you share any relevant details?",
];

/// Deterministic keyword-routed canned replies, with a random generic
/// fallback when no category matches.
#[derive(Debug, Default)]
pub struct ScriptedResponder;

impl ScriptedResponder {
    pub fn new() -> Self {
        Self
    }

    /// The matched canned reply, or None when no category applies.
    fn route(&self, message: &str) -> Option<&'static str> {
        let lower = message.to_lowercase();
        CATEGORIES
            .iter()
            .find(|c| c.keywords.iter().any(|k| lower.contains(k)))
            .map(|c| c.reply)
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn reply(&self, message: &str, _history: &[Message]) -> String {
        match self.route(message) {
            Some(reply) => reply.to_string(),
            None => FALLBACKS
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(FALLBACKS[0])
                .to_string(),
        }
    }
}

// =============================================================================
// StaticResponder
// =============================================================================

/// Fixed placeholder reply, for wiring and tests.
#[derive(Debug, Default)]
pub struct StaticResponder;

#[async_trait]
impl Responder for StaticResponder {
    async fn reply(&self, _message: &str, _history: &[Message]) -> String {
        "Thanks for your message! A support agent will follow up shortly.".to_string()
    }
}
