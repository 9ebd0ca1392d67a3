//! Helpdesk chat crate - conversation lifecycle and reply generation.
//!
//! `ConversationManager` owns conversation state: creation, message append,
//! rolling-average sentiment, and escalation/resolution transitions. The
//! `Responder` trait covers reply generation with three interchangeable
//! strategies (LLM provider, scripted keywords, static placeholder).

pub mod manager;
pub mod responder;

pub use manager::ConversationManager;
pub use responder::{
    responder_for, LlmResponder, Responder, ScriptedResponder, StaticResponder,
};
