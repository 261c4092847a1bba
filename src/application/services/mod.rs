//! Application services - Use case implementations
//!
//! The conversation wizard, the event generator and the chat router. Each
//! service depends on ports, not on concrete adapters.

pub mod chat_service;
pub mod conversation_service;
pub mod event_service;

pub use chat_service::ChatService;
pub use conversation_service::{
    ConversationError, ConversationService, ConversationServiceImpl, StepPrompt, SubmitOutcome,
    WizardStep, CANCEL_SENTINEL,
};
pub use event_service::{EventGenerationService, EventGenerationServiceImpl, EventTemplate};
