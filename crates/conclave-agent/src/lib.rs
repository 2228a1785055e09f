// ABOUTME: Debate runtime for conclave: prompts, provider adapters, message sinks, and the engine.
// ABOUTME: The engine talks to models only through the ModelClient trait and to clients only through MessageSink.

pub mod engine;
pub mod prompt;
pub mod providers;
pub mod runtime;
pub mod sink;
pub mod testing;

pub use engine::{DEFAULT_MAX_ROUNDS, DebateConfig, DebateEngine, MIN_TURN_DELAY};
pub use prompt::{ChatMessage, ChatRole, TERMINATION_PHRASE, build_system_prompt, is_termination};
pub use providers::{Provider, ProviderCredentials, ProviderRouter, Vendor};
pub use runtime::{AdapterError, ModelClient};
pub use sink::{
    CallbackSink, DeliveryError, FanoutSink, HttpPushSink, MessageSink, QueueSink, TracingSink,
};
