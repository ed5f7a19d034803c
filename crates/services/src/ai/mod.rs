//! Vendor boundary for chat, vocabulary generation and grammar correction.

mod gateway;
mod gemini;
mod openai;
pub mod prompt;

pub use gateway::{AiGateway, AiProvider, GatewayError, GatewayErrorKind, GrammarCorrection};
pub use gemini::GeminiGateway;
pub use openai::OpenAiGateway;
