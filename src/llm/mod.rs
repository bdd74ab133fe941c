//! LLM-powered natural language to SQL translation.

pub mod provider;
pub mod client;
pub mod prompt;
pub mod synthesizer;

pub use provider::TextGenerator;
pub use client::{LlmClient, LlmProvider};
pub use prompt::{Example, InstructionContext};
pub use synthesizer::{strip_code_fences, QuerySynthesizer, SynthesisError};
