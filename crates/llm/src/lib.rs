//! PolicyLens LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for the OpenAI
//! chat-completions API. Other providers are added as new types in this crate
//! without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response parsing and
//! the retry loop live here. The [`pipeline`] crate sees only
//! [`pipeline::LlmProvider`] and [`pipeline::ExternalServiceError`]; reqwest
//! error types never leave this crate.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | `OpenAiModelConfig`, `OpenAiClientConfig` |
//! | [`openai`] | `OpenAiClient` |

pub mod config;
pub mod openai;

pub use config::{OpenAiClientConfig, OpenAiModelConfig, DEFAULT_INVOCATION_DEADLINE};
pub use openai::OpenAiClient;
