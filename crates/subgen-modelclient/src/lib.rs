//! The Model Adapter (C6): issues one generative-model request per
//! (segment, target) pair given a segment reference and a language/mode
//! prompt, returning raw cue-list text (spec.md §4.5).

pub mod adapter;
pub mod client;
pub mod error;
pub mod single_flight;
pub mod templates;

pub use adapter::ModelClient;
pub use client::ModelHttpClient;
pub use error::{ModelError, ModelResult};
pub use single_flight::SingleFlight;
pub use templates::{PromptTemplate, PromptTemplateRegistry};
