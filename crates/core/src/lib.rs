//! # Siftwire Core
//!
//! Domain types, traits, and error definitions for the Siftwire article
//! extraction pipeline. This crate has **no transport dependencies**: it
//! defines the model that the tools, providers and pipeline implement
//! against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (text generation, topic directory) is a trait
//! here; implementations live in their own crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod directory;
pub mod error;
pub mod message;
pub mod prompt;
pub mod protocol;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use directory::{DirectoryClient, DirectoryRecord, TopicQuery};
pub use message::{Message, Role};
pub use prompt::PromptTemplate;
pub use protocol::{AdmittedLink, ArticleContext, ArticleRecord, QueryAnalysis};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{Tool, ToolDescriptor, ToolRegistry, ToolResult};
