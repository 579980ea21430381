//! Question answering over curated news sites.
//!
//! The [`ResearchPipeline`] drives the extraction tools for a free-text
//! question:
//!
//! 1. **Map** the question onto keywords and subject categories
//! 2. **Look up** homepages for those subjects in the topic directory
//! 3. **Scan** each homepage for articles matching the keywords
//! 4. **Extract** the admitted articles
//! 5. **Answer** from the extracted text, citing source URLs
//!
//! Every step is a tool call through the string protocol, so the same
//! registry serves both the pipeline and direct tool invocations.

pub mod pipeline;

pub use pipeline::{PipelineError, PipelineOutcome, ResearchPipeline, Thought};
