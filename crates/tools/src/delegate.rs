//! Text-generation delegate: a fixed prompt template rendered with
//! variables, sent as one non-streaming request, raw reply text returned.

use siftwire_core::error::ProviderError;
use siftwire_core::message::Message;
use siftwire_core::prompt::PromptTemplate;
use siftwire_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::debug;

/// A provider bound to a model and temperature.
#[derive(Clone)]
pub struct Delegate {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl Delegate {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render `template` with `vars` and return the generated text.
    pub async fn generate(
        &self,
        template: &PromptTemplate,
        vars: &[(&str, &str)],
    ) -> Result<String, ProviderError> {
        let prompt = template.render(vars);
        debug!(
            provider = self.provider.name(),
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling text-generation delegate"
        );

        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: None,
        };
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}

impl std::fmt::Debug for Delegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delegate")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}
