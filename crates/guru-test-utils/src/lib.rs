//! Shared test fakes for the guru workspace.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use guru_core::generator::{FragmentStream, Generator, GeneratorError};

/// A [`Generator`] that replays a fixed fragment script.
///
/// Every received prompt is recorded so tests can assert on what the
/// caller asked for. `Err` script entries become per-fragment decode
/// errors; [`ScriptedGenerator::failing`] fails at establishment instead.
pub struct ScriptedGenerator {
    script: Vec<Result<String, String>>,
    connect_error: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Replay `fragments` in order, then end the stream.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: fragments.into_iter().map(|f| Ok(f.into())).collect(),
            connect_error: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replay a script that mixes fragments with per-fragment errors.
    pub fn with_script(script: Vec<Result<String, String>>) -> Self {
        Self {
            script,
            connect_error: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every `stream` call at establishment with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Vec::new(),
            connect_error: Some(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream(&self, prompt: &str) -> Result<FragmentStream, GeneratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(message) = &self.connect_error {
            return Err(GeneratorError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        let items: Vec<Result<String, GeneratorError>> = self
            .script
            .iter()
            .map(|entry| match entry {
                Ok(fragment) => Ok(fragment.clone()),
                Err(message) => Err(GeneratorError::Decode(message.clone())),
            })
            .collect();

        Ok(Box::pin(stream::iter(items)))
    }
}
