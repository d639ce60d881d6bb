//! Duration oracles available to the planner.

use std::time::Duration;

use anyhow::{Context, Result};
use dp_core::{DurationOracle, FixedEstimate, Minutes, NoEstimates};
use dp_llm::Client;
use tokio::runtime::Runtime;

use crate::Config;

/// Asks Claude for estimates, one blocking request per unknown task.
///
/// Every failure (timeout, transport, API error, a reply without a usable
/// number) falls back to the configured default estimate, or to "unknown".
#[derive(Debug)]
pub struct LlmOracle {
    client: Client,
    model: String,
    timeout: Duration,
    fallback: Option<Minutes>,
    runtime: Runtime,
}

impl LlmOracle {
    pub fn new(
        client: Client,
        model: impl Into<String>,
        timeout: Duration,
        fallback: Option<Minutes>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to initialize tokio runtime")?;
        Ok(Self {
            client,
            model: model.into(),
            timeout,
            fallback,
            runtime,
        })
    }

    fn fallback(&self) -> Option<i64> {
        self.fallback.map(|minutes| i64::from(minutes.get()))
    }
}

impl DurationOracle for LlmOracle {
    fn resolve(&mut self, description: &str) -> Option<i64> {
        let timeout = self.timeout;
        let request = self.client.estimate_minutes(&self.model, description);
        // The timer must be created inside the runtime.
        let answer = self
            .runtime
            .block_on(async move { tokio::time::timeout(timeout, request).await });
        match answer {
            Ok(Ok(Some(minutes))) if minutes > 0 => Some(minutes),
            Ok(Ok(answer)) => {
                tracing::warn!(task = description, ?answer, "model gave no usable estimate");
                self.fallback()
            }
            Ok(Err(err)) => {
                tracing::warn!(task = description, error = %err, "duration estimate failed");
                self.fallback()
            }
            Err(_) => {
                tracing::warn!(
                    task = description,
                    timeout_secs = self.timeout.as_secs(),
                    "duration estimate timed out"
                );
                self.fallback()
            }
        }
    }
}

/// Picks the oracle for this configuration.
///
/// With an API key, Claude is asked; otherwise every unknown task gets
/// `default_task_minutes`, or stays unknown when that is unset.
pub fn build_oracle(config: &Config) -> Result<Box<dyn DurationOracle>> {
    let fallback = config
        .default_task_minutes
        .filter(|minutes| *minutes > 0)
        .map(Minutes::new);

    if let Some(api_key) = config.api_key() {
        let client = Client::new(api_key).context("failed to create LLM client")?;
        let oracle = LlmOracle::new(
            client,
            config.model.clone(),
            Duration::from_secs(config.oracle_timeout_secs),
            fallback,
        )?;
        tracing::debug!(model = %config.model, "estimating durations with Claude");
        return Ok(Box::new(oracle));
    }

    Ok(match fallback {
        Some(minutes) => Box::new(FixedEstimate(minutes)),
        None => Box::new(NoEstimates),
    })
}
