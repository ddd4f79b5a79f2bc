//! Dispatch Core — picks a starting provider by round-robin and fails over
//! to the next available provider exactly once.
//!
//! Each logical request makes at most `MAX_ATTEMPTS` provider calls. The
//! rotation cursor advances once per request, before the first call is
//! issued, so overlapping requests start on different providers.

pub mod normalize;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::dispatch::normalize::{normalize, ParseError};
use crate::llm_client::{truncate, LlmProvider, ProviderError, ProviderKind};

/// Primary plus one failover.
pub const MAX_ATTEMPTS: usize = 2;
const RAW_TEXT_LOG_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("all providers failed after {attempts} attempt(s): {}", .causes.join("; "))]
    AllProvidersFailed { attempts: usize, causes: Vec<String> },
}

/// Why a single provider attempt was rejected.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Round-robin cursor over the dispatcher's provider list.
///
/// Invariant: `current() < len` whenever `len > 0`.
#[derive(Debug)]
pub struct DispatchState {
    cursor: AtomicUsize,
    len: usize,
}

impl DispatchState {
    pub fn new(len: usize) -> Self {
        Self::starting_at(0, len)
    }

    pub fn starting_at(start: usize, len: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(if len == 0 { 0 } else { start % len }),
            len,
        }
    }

    pub fn current(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Returns the slot for this request and moves the cursor one position,
    /// as a single atomic step.
    pub fn advance(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        let len = self.len;
        match self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some((c + 1) % len))
        {
            Ok(previous) | Err(previous) => previous,
        }
    }
}

pub struct Dispatcher {
    providers: Vec<Arc<dyn LlmProvider>>,
    state: DispatchState,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>, call_timeout: Duration) -> Self {
        let state = DispatchState::new(providers.len());
        Self::with_state(providers, state, call_timeout)
    }

    pub fn with_state(
        providers: Vec<Arc<dyn LlmProvider>>,
        state: DispatchState,
        call_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            state,
            call_timeout,
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.kind())
            .collect()
    }

    /// Providers to try for a request whose round-robin slot is `slot`:
    /// available providers in rotation order, capped at `MAX_ATTEMPTS`.
    /// An unavailable slot provider is skipped, so the next one becomes primary.
    fn plan(&self, slot: usize) -> Vec<Arc<dyn LlmProvider>> {
        let len = self.providers.len();
        (0..len)
            .map(|offset| &self.providers[(slot + offset) % len])
            .filter(|p| p.is_available())
            .take(MAX_ATTEMPTS)
            .cloned()
            .collect()
    }

    /// Runs one logical request: primary attempt, then a single failover.
    ///
    /// The model output must normalize to a JSON object that deserializes
    /// into `T`; schema mismatches fail over like transport errors.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<T, DispatchError> {
        if self.providers.is_empty() {
            error!("dispatch requested with no providers registered");
            return Err(DispatchError::AllProvidersFailed {
                attempts: 0,
                causes: vec!["no providers registered".to_string()],
            });
        }

        let slot = self.state.advance();
        let plan = self.plan(slot);

        if plan.is_empty() {
            error!(slot, "no configured providers available");
            return Err(DispatchError::AllProvidersFailed {
                attempts: 0,
                causes: vec!["no configured providers".to_string()],
            });
        }

        debug!(slot, next_slot = self.state.current(), primary = %plan[0].kind(), "dispatching");

        let mut causes = Vec::with_capacity(plan.len());
        for (attempt, provider) in plan.iter().enumerate() {
            match self.attempt::<T>(&**provider, user_prompt, system_prompt).await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(provider = %provider.kind(), "failover succeeded");
                    }
                    return Ok(value);
                }
                Err(AttemptError::Parse(e)) => {
                    warn!(
                        provider = %provider.kind(),
                        attempt,
                        raw = %truncate(e.raw_text(), RAW_TEXT_LOG_CHARS),
                        "unparsable model output: {e}"
                    );
                    causes.push(format!("{}: {e}", provider.kind()));
                }
                Err(AttemptError::Provider(e)) => {
                    warn!(provider = %provider.kind(), attempt, "provider call failed: {e}");
                    causes.push(format!("{}: {e}", provider.kind()));
                }
            }
        }

        error!(attempts = plan.len(), "all providers failed");
        Err(DispatchError::AllProvidersFailed {
            attempts: plan.len(),
            causes,
        })
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        provider: &dyn LlmProvider,
        user_prompt: &str,
        system_prompt: &str,
    ) -> Result<T, AttemptError> {
        let raw = tokio::time::timeout(self.call_timeout, provider.call(user_prompt, system_prompt))
            .await
            .map_err(|_| ProviderError::Timeout {
                provider: provider.kind(),
                secs: self.call_timeout.as_secs(),
            })??;

        let value = normalize(&raw)?;
        serde_json::from_value(value).map_err(|source| {
            AttemptError::Parse(ParseError::Schema {
                raw_text: raw,
                source,
            })
        })
    }
}
