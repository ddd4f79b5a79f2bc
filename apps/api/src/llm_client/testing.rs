//! In-memory provider for dispatch and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{LlmProvider, ProviderError, ProviderKind};

#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(String),
    Fail,
    Hang,
}

pub struct ScriptedProvider {
    kind: ProviderKind,
    available: bool,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn healthy(kind: ProviderKind, reply: impl Into<String>) -> Arc<Self> {
        Self::build(kind, true, Behavior::Reply(reply.into()))
    }

    pub fn failing(kind: ProviderKind) -> Arc<Self> {
        Self::build(kind, true, Behavior::Fail)
    }

    pub fn hanging(kind: ProviderKind) -> Arc<Self> {
        Self::build(kind, true, Behavior::Hang)
    }

    pub fn unconfigured(kind: ProviderKind) -> Arc<Self> {
        Self::build(kind, false, Behavior::Fail)
    }

    fn build(kind: ProviderKind, available: bool, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            available,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn call(&self, _user_prompt: &str, _system_prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(ProviderError::NotConfigured {
                provider: self.kind,
            });
        }
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail => Err(ProviderError::Api {
                provider: self.kind,
                status: 503,
                message: "scripted failure".to_string(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::EmptyContent {
                    provider: self.kind,
                })
            }
        }
    }
}
