//! In-memory network client for offline use and testing.
//!
//! Serves a fixed chain view: a block height, a fee rate and canned
//! invocation results. Individual calls can be made to fail so that error
//! handling can be exercised without a node.

use crate::network::client::{InvokeResult, NetworkClient, NetworkError};
use crate::types::fixed8::Fixed8;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// The calls a [`NetworkClient`] can receive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClientCall {
    BlockHeight,
    InvokeScript,
    FeePerByte,
}

#[derive(Debug, Default)]
struct ChainView {
    height: u32,
    fee_per_byte: Fixed8,
    default_invoke: InvokeResult,
    scripts: HashMap<Vec<u8>, InvokeResult>,
    failing: HashSet<ClientCall>,
    calls: HashMap<ClientCall, usize>,
}

/// A [`NetworkClient`] answering from memory.
#[derive(Debug, Default)]
pub struct LocalClient {
    view: Mutex<ChainView>,
}

impl LocalClient {
    pub fn new(height: u32, fee_per_byte: Fixed8) -> Self {
        Self {
            view: Mutex::new(ChainView {
                height,
                fee_per_byte,
                ..ChainView::default()
            }),
        }
    }

    /// Result returned for scripts without a specific entry.
    pub fn with_invoke_result(mut self, result: InvokeResult) -> Self {
        self.view.get_mut().default_invoke = result;
        self
    }

    /// Result returned for one particular script.
    pub fn with_script_result(mut self, script: Vec<u8>, result: InvokeResult) -> Self {
        self.view.get_mut().scripts.insert(script, result);
        self
    }

    /// Makes every `call` fail with [`NetworkError::Unavailable`].
    pub fn failing(mut self, call: ClientCall) -> Self {
        self.view.get_mut().failing.insert(call);
        self
    }

    pub async fn set_height(&self, height: u32) {
        self.view.lock().await.height = height;
    }

    pub async fn set_fee_per_byte(&self, fee_per_byte: Fixed8) {
        self.view.lock().await.fee_per_byte = fee_per_byte;
    }

    /// How many times `call` has been made.
    pub async fn call_count(&self, call: ClientCall) -> usize {
        self.view.lock().await.calls.get(&call).copied().unwrap_or(0)
    }

    async fn record<T>(&self, call: ClientCall, answer: impl FnOnce(&ChainView) -> T) -> Result<T, NetworkError> {
        let mut view = self.view.lock().await;
        *view.calls.entry(call).or_insert(0) += 1;
        if view.failing.contains(&call) {
            return Err(NetworkError::Unavailable(format!("{call:?} disabled")));
        }
        Ok(answer(&view))
    }
}

#[async_trait::async_trait]
impl NetworkClient for LocalClient {
    async fn get_current_block_height(&self) -> Result<u32, NetworkError> {
        self.record(ClientCall::BlockHeight, |v| v.height).await
    }

    async fn invoke_script(&self, script: &[u8]) -> Result<InvokeResult, NetworkError> {
        self.record(ClientCall::InvokeScript, |v| {
            v.scripts.get(script).cloned().unwrap_or_else(|| v.default_invoke.clone())
        })
        .await
    }

    async fn get_fee_per_byte(&self) -> Result<Fixed8, NetworkError> {
        self.record(ClientCall::FeePerByte, |v| v.fee_per_byte).await
    }
}
