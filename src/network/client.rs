//! Network collaborator consumed by the validator.
//!
//! The crate never talks to a node itself. Callers plug in an implementation
//! of [`NetworkClient`] backed by whatever RPC transport they use.

use crate::types::fixed8::Fixed8;
use serde_json::Value;

/// Errors that can occur while querying the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The node answered with an RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node could not be reached.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// The node answered with something that is not a valid result.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Outcome of a trial execution of a script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvokeResult {
    /// True when the VM ended in the `HALT` state.
    pub halted: bool,
    pub gas_consumed: Fixed8,
    pub fault_message: Option<String>,
}

impl InvokeResult {
    pub fn halt(gas_consumed: Fixed8) -> Self {
        Self {
            halted: true,
            gas_consumed,
            fault_message: None,
        }
    }

    pub fn fault(gas_consumed: Fixed8, message: impl Into<String>) -> Self {
        Self {
            halted: false,
            gas_consumed,
            fault_message: Some(message.into()),
        }
    }

    /// Reads the result object of an `invokescript` RPC call.
    ///
    /// Expects `state` (`"HALT"` or `"FAULT"`), `gasconsumed` as a decimal
    /// string and an optional `exception` message.
    pub fn from_rpc_json(json: &Value) -> Result<Self, NetworkError> {
        let invalid = |what: &str| NetworkError::InvalidResponse(format!("{what} in {json}"));
        let state = json
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing state"))?;
        let gas_consumed = json
            .get("gasconsumed")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing gasconsumed"))?
            .parse::<Fixed8>()
            .map_err(|e| invalid(&e.to_string()))?;
        let exception = json.get("exception").and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            halted: state.contains("HALT") && !state.contains("FAULT"),
            gas_consumed,
            fault_message: exception,
        })
    }
}

/// Read-only view of live network state.
///
/// Implementations must be safe to share across tasks: the validator issues
/// independent calls concurrently.
#[async_trait::async_trait]
pub trait NetworkClient: Send + Sync {
    /// Height of the latest block.
    async fn get_current_block_height(&self) -> Result<u32, NetworkError>;

    /// Executes `script` against current chain state without persisting it.
    async fn invoke_script(&self, script: &[u8]) -> Result<InvokeResult, NetworkError>;

    /// Network fee charged per serialized transaction byte.
    async fn get_fee_per_byte(&self) -> Result<Fixed8, NetworkError>;
}
