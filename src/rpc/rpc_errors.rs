use solana_client::client_error::ClientError;
use solana_rpc_client_api::{client_error::ErrorKind, request::RpcError as JsonRpcError};
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// Ledger access errors
///
/// "Account does not exist" is deliberately absent: it is a normal answer
/// (`Ok(None)`) from [`super::LedgerClient::get_account`], not a failure.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Transport-level errors (network, connection, HTTP status)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Timeout (endpoint: {endpoint}): {message}")]
    Timeout { endpoint: String, message: String },

    /// JSON-RPC error responses from the node
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    #[error("Blockhash not found (endpoint: {endpoint})")]
    BlockhashNotFound { endpoint: String },

    #[error("Transaction expired (endpoint: {endpoint})")]
    TransactionExpired { endpoint: String },

    #[error("Insufficient funds (endpoint: {endpoint})")]
    InsufficientFunds { endpoint: String },

    /// The transaction landed but the program rejected it
    #[error("Transaction failed: {reason} (endpoint: {endpoint})")]
    TransactionFailed { endpoint: String, reason: String },

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Transport { .. } => true,
            RpcError::Timeout { .. } => true,
            RpcError::BlockhashNotFound { .. } => true,

            RpcError::TransactionExpired { .. } => false,
            RpcError::InsufficientFunds { .. } => false,
            RpcError::TransactionFailed { .. } => false,
            RpcError::Internal(_) => false,

            RpcError::RpcResponse { code, .. } => {
                // Retry on server errors (5xx)
                matches!(code, Some(c) if (500..600).contains(c))
            }
        }
    }

    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            RpcError::Transport { endpoint, .. } => Some(endpoint),
            RpcError::Timeout { endpoint, .. } => Some(endpoint),
            RpcError::RpcResponse { endpoint, .. } => Some(endpoint),
            RpcError::BlockhashNotFound { endpoint } => Some(endpoint),
            RpcError::TransactionExpired { endpoint } => Some(endpoint),
            RpcError::InsufficientFunds { endpoint } => Some(endpoint),
            RpcError::TransactionFailed { endpoint, .. } => Some(endpoint),
            RpcError::Internal(_) => None,
        }
    }

    pub fn transaction_failed(err: &TransactionError, endpoint: &str) -> Self {
        match err {
            TransactionError::BlockhashNotFound => RpcError::BlockhashNotFound {
                endpoint: endpoint.to_string(),
            },
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. } => RpcError::InsufficientFunds {
                endpoint: endpoint.to_string(),
            },
            other => RpcError::TransactionFailed {
                endpoint: endpoint.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        match err.kind() {
            ErrorKind::TransactionError(tx_err) => {
                return Self::transaction_failed(tx_err, endpoint);
            }
            ErrorKind::Reqwest(req_err) if req_err.is_timeout() => {
                return RpcError::Timeout {
                    endpoint: endpoint.to_string(),
                    message: req_err.to_string(),
                };
            }
            ErrorKind::Reqwest(req_err) => {
                return RpcError::Transport {
                    endpoint: endpoint.to_string(),
                    message: req_err.to_string(),
                };
            }
            ErrorKind::Io(io_err) => {
                return RpcError::Transport {
                    endpoint: endpoint.to_string(),
                    message: io_err.to_string(),
                };
            }
            _ => {}
        }

        let err_str = err.to_string().to_lowercase();

        // Classify based on error message
        if err_str.contains("blockhash not found") {
            RpcError::BlockhashNotFound {
                endpoint: endpoint.to_string(),
            }
        } else if err_str.contains("transaction expired")
            || err_str.contains("block height exceeded")
        {
            RpcError::TransactionExpired {
                endpoint: endpoint.to_string(),
            }
        } else if err_str.contains("insufficient funds")
            || err_str.contains("insufficient lamports")
        {
            RpcError::InsufficientFunds {
                endpoint: endpoint.to_string(),
            }
        } else if err_str.contains("timeout") || err_str.contains("timed out") {
            RpcError::Timeout {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            let code = match err.kind() {
                ErrorKind::RpcError(JsonRpcError::RpcResponseError { code, .. }) => Some(*code),
                _ => None,
            };

            RpcError::RpcResponse {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
                code,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "http://127.0.0.1:8899";

    #[test]
    fn test_transaction_error_classification() {
        let err = RpcError::from_client_error(
            ClientError::from(TransactionError::AccountInUse),
            ENDPOINT,
        );
        assert!(matches!(err, RpcError::TransactionFailed { .. }));
        assert!(!err.is_retryable());

        let err = RpcError::from_client_error(
            ClientError::from(TransactionError::BlockhashNotFound),
            ENDPOINT,
        );
        assert!(matches!(err, RpcError::BlockhashNotFound { .. }));
        assert!(err.is_retryable());

        let err = RpcError::from_client_error(
            ClientError::from(TransactionError::InsufficientFundsForFee),
            ENDPOINT,
        );
        assert!(matches!(err, RpcError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_rpc_response_code_is_kept() {
        let err = RpcError::from_client_error(
            ClientError::from(ErrorKind::RpcError(JsonRpcError::RpcResponseError {
                code: -32602,
                message: "Invalid params".to_string(),
                data: solana_rpc_client_api::request::RpcResponseErrorData::Empty,
            })),
            ENDPOINT,
        );
        match err {
            RpcError::RpcResponse { code, endpoint, .. } => {
                assert_eq!(code, Some(-32602));
                assert_eq!(endpoint, ENDPOINT);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_message_fallback_classification() {
        let err = RpcError::from_client_error(
            ClientError::from(ErrorKind::Custom("request timed out".to_string())),
            ENDPOINT,
        );
        assert!(matches!(err, RpcError::Timeout { .. }));
        assert!(err.is_retryable());
        assert_eq!(err.endpoint(), Some(ENDPOINT));
    }

    #[test]
    fn test_retryability() {
        let server_error = RpcError::RpcResponse {
            endpoint: ENDPOINT.to_string(),
            message: "bad gateway".to_string(),
            code: Some(502),
        };
        assert!(server_error.is_retryable());

        let client_error = RpcError::RpcResponse {
            endpoint: ENDPOINT.to_string(),
            message: "invalid params".to_string(),
            code: Some(-32602),
        };
        assert!(!client_error.is_retryable());
        assert!(!RpcError::Internal("x".to_string()).is_retryable());
    }
}
