//! JSON-RPC adapter behaviour against a mock HTTP node

use mockito::{Matcher, Server};
use serde_json::json;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};
use staking_cli::program::{GlobalPoolView, STAKING_PROGRAM_ID};
use staking_cli::rpc::{connect, LedgerClient, RpcError};
use std::sync::Arc;

fn rpc_result(result: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string()
}

#[tokio::test]
async fn test_absent_account_is_none() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getAccountInfo" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({ "context": { "slot": 42 }, "value": null })))
        .create_async()
        .await;

    let ledger: Arc<dyn LedgerClient> = connect(&server.url());
    let account = ledger.get_account(&Pubkey::new_unique()).await.unwrap();

    assert!(account.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_present_account_is_decoded() {
    use base64::Engine as _;

    let admin = Pubkey::new_unique();
    let data = GlobalPoolView {
        admin,
        total_locked_count: 5,
    }
    .encode();
    let encoded = base64::engine::general_purpose::STANDARD.encode(&data);

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getAccountInfo" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "context": { "slot": 42 },
            "value": {
                "data": [encoded, "base64"],
                "executable": false,
                "lamports": 1_000_000,
                "owner": STAKING_PROGRAM_ID.to_string(),
                "rentEpoch": 0,
                "space": data.len()
            }
        })))
        .create_async()
        .await;

    let ledger: Arc<dyn LedgerClient> = connect(&server.url());
    let account = ledger
        .get_account(&Pubkey::new_unique())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(account.owner, STAKING_PROGRAM_ID);
    assert_eq!(GlobalPoolView::decode(&account.data).unwrap().admin, admin);
}

#[tokio::test]
async fn test_http_failure_is_transport_error_not_absence() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let ledger: Arc<dyn LedgerClient> = connect(&server.url());
    let err = ledger.get_account(&Pubkey::new_unique()).await.unwrap_err();

    assert!(matches!(err, RpcError::Transport { .. }), "got {err:?}");
    assert!(err.is_retryable());
    assert_eq!(err.endpoint(), Some(server.url().as_str()));
}

#[tokio::test]
async fn test_latest_blockhash() {
    let blockhash = Hash::new_unique();
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getLatestBlockhash" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "context": { "slot": 42 },
            "value": { "blockhash": blockhash.to_string(), "lastValidBlockHeight": 300 }
        })))
        .create_async()
        .await;

    let ledger: Arc<dyn LedgerClient> = connect(&server.url());
    assert_eq!(ledger.get_latest_blockhash().await.unwrap(), blockhash);
}

#[tokio::test]
async fn test_signature_status_states() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getSignatureStatuses" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "context": { "slot": 42 },
            "value": [{
                "slot": 40,
                "confirmations": null,
                "err": null,
                "status": { "Ok": null },
                "confirmationStatus": "finalized"
            }]
        })))
        .create_async()
        .await;

    let ledger: Arc<dyn LedgerClient> = connect(&server.url());
    let status = ledger
        .get_signature_status(&Signature::default())
        .await
        .unwrap();
    assert_eq!(status, Some(Ok(())));
}

#[tokio::test]
async fn test_unknown_signature_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getSignatureStatuses" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({ "context": { "slot": 42 }, "value": [null] })))
        .create_async()
        .await;

    let ledger: Arc<dyn LedgerClient> = connect(&server.url());
    let status = ledger
        .get_signature_status(&Signature::default())
        .await
        .unwrap();
    assert_eq!(status, None);
}
