//! Reducer operation tests for the calculator daemon.

use super::TestServer;
use crate::calc_daemon::rpc_client::{CalcClient, ClientError};
use crate::rpc::CalcError;

async fn session_with(client: &CalcClient, values: &[i64]) -> String {
    let id = client.create_session().await.unwrap();
    for value in values {
        client.push_value(&id, *value).await.unwrap();
    }
    id
}

#[tokio::test]
async fn test_min_and_max_collapse_stack() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;

    let id = session_with(&client, &[8, -3, 12, 5]).await;
    client.push_operation(&id, "min").await.unwrap();
    assert_eq!(client.pop(&id).await.unwrap(), Some(-3));
    assert!(client.is_empty(&id).await.unwrap());

    let id = session_with(&client, &[8, -3, 12, 5]).await;
    client.push_operation(&id, "max").await.unwrap();
    assert_eq!(client.pop(&id).await.unwrap(), Some(12));
    assert!(client.is_empty(&id).await.unwrap());
}

#[tokio::test]
async fn test_gcd_and_lcm_ignore_push_order() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;

    for order in [[12, 18, 8], [8, 12, 18], [18, 8, 12]] {
        let id = session_with(&client, &order).await;
        client.push_operation(&id, "gcd").await.unwrap();
        assert_eq!(client.pop(&id).await.unwrap(), Some(2));

        let id = session_with(&client, &order).await;
        client.push_operation(&id, "lcm").await.unwrap();
        assert_eq!(client.pop(&id).await.unwrap(), Some(72));
    }
}

#[tokio::test]
async fn test_operation_on_singleton_keeps_value() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;

    for op in ["min", "max", "gcd", "lcm"] {
        for value in [21, -6, i64::MIN] {
            let id = session_with(&client, &[value]).await;
            client.push_operation(&id, op).await.unwrap();
            assert_eq!(client.pop(&id).await.unwrap(), Some(value), "operator {}", op);
        }
    }
}

#[tokio::test]
async fn test_operation_on_empty_stack_is_noop() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;
    let id = client.create_session().await.unwrap();

    client.push_operation(&id, "max").await.unwrap();

    assert!(client.is_empty(&id).await.unwrap());
    assert_eq!(client.pop(&id).await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_operator_is_rejected() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;
    let id = session_with(&client, &[1, 2]).await;

    let err = client.push_operation(&id, "avg").await.unwrap_err();
    match err {
        ClientError::Rejected(CalcError::UnknownOperator { operator }) => {
            assert_eq!(operator, "avg")
        }
        other => panic!("Expected UnknownOperator, got {}", other),
    }

    // The stack is left alone
    assert_eq!(client.pop(&id).await.unwrap(), Some(2));
    assert_eq!(client.pop(&id).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_unknown_operator_rejected_even_on_empty_stack() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;
    let id = client.create_session().await.unwrap();

    let err = client.push_operation(&id, "sum").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Rejected(CalcError::UnknownOperator { .. })
    ));
}

#[tokio::test]
async fn test_lcm_with_zero_yields_zero() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;
    let id = session_with(&client, &[6, 0, 4]).await;

    client.push_operation(&id, "lcm").await.unwrap();

    assert_eq!(client.pop(&id).await.unwrap(), Some(0));
}

#[tokio::test]
async fn test_overflowing_lcm_leaves_stack_untouched() {
    let server = TestServer::start().await;
    let client = server.calc_client().await;
    let id = session_with(&client, &[i64::MAX, i64::MAX - 1]).await;

    let err = client.push_operation(&id, "lcm").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Rejected(CalcError::Overflow { .. })
    ));

    assert_eq!(client.pop(&id).await.unwrap(), Some(i64::MAX - 1));
    assert_eq!(client.pop(&id).await.unwrap(), Some(i64::MAX));
}
