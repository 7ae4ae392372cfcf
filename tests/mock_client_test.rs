use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use url::Url;
use xjet_rs::model::{ChequeCreateRequest, InvoiceCreateRequest};
use xjet_rs::signer::verify_payload;
use xjet_rs::{ApiClient, CallError, Credentials, Ed25519Signer, Environment, MockDispatcher, OrderSide};

const API_KEY: &str = "test-api-key";
const SECRET_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

fn client_with(mock: &MockDispatcher, environment: Environment) -> ApiClient {
    ApiClient::with_dispatcher(
        Credentials::from_hex(API_KEY, SECRET_HEX).unwrap(),
        Url::parse(environment.base_url()).unwrap(),
        Arc::new(mock.clone()),
    )
    .unwrap()
}

fn ok_mock() -> MockDispatcher {
    MockDispatcher::new().with_fallback_json(json!({"ok": true}))
}

fn body_keys(body: &xjet_rs::Payload) -> Vec<&str> {
    body.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn test_success_payload_is_returned() {
    let mock = MockDispatcher::new().with_json(json!({"balance": 100}));
    let client = client_with(&mock, Environment::Production);

    let result = client.account().balance().await;
    assert_eq!(result.unwrap(), json!({"balance": 100}));
}

#[tokio::test]
async fn test_application_error_is_returned() {
    let mock = MockDispatcher::new().with_json(json!({"error": "insufficient_funds"}));
    let client = client_with(&mock, Environment::Production);

    let err = client.account().balance().await.unwrap_err();
    assert!(matches!(err, CallError::Application(Value::String(ref s)) if s == "insufficient_funds"));
}

#[tokio::test]
async fn test_connection_failure_is_returned() {
    let mock = MockDispatcher::new().with_failure("connection refused");
    let client = client_with(&mock, Environment::Production);

    let err = client.account().me().await.unwrap_err();
    assert!(matches!(err, CallError::Transport(ref msg) if msg == "connection refused"));
}

#[tokio::test]
async fn test_malformed_body_is_returned() {
    let mock = MockDispatcher::new().with_raw(200, "not json");
    let client = client_with(&mock, Environment::Production);

    let err = client.account().me().await.unwrap_err();
    assert!(matches!(err, CallError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_exchange_pairs_on_testnet() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Test);

    client.exchanges().pairs().await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.url.as_str(),
        "https://testnet.xjet.app/api/v1/exchanges.pairs"
    );
    assert_eq!(request.headers.get("X-API-Key").unwrap(), API_KEY);
    assert!(request.headers.get("X-API-Key").unwrap().is_sensitive());
    assert!(request.body.is_none());
    assert!(request.query.is_empty());
}

#[tokio::test]
async fn test_withdraw_body_is_signed() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client.account().withdraw("EQabc", "TON", 1.5).await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url.as_str(), "https://xjet.app/api/v1/account.withdraw");

    let body = request.body.unwrap();
    assert_eq!(
        body_keys(&body),
        ["ton_address", "currency", "amount", "query_id", "signature"]
    );
    assert_eq!(body["ton_address"], "EQabc");
    assert_eq!(body["currency"], "TON");
    assert_eq!(body["amount"], 1.5);
    assert_eq!(body["query_id"].as_u64().unwrap() & 0xffff, 0);

    let signature = body["signature"].as_str().unwrap();
    assert_eq!(signature.len(), 128);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    let verifying_key = Ed25519Signer::from_hex(SECRET_HEX).unwrap().verifying_key();
    assert!(verify_payload(&body, &verifying_key).unwrap());
}

#[tokio::test]
async fn test_unsigned_operations() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client.account().me().await.unwrap();
    client.account().balance().await.unwrap();
    client.account().submit_deposit().await.unwrap();
    client.cheques().list().await.unwrap();
    client.invoices().list().await.unwrap();
    client.nft().list().await.unwrap();
    client.system().currencies().await.unwrap();

    let paths: Vec<String> = mock
        .requests()
        .iter()
        .map(|request| {
            assert_eq!(request.method, Method::POST);
            assert!(request.body.is_none());
            request.url.path().to_string()
        })
        .collect();
    assert_eq!(
        paths,
        [
            "/api/v1/account.me",
            "/api/v1/account.balances",
            "/api/v1/account.submitDeposit",
            "/api/v1/cheque.list",
            "/api/v1/invoice.list",
            "/api/v1/nft.list",
            "/api/v1/system.currencies",
        ]
    );
}

#[tokio::test]
async fn test_operations_pagination_body() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client.account().operations(20, 40).await.unwrap();
    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(Value::Object(body), json!({"limit": 20, "offset": 40}));

    client.account().recent_operations().await.unwrap();
    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(Value::Object(body), json!({"limit": 100, "offset": 0}));
}

#[tokio::test]
async fn test_query_param_operations() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client.cheques().status("chq_1").await.unwrap();
    client.invoices().status("inv_2").await.unwrap();
    client.exchanges().order_status("ord_3").await.unwrap();

    let requests = mock.requests();
    let expected = [
        ("/api/v1/cheque.status", "cheque_id", "chq_1"),
        ("/api/v1/invoice.status", "invoice_id", "inv_2"),
        ("/api/v1/exchanges.orderStatus", "id", "ord_3"),
    ];
    for (request, (path, key, value)) in requests.iter().zip(expected) {
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), path);
        assert_eq!(request.query, vec![(key.to_string(), value.to_string())]);
        assert!(request.body.is_none());
    }
}

#[tokio::test]
async fn test_cheque_create_is_signed_in_documented_order() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    let request = ChequeCreateRequest::new("TON", 5i64)
        .with_activates_count(3)
        .with_groups(vec![-1001234])
        .with_description("Welcome bonus");
    client.cheques().create(&request).await.unwrap();

    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(
        body_keys(&body),
        [
            "currency",
            "amount",
            "expires",
            "description",
            "activates_count",
            "groups_id",
            "personal_id",
            "password",
            "query_id",
            "signature"
        ]
    );
    assert_eq!(body["activates_count"], 3);
    assert_eq!(body["groups_id"], json!([-1001234]));
    assert_eq!(body["password"], Value::Null);
}

#[tokio::test]
async fn test_cheque_cancel_and_invoice_create_are_unsigned() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client.cheques().cancel("chq_9").await.unwrap();
    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(Value::Object(body), json!({"cheque_id": "chq_9"}));

    let invoice = InvoiceCreateRequest::new("USDT", 25i64)
        .with_description("Order #12")
        .with_max_payments(2);
    client.invoices().create(&invoice).await.unwrap();
    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(
        Value::Object(body),
        json!({
            "currency": "usdt",
            "amount": 25,
            "description": "Order #12",
            "max_payments": 2
        })
    );
}

#[tokio::test]
async fn test_nft_transfer_is_signed() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client.nft().transfer("EQnft", "EQdest").await.unwrap();

    let request = mock.last_request().unwrap();
    assert_eq!(request.url.path(), "/api/v1/nft.transfer");
    let body = request.body.unwrap();
    assert_eq!(
        body_keys(&body),
        ["nft_address", "to_address", "query_id", "signature"]
    );
}

#[tokio::test]
async fn test_exchange_estimate_and_order() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    client
        .exchanges()
        .estimate(["exc", "ton"], OrderSide::Buy, 10i64)
        .await
        .unwrap();
    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(
        Value::Object(body),
        json!({"pair": ["exc", "ton"], "type": "buy", "amount": 10})
    );

    client
        .exchanges()
        .create_order(["exc", "ton"], OrderSide::Sell, 10i64, 2.5)
        .await
        .unwrap();
    let request = mock.last_request().unwrap();
    assert_eq!(request.url.path(), "/api/v1/exchanges.createOrder");
    let body = request.body.unwrap();
    assert_eq!(
        body_keys(&body),
        ["pair", "type", "amount", "min_expected_amount", "query_id", "signature"]
    );
    assert_eq!(body["min_expected_amount"], 2.5);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.account().balance().await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(mock.request_count(), 8);
}

#[tokio::test]
async fn test_cheque_with_signature_field_is_rejected() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    let mut request = ChequeCreateRequest::new("TON", 5i64);
    request
        .extra
        .insert("signature".to_string(), json!("forged"));
    let err = client.cheques().create(&request).await.unwrap_err();

    assert!(matches!(err, CallError::InvalidRequest(ref msg) if msg.contains("signature")));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_cheque_extras_keep_documented_values() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    let request = ChequeCreateRequest::new("TON", 5i64)
        .with_extra("amount", 999)
        .with_extra("signature", "forged")
        .with_extra("lang", "en");
    client.cheques().create(&request).await.unwrap();

    let body = mock.last_request().unwrap().body.unwrap();
    assert_eq!(body["amount"], 5);
    assert_eq!(body["lang"], "en");
    let verifying_key = Ed25519Signer::from_hex(SECRET_HEX).unwrap().verifying_key();
    assert!(verify_payload(&body, &verifying_key).unwrap());
}

#[tokio::test]
async fn test_non_finite_amounts_are_rejected_before_sending() {
    let mock = ok_mock();
    let client = client_with(&mock, Environment::Production);

    let err = client
        .account()
        .withdraw("EQabc", "TON", f64::NAN)
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::InvalidRequest(_)));

    let err = client
        .exchanges()
        .estimate(["exc", "ton"], OrderSide::Buy, f64::INFINITY)
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::InvalidRequest(_)));

    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_constructor_rejects_bad_credentials() {
    let mock = ok_mock();
    let url = Url::parse(Environment::Production.base_url()).unwrap();

    let err = ApiClient::with_dispatcher(
        Credentials::new(API_KEY, Some(vec![1u8; 16])),
        url.clone(),
        Arc::new(mock.clone()),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        xjet_rs::Error::InvalidSigningKey(xjet_rs::SignerError::InvalidKeyLength { actual: 16 })
    ));

    let err = ApiClient::with_dispatcher(Credentials::api_key_only(""), url.clone(), Arc::new(mock.clone()))
        .unwrap_err();
    assert!(matches!(err, xjet_rs::Error::InvalidApiKey(_)));

    let err = ApiClient::with_dispatcher(Credentials::api_key_only("bad\nkey"), url, Arc::new(mock))
        .unwrap_err();
    assert!(matches!(err, xjet_rs::Error::InvalidApiKey(_)));
}
