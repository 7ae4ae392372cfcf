//! httpmock fixtures reproducing xJet API responses
//!
//! Paths assume the client's base URL is `server.url(BASE_PATH)`.

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};

/// Path prefix of every operation
pub const BASE_PATH: &str = "/api/v1";

pub fn operation_path(operation: &str) -> String {
    format!("{}/{}", BASE_PATH, operation)
}

/// Any POST to `operation` answered with `body`
pub fn mock_post_json<'a>(server: &'a MockServer, operation: &str, body: Value) -> Mock<'a> {
    let path = operation_path(operation);
    server.mock(|when, then| {
        when.method(POST).path(path);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(body);
    })
}

/// Any POST to `operation` answered with `{"error": error}`
pub fn mock_application_error<'a>(server: &'a MockServer, operation: &str, error: Value) -> Mock<'a> {
    mock_post_json(server, operation, json!({ "error": error }))
}

pub fn mock_balances<'a>(server: &'a MockServer, api_key: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path(operation_path("account.balances"))
            .header("x-api-key", api_key);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "balances": [
                    {"currency": "ton", "amount": 12.5},
                    {"currency": "usdt", "amount": 100}
                ]
            }));
    })
}

pub fn mock_exchange_pairs<'a>(server: &'a MockServer, api_key: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path(operation_path("exchanges.pairs"))
            .header("x-api-key", api_key);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "pairs": [["exc", "ton"], ["ton", "usdt"]]
            }));
    })
}

pub fn mock_cheque_status<'a>(server: &'a MockServer, cheque_id: &str) -> Mock<'a> {
    let cheque_id = cheque_id.to_string();
    server.mock(|when, then| {
        when.method(POST)
            .path(operation_path("cheque.status"))
            .query_param("cheque_id", cheque_id.as_str());
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "cheque": {
                    "id": cheque_id,
                    "currency": "ton",
                    "amount": 5,
                    "activates_count": 1,
                    "activated": 0,
                    "status": "active"
                }
            }));
    })
}

/// `account.withdraw` that only matches signed bodies carrying the documented fields
pub fn mock_withdraw<'a>(server: &'a MockServer) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path(operation_path("account.withdraw"))
            .header("content-type", "application/json")
            .body_contains("\"ton_address\": ")
            .body_contains("\"query_id\": ")
            .body_contains("\"signature\": ");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "withdrawal": {"id": 901, "status": "pending"}
            }));
    })
}

/// A gateway that fails without a JSON body
pub fn mock_bad_gateway<'a>(server: &'a MockServer, operation: &str) -> Mock<'a> {
    let path = operation_path(operation);
    server.mock(|when, then| {
        when.path(path);
        then.status(502)
            .header("content-type", "text/html")
            .body("<html><body>502 Bad Gateway</body></html>");
    })
}

/// Rate limiting that always answers `429` with the given `Retry-After`
pub fn mock_rate_limited<'a>(server: &'a MockServer, operation: &str, retry_after: &str) -> Mock<'a> {
    let path = operation_path(operation);
    server.mock(|when, then| {
        when.path(path);
        then.status(429)
            .header("content-type", "application/json")
            .header("retry-after", retry_after)
            .json_body(json!({"error": "rate_limited"}));
    })
}
