//! Tests for the handler set and the dispatcher.
//!
//! Handlers run against an in-process gateway double that records every
//! backend call and returns a canned reply (or fails).

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use rube_mcp_bridge::error::{GatewayError, HandlerError};
use rube_mcp_bridge::gateway::{Gateway, Verb};
use rube_mcp_bridge::handlers;
use rube_mcp_bridge::protocol::{
    JsonRpcError, JsonRpcRequest, ResourceReadParams, RpcId, ToolCallParams,
};

#[derive(Debug, Clone, PartialEq)]
struct Call {
    path: String,
    verb: Verb,
    body: Option<Value>,
}

struct StubGateway {
    /// `None` makes every call fail with a 502.
    reply: Option<Value>,
    calls: Mutex<Vec<Call>>,
}

impl StubGateway {
    fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for StubGateway {
    async fn request(
        &self,
        path: &str,
        verb: Verb,
        body: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        self.calls.lock().unwrap().push(Call {
            path: path.to_string(),
            verb,
            body: body.cloned(),
        });
        match &self.reply {
            Some(v) => Ok(v.clone()),
            None => Err(GatewayError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "secret upstream detail".to_string(),
            }),
        }
    }
}

fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: Some("2.0".into()),
        id: Some(RpcId::from(id)),
        method: method.into(),
        params,
    }
}

// ---------------------------------------------------------------------------
// list handlers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_tools_passes_backend_array_through() {
    let gateway = StubGateway::replying(json!([
        {"name": "echo", "inputSchema": {"type": "object"}},
        {"name": "search"}
    ]));

    let result = handlers::list_tools::handle(&gateway).await.unwrap();
    assert_eq!(result.tools.len(), 2);
    assert_eq!(result.tools[0]["inputSchema"]["type"], "object");

    assert_eq!(
        gateway.calls(),
        vec![Call {
            path: "/tools/list".into(),
            verb: Verb::Get,
            body: None
        }]
    );
}

#[tokio::test]
async fn list_tools_is_empty_when_backend_returns_nothing() {
    let gateway = StubGateway::replying(Value::Null);

    let result = handlers::list_tools::handle(&gateway).await.unwrap();
    assert!(result.tools.is_empty());

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value, json!({"tools": []}));
}

#[tokio::test]
async fn list_tools_unwraps_object_reply() {
    let gateway = StubGateway::replying(json!({"tools": [{"name": "echo"}]}));

    let result = handlers::list_tools::handle(&gateway).await.unwrap();
    assert_eq!(result.tools, vec![json!({"name": "echo"})]);
}

#[tokio::test]
async fn list_tools_rejects_non_sequence() {
    let gateway = StubGateway::replying(json!("not a list"));

    let err = handlers::list_tools::handle(&gateway).await.unwrap_err();
    assert!(matches!(err, HandlerError::UnexpectedReply(_)));
}

#[tokio::test]
async fn list_resources_hits_resources_path() {
    let gateway = StubGateway::replying(json!([{"uri": "file:///a.txt", "name": "a"}]));

    let result = handlers::list_resources::handle(&gateway).await.unwrap();
    assert_eq!(result.resources.len(), 1);
    assert_eq!(gateway.calls()[0].path, "/resources/list");
    assert_eq!(gateway.calls()[0].verb, Verb::Get);
}

// ---------------------------------------------------------------------------
// tools/call
// ---------------------------------------------------------------------------

#[tokio::test]
async fn call_tool_posts_name_and_arguments() {
    let gateway = StubGateway::replying(json!({"content": [{"type": "text", "text": "ok"}]}));
    let params = ToolCallParams {
        name: "echo".into(),
        arguments: Some(json!({"x": 1})),
    };

    let result = handlers::call_tool::handle(params, &gateway).await.unwrap();
    assert_eq!(result.content, vec![json!({"type": "text", "text": "ok"})]);
    assert!(!result.is_error, "isError defaults to false");

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/tools/call");
    assert_eq!(calls[0].verb, Verb::Post);
    assert_eq!(calls[0].body, Some(json!({"name": "echo", "arguments": {"x": 1}})));
}

#[tokio::test]
async fn call_tool_leaves_out_missing_arguments() {
    let gateway = StubGateway::replying(json!({}));
    let params = ToolCallParams {
        name: "noop".into(),
        arguments: None,
    };

    handlers::call_tool::handle(params, &gateway).await.unwrap();
    assert_eq!(gateway.calls()[0].body, Some(json!({"name": "noop"})));
}

#[tokio::test]
async fn call_tool_keeps_backend_is_error() {
    let gateway = StubGateway::replying(json!({
        "content": [{"type": "text", "text": "boom"}],
        "isError": true
    }));
    let params = ToolCallParams {
        name: "explode".into(),
        arguments: None,
    };

    let result = handlers::call_tool::handle(params, &gateway).await.unwrap();
    assert!(result.is_error);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["isError"], json!(true));
}

#[tokio::test]
async fn call_tool_fills_defaults_for_empty_reply() {
    let gateway = StubGateway::replying(json!({"unrelated": 1}));
    let params = ToolCallParams {
        name: "echo".into(),
        arguments: None,
    };

    let result = handlers::call_tool::handle(params, &gateway).await.unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value, json!({"content": [], "isError": false}));
}

// ---------------------------------------------------------------------------
// resources/read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_resource_percent_encodes_uri() {
    let gateway = StubGateway::replying(json!({"contents": [{"uri": "a b/c", "text": "hi"}]}));
    let params = ResourceReadParams { uri: "a b/c".into() };

    let result = handlers::read_resource::handle(params, &gateway).await.unwrap();
    assert_eq!(result.contents.len(), 1);
    assert_eq!(gateway.calls()[0].path, "/resources/read?uri=a%20b%2Fc");
}

#[tokio::test]
async fn read_resource_keeps_query_grammar_intact() {
    let gateway = StubGateway::replying(json!({}));
    let params = ResourceReadParams {
        uri: "memo://notes?id=7&lang=fr#top".into(),
    };

    let result = handlers::read_resource::handle(params, &gateway).await.unwrap();
    assert!(result.contents.is_empty());

    let path = &gateway.calls()[0].path;
    let query = path.strip_prefix("/resources/read?uri=").unwrap();
    assert!(!query.contains(['?', '&', '=', '#', '/']), "unescaped reserved char in {query}");
}

// ---------------------------------------------------------------------------
// dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_unknown_method_is_method_not_found() {
    let gateway = StubGateway::replying(json!({}));
    let req = request(42, "prompts/list", None);

    let resp = handlers::dispatch(&req, &gateway).await.unwrap();
    assert_eq!(resp.id, Some(RpcId::from(42_i64)));
    assert!(resp.result.is_none());
    assert_eq!(resp.error.unwrap(), JsonRpcError::method_not_found());
    assert!(gateway.calls().is_empty(), "no backend call for unknown methods");
}

#[tokio::test]
async fn dispatch_tools_call_returns_result_with_id() {
    let gateway = StubGateway::replying(json!({"content": [{"type": "text", "text": "ok"}]}));
    let req = request(
        1,
        "tools/call",
        Some(json!({"name": "echo", "arguments": {"x": 1}})),
    );

    let resp = handlers::dispatch(&req, &gateway).await.unwrap();
    assert_eq!(resp.id, Some(RpcId::from(1_i64)));
    assert!(resp.error.is_none());
    assert_eq!(
        resp.result.unwrap(),
        json!({"content": [{"type": "text", "text": "ok"}], "isError": false})
    );
}

#[tokio::test]
async fn dispatch_backend_failure_is_internal_error_without_cause() {
    let gateway = StubGateway::failing();

    for (method, params, message) in [
        ("tools/list", None, "Internal error"),
        ("tools/call", Some(json!({"name": "echo"})), "Tool call failed"),
        ("resources/list", None, "Internal error"),
        ("resources/read", Some(json!({"uri": "x"})), "Resource read failed"),
    ] {
        let req = JsonRpcRequest {
            jsonrpc: Some("2.0".into()),
            id: Some(RpcId::Str(format!("req-{method}"))),
            method: method.into(),
            params,
        };

        let resp = handlers::dispatch(&req, &gateway).await.unwrap();
        assert_eq!(resp.id, Some(RpcId::Str(format!("req-{method}"))));

        let error = resp.error.unwrap();
        assert_eq!(error.code, JsonRpcError::INTERNAL_ERROR);
        assert_eq!(error.message, message);
        assert!(!error.message.contains("secret"), "cause must not leak");
    }
}

#[tokio::test]
async fn dispatch_missing_params_is_internal_error() {
    let gateway = StubGateway::replying(json!({}));

    for method in ["tools/call", "resources/read"] {
        let resp = handlers::dispatch(&request(7, method, None), &gateway).await.unwrap();
        assert_eq!(resp.error.unwrap().code, JsonRpcError::INTERNAL_ERROR);

        let resp = handlers::dispatch(&request(8, method, Some(json!({"wrong": true}))), &gateway)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, JsonRpcError::INTERNAL_ERROR);
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn dispatch_malformed_backend_reply_is_internal_error() {
    let gateway = StubGateway::replying(json!({"content": "not a sequence"}));
    let req = request(3, "tools/call", Some(json!({"name": "echo"})));

    let resp = handlers::dispatch(&req, &gateway).await.unwrap();
    assert_eq!(resp.error.unwrap().code, JsonRpcError::INTERNAL_ERROR);
}

#[tokio::test]
async fn dispatch_ignores_notifications() {
    let gateway = StubGateway::replying(json!([]));
    let req = JsonRpcRequest {
        jsonrpc: Some("2.0".into()),
        id: None,
        method: "tools/list".into(),
        params: None,
    };

    assert!(handlers::dispatch(&req, &gateway).await.is_none());
    assert!(gateway.calls().is_empty());
}
