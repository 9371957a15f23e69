//! Callout executions against an in-memory flow.

use base64::Engine;
use pb_decoder_callout::{
    CalloutConfig, ExecutionResult, FlowContext, MemoryFlowContext, ProtobufDecoder,
    VAR_INFO_STDERR, VAR_INFO_STDOUT, VAR_MESSAGE_DATA, VAR_MESSAGE_FORMAT,
};
use pb_decoder_schema::testing::{descriptor_set_bytes, order_file};
use pb_decoder_types::Direction;
use serde_json::{json, Value};
use std::collections::HashMap;

const DESCRIPTOR_VAR: &str = "grpc.descriptor";
const PATH_VAR: &str = "grpc.path";
const ALIAS_VAR: &str = "decoded";

/// Framed payload for field1 = "hello", field2 = { field1 = 53, field2 = "red" }.
const ORDER_PAYLOAD: [u8; 21] = [
    0, 0, 0, 0, 16, 0x0a, 0x05, b'h', b'e', b'l', b'l', b'o', 0x12, 0x07, 0x08, 0x35, 0x12, 0x03,
    b'r', b'e', b'd',
];

fn decoder(direction: &str, alias: bool) -> ProtobufDecoder {
    let mut properties = HashMap::new();
    properties.insert("pb-message-ref".to_string(), direction.to_string());
    properties.insert("pb-service-method-ref".to_string(), PATH_VAR.to_string());
    properties.insert(
        "pb-descriptor-base64-ref".to_string(),
        DESCRIPTOR_VAR.to_string(),
    );
    if alias {
        properties.insert("pb-decoded-message-ref".to_string(), ALIAS_VAR.to_string());
    }
    ProtobufDecoder::new(CalloutConfig::from_properties(&properties).unwrap())
}

fn descriptor_base64() -> String {
    base64::engine::general_purpose::STANDARD.encode(descriptor_set_bytes(vec![order_file()]))
}

fn flow(payload: &[u8]) -> MemoryFlowContext {
    MemoryFlowContext::new()
        .with_variable(DESCRIPTOR_VAR, descriptor_base64())
        .with_variable(PATH_VAR, "shop.OrderService/Place")
        .with_message(Direction::Request, payload.to_vec())
}

fn var(ctx: &MemoryFlowContext, name: &str) -> String {
    ctx.get_variable(name).unwrap_or_default()
}

#[test]
fn test_decodes_request_as_json() {
    let mut ctx = flow(&ORDER_PAYLOAD);
    let result = decoder("request", true).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(var(&ctx, VAR_MESSAGE_FORMAT), "json");

    let data: Value = serde_json::from_str(&var(&ctx, VAR_MESSAGE_DATA)).unwrap();
    assert_eq!(
        data,
        json!({"field1": "hello", "field2": {"field1": 53, "field2": "red"}})
    );
    assert_eq!(var(&ctx, ALIAS_VAR), var(&ctx, VAR_MESSAGE_DATA));
    assert_eq!(var(&ctx, VAR_INFO_STDOUT), "message-length: 16\n");
    assert_eq!(var(&ctx, VAR_INFO_STDERR), "");
}

#[test]
fn test_decodes_response_against_output_type() {
    // Item { field1 = 7 }
    let mut ctx = flow(&[]).with_message(Direction::Response, vec![0, 0, 0, 0, 2, 0x08, 0x07]);
    let result = decoder("response", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    let data: Value = serde_json::from_str(&var(&ctx, VAR_MESSAGE_DATA)).unwrap();
    assert_eq!(data, json!({"field1": 7}));
    assert_eq!(ctx.get_variable(ALIAS_VAR), None);
}

#[test]
fn test_missing_descriptor_falls_back_to_text() {
    let mut ctx = MemoryFlowContext::new()
        .with_variable(PATH_VAR, "shop.OrderService/Place")
        .with_message(Direction::Request, ORDER_PAYLOAD.to_vec());
    let result = decoder("request", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(var(&ctx, VAR_MESSAGE_FORMAT), "text");
    assert_eq!(
        var(&ctx, VAR_MESSAGE_DATA),
        "1: \"hello\"\n2 {\n  1: 53\n  2: \"red\"\n}\n"
    );

    let stdout = var(&ctx, VAR_INFO_STDOUT);
    assert!(
        stdout.starts_with("could not find protobuf service/method. "),
        "stdout was {stdout:?}"
    );
    assert!(stdout.contains("No protobuf descriptor provided"));
    assert!(stdout.contains("message-length: 16"));
}

#[test]
fn test_unknown_service_falls_back_to_text() {
    let mut ctx = flow(&ORDER_PAYLOAD).with_variable(PATH_VAR, "shop.Billing/Charge");
    let result = decoder("request", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(var(&ctx, VAR_MESSAGE_FORMAT), "text");
    assert!(var(&ctx, VAR_INFO_STDOUT).contains("service Billing not found in proto"));
}

#[test]
fn test_invalid_base64_falls_back_to_text() {
    let mut ctx = flow(&ORDER_PAYLOAD).with_variable(DESCRIPTOR_VAR, "not base64!");
    let result = decoder("request", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(var(&ctx, VAR_MESSAGE_FORMAT), "text");
    assert!(var(&ctx, VAR_INFO_STDOUT).contains("invalid base64 descriptor"));
}

#[test]
fn test_truncated_payload_reports_decode_failure() {
    let mut ctx = flow(&ORDER_PAYLOAD[..15]);
    let result = decoder("request", true).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert!(var(&ctx, VAR_INFO_STDERR).starts_with("could not decode protobuf. "));
    assert_eq!(ctx.get_variable(VAR_MESSAGE_DATA), None);
    assert_eq!(ctx.get_variable(VAR_MESSAGE_FORMAT), None);
    assert_eq!(ctx.get_variable(ALIAS_VAR), None);
}

#[test]
fn test_missing_message_reports_decode_failure() {
    let mut ctx = flow(&ORDER_PAYLOAD);
    let result = decoder("response", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert!(var(&ctx, VAR_INFO_STDERR).contains("No response message available"));
}

#[test]
fn test_empty_payload_yields_empty_object() {
    let mut ctx = flow(&[]);
    let result = decoder("request", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(var(&ctx, VAR_MESSAGE_FORMAT), "json");
    assert_eq!(var(&ctx, VAR_MESSAGE_DATA), "{}");
    assert_eq!(var(&ctx, VAR_INFO_STDOUT), "");
}

#[test]
fn test_unrecognised_direction_decodes_request() {
    let mut ctx = flow(&ORDER_PAYLOAD);
    let result = decoder("both", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Success);
    assert_eq!(var(&ctx, VAR_MESSAGE_FORMAT), "json");
}

#[test]
fn test_rejected_writes_abort() {
    let mut ctx = flow(&ORDER_PAYLOAD).read_only();
    let result = decoder("request", false).execute(&mut ctx);

    assert_eq!(result, ExecutionResult::Abort);
    assert!(ctx.variables().get(VAR_MESSAGE_DATA).is_none());
}
