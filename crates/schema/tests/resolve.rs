//! Method resolution against serialized descriptor sets.

use pb_decoder_schema::testing::{
    descriptor_set_bytes, file, greeter_file, message, message_field, order_file, scalar, service,
};
use pb_decoder_schema::{resolve_method, DescriptorIndex, MethodPath};
use pb_decoder_types::{DecoderError, Direction};
use protobuf::descriptor::field_descriptor_proto::Type;

#[test]
fn test_resolve_single_file_method() {
    let bytes = descriptor_set_bytes(vec![greeter_file()]);
    let schema = resolve_method(Some(&bytes), "demo.greeter.Greeter/SayHello").unwrap();

    assert_eq!(schema.service_name, "demo.greeter.Greeter");
    assert_eq!(schema.method_name, "SayHello");
    assert_eq!(schema.input.full_name(), "demo.greeter.HelloRequest");
    assert_eq!(schema.output.full_name(), "demo.greeter.HelloReply");
    assert!(!schema.client_streaming);
    assert!(!schema.server_streaming);
    assert_eq!(
        schema.message_for(Direction::Response).full_name(),
        "demo.greeter.HelloReply"
    );
}

#[test]
fn test_resolve_across_imports() {
    // api.proto -> types.proto -> money.proto
    let mut money = file("common/money.proto", "common", &[]);
    money.message_type = vec![message(
        "Money",
        vec![
            scalar("currency_code", 1, Type::TYPE_STRING),
            scalar("units", 2, Type::TYPE_INT64),
        ],
    )];

    let mut types = file("billing/types.proto", "billing", &["common/money.proto"]);
    types.message_type = vec![
        message(
            "Invoice",
            vec![message_field("total", 1, ".common.Money")],
        ),
        message("GetInvoiceRequest", vec![scalar("id", 1, Type::TYPE_STRING)]),
    ];

    let mut api = file("billing/api.proto", "billing.v1", &["billing/types.proto"]);
    api.service = vec![service(
        "BillingService",
        &[("GetInvoice", ".billing.GetInvoiceRequest", ".billing.Invoice")],
    )];

    // Order in the set does not matter.
    let bytes = descriptor_set_bytes(vec![api, money, types]);
    let schema = resolve_method(Some(&bytes), "/billing.v1.BillingService/GetInvoice").unwrap();

    assert_eq!(schema.input.full_name(), "billing.GetInvoiceRequest");
    assert_eq!(schema.output.full_name(), "billing.Invoice");
    let total = schema.output.field_by_name("total").unwrap();
    assert_eq!(total.number(), 1);
}

#[test]
fn test_missing_descriptor_is_empty_input() {
    assert!(matches!(
        resolve_method(None, "demo.greeter.Greeter/SayHello").unwrap_err(),
        DecoderError::EmptyInput(_)
    ));
    assert!(matches!(
        resolve_method(Some(&[]), "demo.greeter.Greeter/SayHello").unwrap_err(),
        DecoderError::EmptyInput(_)
    ));
}

#[test]
fn test_path_without_slash_is_invalid_path() {
    let bytes = descriptor_set_bytes(vec![greeter_file()]);
    assert!(matches!(
        resolve_method(Some(&bytes), "demo.greeter.Greeter.SayHello").unwrap_err(),
        DecoderError::InvalidPath { .. }
    ));
}

#[test]
fn test_garbage_descriptor_is_decode_error() {
    // Field 1, length 5, but only two bytes follow.
    let garbage = [0x0a, 0x05, b'a', b'b'];
    assert!(matches!(
        resolve_method(Some(&garbage), "demo.greeter.Greeter/SayHello").unwrap_err(),
        DecoderError::Decode(_)
    ));
}

#[test]
fn test_unknown_service() {
    let bytes = descriptor_set_bytes(vec![greeter_file()]);
    match resolve_method(Some(&bytes), "demo.greeter.Farewell/SayBye").unwrap_err() {
        DecoderError::ServiceNotFound(name) => assert_eq!(name, "Farewell"),
        other => panic!("expected ServiceNotFound, got {other:?}"),
    }
}

#[test]
fn test_unknown_method() {
    let bytes = descriptor_set_bytes(vec![greeter_file()]);
    match resolve_method(Some(&bytes), "demo.greeter.Greeter/SayGoodbye").unwrap_err() {
        DecoderError::MethodNotFound { service, method } => {
            assert_eq!(service, "Greeter");
            assert_eq!(method, "SayGoodbye");
        }
        other => panic!("expected MethodNotFound, got {other:?}"),
    }
}

#[test]
fn test_missing_dependency_surfaces_from_resolution() {
    let mut api = file("api.proto", "svc", &["absent.proto"]);
    api.message_type = vec![message("Req", vec![])];
    api.service = vec![service("Api", &[("Call", ".svc.Req", ".svc.Req")])];

    let bytes = descriptor_set_bytes(vec![api]);
    assert!(matches!(
        resolve_method(Some(&bytes), "svc.Api/Call").unwrap_err(),
        DecoderError::MissingDependency { ref dependency, .. } if dependency == "absent.proto"
    ));
}

/// Services are matched by short name. Two packages declaring `Greeter` are
/// ambiguous and the file indexed last wins, whatever package the path names.
#[test]
fn test_duplicate_short_service_name_resolves_to_last_file() {
    let first = greeter_file();

    let mut second = file("greeter_v2.proto", "demo.greeter.v2", &[]);
    second.message_type = vec![
        message("Ping", vec![scalar("seq", 1, Type::TYPE_INT32)]),
        message("Pong", vec![scalar("seq", 1, Type::TYPE_INT32)]),
    ];
    second.service = vec![service(
        "Greeter",
        &[("SayHello", ".demo.greeter.v2.Ping", ".demo.greeter.v2.Pong")],
    )];

    let bytes = descriptor_set_bytes(vec![first, second]);
    let schema = resolve_method(Some(&bytes), "demo.greeter.Greeter/SayHello").unwrap();
    assert_eq!(schema.input.full_name(), "demo.greeter.v2.Ping");
}

#[test]
fn test_index_lookups() {
    let bytes = descriptor_set_bytes(vec![greeter_file(), order_file()]);
    let index = DescriptorIndex::from_bytes(&bytes).unwrap();

    assert_eq!(index.file_count(), 2);
    assert_eq!(index.service_names(), vec!["Greeter", "OrderService"]);
    assert_eq!(
        index.owner_of_service("OrderService").unwrap().name(),
        "shop/order.proto"
    );

    let path = MethodPath::parse("shop.OrderService/Place").unwrap();
    let schema = index.resolve(&path).unwrap();
    assert_eq!(schema.output.full_name(), "shop.Item");
}

#[test]
fn test_trailing_slash_still_resolves() {
    let bytes = descriptor_set_bytes(vec![greeter_file()]);
    let schema = resolve_method(Some(&bytes), "demo.greeter.Greeter/SayHello/").unwrap();
    assert_eq!(schema.method_name, "SayHello");
    assert_eq!(schema.input.full_name(), "demo.greeter.HelloRequest");
}
