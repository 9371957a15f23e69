//! Descriptor fixtures for tests.
//!
//! Builds `FileDescriptorProto` values programmatically so tests across the
//! workspace can assemble descriptor sets without invoking protoc.

use protobuf::descriptor::field_descriptor_proto::{Label, Type};
use protobuf::descriptor::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MessageOptions, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use protobuf::{Message, MessageField};

/// A proto3 file with the given package and imports.
pub fn file(name: &str, package: &str, dependencies: &[&str]) -> FileDescriptorProto {
    let mut file = FileDescriptorProto::new();
    file.set_name(name.to_string());
    if !package.is_empty() {
        file.set_package(package.to_string());
    }
    file.set_syntax("proto3".to_string());
    file.dependency = dependencies.iter().map(|d| d.to_string()).collect();
    file
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    let mut message = DescriptorProto::new();
    message.set_name(name.to_string());
    message.field = fields;
    message
}

/// Singular scalar field.
pub fn scalar(name: &str, number: i32, field_type: Type) -> FieldDescriptorProto {
    let mut field = FieldDescriptorProto::new();
    field.set_name(name.to_string());
    field.set_json_name(lower_camel(name));
    field.set_number(number);
    field.set_label(Label::LABEL_OPTIONAL);
    field.set_type(field_type);
    field
}

/// Singular field referencing a message type by fully qualified name (".pkg.Msg").
pub fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    let mut field = scalar(name, number, Type::TYPE_MESSAGE);
    field.set_type_name(type_name.to_string());
    field
}

/// Singular field referencing an enum type by fully qualified name.
pub fn enum_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
    let mut field = scalar(name, number, Type::TYPE_ENUM);
    field.set_type_name(type_name.to_string());
    field
}

pub fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.set_label(Label::LABEL_REPEATED);
    field
}

/// A `map<key, value>` field plus the synthetic entry message it needs.
///
/// The entry must be added to the containing message's `nested_type`; its
/// fully qualified name is `<parent>.<EntryName>`.
pub fn map_field(
    name: &str,
    number: i32,
    parent: &str,
    key: Type,
    value: FieldDescriptorProto,
) -> (FieldDescriptorProto, DescriptorProto) {
    let entry_name = format!("{}Entry", upper_camel(name));
    let mut value = value;
    value.set_name("value".to_string());
    value.set_json_name("value".to_string());
    value.set_number(2);

    let mut entry = message(&entry_name, vec![scalar("key", 1, key), value]);
    let mut options = MessageOptions::new();
    options.set_map_entry(true);
    entry.options = MessageField::some(options);

    let field = repeated(message_field(name, number, &format!("{parent}.{entry_name}")));
    (field, entry)
}

pub fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    let mut enumeration = EnumDescriptorProto::new();
    enumeration.set_name(name.to_string());
    enumeration.value = values
        .iter()
        .map(|(value_name, number)| {
            let mut value = EnumValueDescriptorProto::new();
            value.set_name(value_name.to_string());
            value.set_number(*number);
            value
        })
        .collect();
    enumeration
}

/// A service whose methods are given as (name, input type, output type).
pub fn service(name: &str, methods: &[(&str, &str, &str)]) -> ServiceDescriptorProto {
    let mut service = ServiceDescriptorProto::new();
    service.set_name(name.to_string());
    service.method = methods
        .iter()
        .map(|(method_name, input, output)| {
            let mut method = MethodDescriptorProto::new();
            method.set_name(method_name.to_string());
            method.set_input_type(input.to_string());
            method.set_output_type(output.to_string());
            method
        })
        .collect();
    service
}

pub fn descriptor_set(files: Vec<FileDescriptorProto>) -> FileDescriptorSet {
    let mut set = FileDescriptorSet::new();
    set.file = files;
    set
}

/// Serialized `FileDescriptorSet`, as `protoc --descriptor_set_out` would write it.
pub fn descriptor_set_bytes(files: Vec<FileDescriptorProto>) -> Vec<u8> {
    descriptor_set(files)
        .write_to_bytes()
        .expect("descriptor set serializes")
}

/// The greeter fixture: package `demo.greeter`, service `Greeter` with
/// `SayHello(HelloRequest) returns (HelloReply)`.
pub fn greeter_file() -> FileDescriptorProto {
    let mut greeter = file("greeter.proto", "demo.greeter", &[]);
    greeter.message_type = vec![
        message("HelloRequest", vec![scalar("name", 1, Type::TYPE_STRING)]),
        message(
            "HelloReply",
            vec![
                scalar("message", 1, Type::TYPE_STRING),
                scalar("reply_count", 2, Type::TYPE_INT32),
            ],
        ),
    ];
    greeter.service = vec![service(
        "Greeter",
        &[(
            "SayHello",
            ".demo.greeter.HelloRequest",
            ".demo.greeter.HelloReply",
        )],
    )];
    greeter
}

/// The order fixture used by decoding tests:
///
/// ```text
/// package shop;
/// message Item  { int32 field1 = 1; string field2 = 2; }
/// message Order { string field1 = 1; Item field2 = 2; }
/// service OrderService { rpc Place(Order) returns (Item); }
/// ```
pub fn order_file() -> FileDescriptorProto {
    let mut order = file("shop/order.proto", "shop", &[]);
    order.message_type = vec![
        message(
            "Item",
            vec![
                scalar("field1", 1, Type::TYPE_INT32),
                scalar("field2", 2, Type::TYPE_STRING),
            ],
        ),
        message(
            "Order",
            vec![
                scalar("field1", 1, Type::TYPE_STRING),
                message_field("field2", 2, ".shop.Item"),
            ],
        ),
    ];
    order.service = vec![service(
        "OrderService",
        &[("Place", ".shop.Order", ".shop.Item")],
    )];
    order
}

/// `google/protobuf/timestamp.proto`, built by hand so tests need no protoc include path.
pub fn timestamp_file() -> FileDescriptorProto {
    let mut timestamp = file("google/protobuf/timestamp.proto", "google.protobuf", &[]);
    timestamp.message_type = vec![message(
        "Timestamp",
        vec![
            scalar("seconds", 1, Type::TYPE_INT64),
            scalar("nanos", 2, Type::TYPE_INT32),
        ],
    )];
    timestamp
}

/// The catalog fixture, covering the scalar kinds that have special JSON forms:
///
/// ```text
/// package catalog;
/// import "google/protobuf/timestamp.proto";
/// enum Status { STATUS_UNSPECIFIED = 0; ACTIVE = 1; RETIRED = 2; }
/// message ProductQuery { int64 sku = 1; }
/// message Product {
///   int64 sku = 1;
///   string display_name = 2;
///   Status status = 3;
///   bytes thumbnail = 4;
///   repeated string tags = 5;
///   map<string, int32> stock = 6;
///   google.protobuf.Timestamp updated_at = 7;
///   double price = 8;
///   bool active = 9;
///   uint64 views = 10;
/// }
/// service CatalogService { rpc GetProduct(ProductQuery) returns (Product); }
/// ```
///
/// Must be linked together with [`timestamp_file`].
pub fn catalog_file() -> FileDescriptorProto {
    let mut catalog = file(
        "catalog/product.proto",
        "catalog",
        &["google/protobuf/timestamp.proto"],
    );
    catalog.enum_type = vec![enumeration(
        "Status",
        &[("STATUS_UNSPECIFIED", 0), ("ACTIVE", 1), ("RETIRED", 2)],
    )];

    let (stock, stock_entry) = map_field(
        "stock",
        6,
        ".catalog.Product",
        Type::TYPE_STRING,
        scalar("value", 2, Type::TYPE_INT32),
    );
    let mut product = message(
        "Product",
        vec![
            scalar("sku", 1, Type::TYPE_INT64),
            scalar("display_name", 2, Type::TYPE_STRING),
            enum_field("status", 3, ".catalog.Status"),
            scalar("thumbnail", 4, Type::TYPE_BYTES),
            repeated(scalar("tags", 5, Type::TYPE_STRING)),
            stock,
            message_field("updated_at", 7, ".google.protobuf.Timestamp"),
            scalar("price", 8, Type::TYPE_DOUBLE),
            scalar("active", 9, Type::TYPE_BOOL),
            scalar("views", 10, Type::TYPE_UINT64),
        ],
    );
    product.nested_type = vec![stock_entry];

    catalog.message_type = vec![
        message("ProductQuery", vec![scalar("sku", 1, Type::TYPE_INT64)]),
        product,
    ];
    catalog.service = vec![service(
        "CatalogService",
        &[("GetProduct", ".catalog.ProductQuery", ".catalog.Product")],
    )];
    catalog
}

fn upper_camel(name: &str) -> String {
    let camel = lower_camel(name);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
