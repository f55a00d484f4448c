use tablejson_core::{decode, encode, literal, Key, Table, Value, MAX_DEPTH};

/// Assert that encode → decode reproduces the table exactly.
fn assert_roundtrip(value: &Value, empty_table_as_array: bool) {
    let json = encode(value, empty_table_as_array).expect("encode failed");
    let back = decode(&json);
    assert_eq!(
        &back, value,
        "Roundtrip failed:\n  input:  {value}\n  JSON:   {json}\n  output: {back}"
    );
}

fn lit(text: &str) -> Value {
    literal::parse(text).expect("fixture literal must parse")
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn roundtrip_flat_object() {
    assert_roundtrip(&lit(r#"{name = "x", n = 3, ok = true, ratio = 0.5}"#), false);
}

#[test]
fn roundtrip_nested_object() {
    assert_roundtrip(
        &lit(r#"{user = {name = "x", roles = {"admin", "ops"}}, meta = {version = 2}}"#),
        false,
    );
}

#[test]
fn roundtrip_object_preserves_member_order() {
    let value = lit(r#"{z = 1, a = 2, m = 3}"#);
    let json = encode(&value, false).unwrap();
    assert_eq!(json, r#"{"z":1,"a":2,"m":3}"#);
    let back = decode(&json);
    let keys: Vec<&str> = back.as_table().unwrap().keys().filter_map(Key::as_str).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn roundtrip_sparse_integer_keys_come_back_as_strings() {
    let value = lit(r#"{[1] = "a", [2] = "b", [4] = "d"}"#);
    let json = encode(&value, false).unwrap();
    assert_eq!(json, r#"{"1":"a","2":"b","4":"d"}"#);
    assert_eq!(decode(&json), lit(r#"{["1"] = "a", ["2"] = "b", ["4"] = "d"}"#));
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn roundtrip_array_with_either_flag() {
    let value = lit(r#"{"a", "b", 3, 4.5, false}"#);
    assert_roundtrip(&value, false);
    assert_roundtrip(&value, true);
}

#[test]
fn roundtrip_array_of_objects() {
    assert_roundtrip(
        &lit(r#"{{id = 1, name = "a"}, {id = 2, name = "b"}}"#),
        false,
    );
}

#[test]
fn roundtrip_array_with_nil_holes_filled_explicitly() {
    assert_roundtrip(&lit("{1, nil, 3}"), false);
}

#[test]
fn roundtrip_nested_arrays() {
    assert_roundtrip(&lit("{{1, 2}, {3, {4, 5}}, {}}"), true);
}

// ============================================================================
// Scalars and strings
// ============================================================================

#[test]
fn roundtrip_numeric_kinds() {
    let json = encode(&Value::from(vec![Value::Integer(5)]), false).unwrap();
    assert_eq!(json, "[5]");
    assert_eq!(decode(&json), Value::from(vec![Value::Integer(5)]));

    let json = encode(&Value::from(vec![Value::Float(5.0)]), false).unwrap();
    assert_eq!(json, "[5.0]");
    assert_eq!(decode(&json), Value::from(vec![Value::Float(5.0)]));
}

#[test]
fn roundtrip_awkward_floats() {
    let floats = [0.1, -0.0, 1e-7, 1.7976931348623157e308, 5e-324, 123456.789];
    let value = Value::from(floats.iter().map(|f| Value::Float(*f)).collect::<Vec<_>>());
    assert_roundtrip(&value, false);
}

#[test]
fn roundtrip_escaping_fidelity() {
    let mut t = Table::new();
    t.insert(1, "a\"b\\c\n");
    let value = Value::Table(t);
    let back = decode(&encode(&value, false).unwrap());
    assert_eq!(
        back.as_table().and_then(|t| t.get(1)),
        Some(&Value::from("a\"b\\c\n"))
    );
}

#[test]
fn roundtrip_all_control_characters() {
    let s: String = (0u8..0x20).map(char::from).chain("\u{7f}\u{2028}".chars()).collect();
    assert_roundtrip(&Value::from(vec![Value::from(s)]), false);
}

#[test]
fn roundtrip_unicode() {
    assert_roundtrip(
        &Value::from(vec![Value::from("caf\u{e9} \u{4f60}\u{597d} \u{1f600}")]),
        false,
    );
}

// ============================================================================
// Lossy by design
// ============================================================================

#[test]
fn empty_table_becomes_whatever_the_flag_says() {
    let value = lit("{items = {}}");
    assert_eq!(encode(&value, false).unwrap(), r#"{"items":{}}"#);
    assert_eq!(encode(&value, true).unwrap(), r#"{"items":[]}"#);
    assert_roundtrip(&value, false);
    assert_roundtrip(&value, true);
}

#[test]
fn roundtrip_at_the_depth_limit() {
    let mut value = lit(r#"{ leaf = "x" }"#);
    for level in 1..MAX_DEPTH {
        let mut t = Table::new();
        t.insert("level", level as i64);
        t.insert("child", value);
        value = Value::Table(t);
    }
    assert_roundtrip(&value, false);

    let literal_text = format!("{}{}", "{".repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
    assert_roundtrip(&lit(&literal_text), true);
}

#[test]
fn json_text_roundtrip_through_tables() {
    let json = r#"{"code":0,"data":{"list":[{"mac":"00:11:22","up":true}],"total":1.5}}"#;
    let value = decode(json);
    assert_eq!(encode(&value, false).unwrap(), json);
}
