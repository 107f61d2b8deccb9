use serde::Deserialize;
use serde_conf::{conf, from_value, to_string, Mapping, Number, Value};

#[test]
fn test_conf_macro_null() {
    assert_eq!(conf!(null), Value::Null);
}

#[test]
fn test_conf_macro_numbers() {
    assert_eq!(conf!(42), Value::Number(Number::Integer(42)));
    assert_eq!(conf!(-123), Value::Number(Number::Integer(-123)));
    assert_eq!(conf!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(
        conf!(u64::MAX),
        Value::Number(Number::Unsigned(u64::MAX))
    );
}

#[test]
fn test_conf_macro_strings() {
    assert_eq!(conf!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(conf!(""), Value::String(String::new()));
    assert_eq!(conf!('x'), Value::String("x".to_string()));
}

#[test]
fn test_conf_macro_sequences() {
    assert_eq!(
        conf!([1, "hello", true, null]),
        Value::Sequence(vec![
            Value::Number(Number::Integer(1)),
            Value::String("hello".to_string()),
            Value::Bool(true),
            Value::Null,
        ])
    );
}

#[test]
fn test_conf_macro_nested_mappings() {
    let doc = conf!({
        "server": {
            "host": "localhost",
            "ports": [80, 443]
        },
        "debug": false
    });

    let mut server = Mapping::new();
    server.insert("host".to_string(), Value::from("localhost"));
    server.insert(
        "ports".to_string(),
        Value::Sequence(vec![Value::from(80), Value::from(443)]),
    );
    let mut expected = Mapping::new();
    expected.insert("server".to_string(), Value::Mapping(server));
    expected.insert("debug".to_string(), Value::Bool(false));

    assert_eq!(doc, Value::Mapping(expected));
}

#[test]
fn test_conf_macro_applies_to_struct() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Server {
        #[serde(rename = "host")]
        host: String,
        #[serde(rename = "ports")]
        ports: Vec<u16>,
        #[serde(rename = "tls")]
        tls: bool,
    }

    let server: Server = from_value(conf!({
        "host": "localhost",
        "ports": [80, 443]
    }))
    .unwrap();
    assert_eq!(
        server,
        Server {
            host: "localhost".to_string(),
            ports: vec![80, 443],
            tls: false,
        }
    );
}

#[test]
fn test_conf_macro_marshals() {
    let doc = conf!({ "b": 1, "a": [true] });
    assert_eq!(to_string(&doc).unwrap(), "b: 1\na:\n- true\n");
}
