//! Working with document trees at runtime.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use serde_conf::{conf, from_value, to_string, to_value, Codec, Json, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Limits {
    #[serde(rename = "burst")]
    burst: i8,
    #[serde(rename = "rate")]
    rate: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = conf!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging"],
        "limits": { "burst": 300, "rate": 0.1 }
    });

    println!("Config as YAML:\n{}", to_string(&config)?);

    if let Some(host) = config.get("host").and_then(Value::as_str) {
        println!("Accessing field 'host': {}", host);
    }
    if let Some(Value::Sequence(features)) = config.get("features") {
        println!("Accessing field 'features': {} items", features.len());
    }

    // Applying a subtree narrows numbers to the declared widths.
    if let Some(limits) = config.get("limits") {
        let limits: Limits = from_value(limits.clone())?;
        println!("Applied limits: {:?}", limits);
    }

    let tree = to_value(&Limits {
        burst: 5,
        rate: 2.5,
    })?;
    let json = Json::pretty().encode(&tree)?;
    println!("Limits as JSON:\n{}", String::from_utf8(json)?);

    println!("Type checks:");
    println!("  is_mapping:  {}", tree.is_mapping());
    println!("  is_sequence: {}", tree.is_sequence());
    println!("  kind:        {}", tree.kind());

    Ok(())
}
