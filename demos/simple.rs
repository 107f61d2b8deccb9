//! Marshal a tagged struct to YAML and read it back.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_conf::{marshal, unmarshal};
use std::error::Error;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct Database {
    #[serde(rename = "url")]
    url: String,
    #[serde(rename = "pool")]
    pool: u8,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct Conf {
    #[serde(rename = "name")]
    name: String,
    #[serde(rename = "workers")]
    workers: u32,
    #[serde(rename = "database")]
    database: Database,
    #[serde(rename = "allow")]
    allow: Vec<String>,
    #[serde(skip)]
    loaded_from: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let conf = Conf {
        name: "api".to_string(),
        workers: 4,
        database: Database {
            url: "postgres://localhost/app".to_string(),
            pool: 16,
        },
        allow: vec!["10.0.0.0/8".to_string(), "127.0.0.1".to_string()],
        loaded_from: "memory".to_string(),
    };

    let mut document = Vec::new();
    marshal(&mut document, &conf)?;
    println!("YAML output:\n{}", String::from_utf8_lossy(&document));

    let mut back = Conf::default();
    unmarshal(document.as_slice(), &mut back)?;
    assert_eq!(back.database, conf.database);
    assert!(back.loaded_from.is_empty());
    println!("✓ Round-trip successful");

    // Keys missing from the document keep what the target already held.
    let mut partial = Conf {
        workers: 8,
        ..Conf::default()
    };
    unmarshal(&b"name: worker\nretries: 3\n"[..], &mut partial)?;
    assert_eq!(partial.name, "worker");
    assert_eq!(partial.workers, 8);
    println!("Partial document: {:?}", partial);

    Ok(())
}
