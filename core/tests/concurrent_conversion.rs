// core/tests/concurrent_conversion.rs
//
// Concurrency behavior of a shared registry.
//
// Tests cover:
// - N concurrent convert calls produce the same results as N sequential calls
// - concurrent first-use resolution of the same config (cache population race)

use std::fs;
use std::sync::Arc;
use std::thread;

use libzhconv_core::Registry;
use tempfile::TempDir;

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("STCharacters.txt"),
        "简\t簡\n体\t體\n汉\t漢\n字\t字\n",
    )
    .unwrap();
    fs::write(dir.path().join("STPhrases.txt"), "简体\t簡體\n").unwrap();
    fs::write(
        dir.path().join("s2t.json"),
        r#"{
            "name": "s2t",
            "conversion_chain": [
                { "dict": { "type": "text", "file": "STPhrases.txt" } },
                { "dict": { "type": "text", "file": "STCharacters.txt" } }
            ]
        }"#,
    )
    .unwrap();
    dir
}

#[test]
fn concurrent_calls_match_sequential_results() {
    let dir = data_dir();
    let registry = Arc::new(Registry::with_data_dir(dir.path()));

    let inputs: Vec<String> = (0..64).map(|i| format!("简体汉字第{}行", i)).collect();
    let sequential: Vec<String> = inputs
        .iter()
        .map(|s| registry.convert(s, "s2t").unwrap())
        .collect();

    let mut handles = Vec::new();
    for chunk in inputs.chunks(8) {
        let registry = Arc::clone(&registry);
        let chunk = chunk.to_vec();
        handles.push(thread::spawn(move || {
            chunk
                .iter()
                .map(|s| registry.convert(s, "s2t").unwrap())
                .collect::<Vec<String>>()
        }));
    }
    let concurrent: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(concurrent, sequential);
}

#[test]
fn concurrent_first_resolution_yields_one_converter() {
    let dir = data_dir();
    let registry = Arc::new(Registry::with_data_dir(dir.path()));

    // Race several threads through the cold path. Whatever interleaving
    // happens, every caller must get a working converter and later lookups
    // must agree on a single cached instance.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            registry.convert("简体汉字", "s2t").unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "簡體漢字");
    }

    let a = registry.resolve("s2t").unwrap();
    let b = registry.resolve("s2t").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
