//! Fuzz target for configuration YAML parsing.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use prelosa::config::from_yaml_str;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };

    let _ = from_yaml_str(yaml, Path::new("<fuzz>"));
});
