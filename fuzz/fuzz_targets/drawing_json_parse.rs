//! Fuzz target for drawing JSON parsing.
//!
//! Feeds arbitrary bytes to the drawing reader and, when they parse, runs a
//! full session over the result, checking for panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use prelosa::config::SessionConfig;
use prelosa::ir::io_json::from_json_slice;
use prelosa::session::run_session;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(drawing) = from_json_slice(data) {
        let _ = run_session(&drawing, &SessionConfig::default());
    }
});
