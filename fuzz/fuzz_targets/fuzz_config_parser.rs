#![no_main]

use gateway_config::parse_config_from_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Missing files, truncated JSON, and wrong-typed fields must all
        // come back as a structured `ConfigError`, never a panic.
        let _ = parse_config_from_str(text);
    }
});
