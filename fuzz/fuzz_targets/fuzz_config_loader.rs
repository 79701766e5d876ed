#![no_main]

use libfuzzer_sys::fuzz_target;
use sipcmd::config::loader::{inline_path, parse_str, validate};

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        // Only panics matter; errors are expected
        if let Ok(config) = parse_str(yaml_str, &inline_path()) {
            let _ = validate(&config);
        }
    }
});
