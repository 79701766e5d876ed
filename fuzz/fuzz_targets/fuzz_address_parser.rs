#![no_main]

use libfuzzer_sys::fuzz_target;
use sipcmd::address::{Address, SipAddress};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Some(address) = SipAddress::parse(input) {
            assert_eq!(address.as_str(), input.trim());
            assert!(!address.scheme().is_empty());
            assert!(!address.target().is_empty());
            assert_eq!(address.scheme(), address.scheme().to_ascii_lowercase());
            for (name, _) in address.headers() {
                assert!(!name.is_empty());
            }
        }
    }
});
