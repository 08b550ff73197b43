//! Fuzz target for portal configuration parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use approval::PortalConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = PortalConfig::from_toml(text) {
            assert!(config.batch_size > 0);
            assert!(config.band.validate().is_ok());
        }
    }
});
