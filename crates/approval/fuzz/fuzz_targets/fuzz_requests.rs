//! Fuzz target for the request file reader.
//!
//! The reader must return an error, never panic, on malformed CSV, and any
//! batch it accepts must pass batch validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use approval::request::read_requests;
use approval::Batch;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            if let Ok(requests) = read_requests(temp_file.path()) {
                assert!(Batch::new(requests).is_ok());
            }
        }
    }
});
