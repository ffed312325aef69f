#![no_main]

use certmatch_lib::{parse_cert, validate_hostname, ValidationReport};
use libfuzzer_sys::fuzz_target;
use x509_parser::prelude::*;

fuzz_target!(|data: &[u8]| {
    // Parsing and validation must never panic, regardless of input.
    let borrowed = X509Certificate::from_der(data)
        .ok()
        .map(|(_, x509)| validate_hostname("example.com", &x509));

    if let Ok(identity) = parse_cert(data) {
        let owned = validate_hostname("example.com", &identity);
        // Both certificate sources must reach the same verdict
        if let Some(borrowed) = borrowed {
            assert_eq!(borrowed, owned);
        }

        let report = ValidationReport::new("example.com", &identity);
        let _ = certmatch_lib::display_text(&report);
        let _ = certmatch_lib::display_names(&identity);
        let _ = certmatch_lib::to_json(&report);
    }
});
