// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use std::io::Cursor;
use libfuzzer_sys::fuzz_target;

use picgif::Decoder;

fuzz_target!(|data: &[u8]| {
    for step in Decoder::new(Cursor::new(data)) {
        if step.is_err() {
            return;
        }
    }
});
