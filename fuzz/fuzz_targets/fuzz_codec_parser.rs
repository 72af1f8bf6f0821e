#![no_main]

use arbitrary::Arbitrary;
use gateway_runtime::codec::LineFramer;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Chunks(Vec<Vec<u8>>);

fuzz_target!(|chunks: Chunks| {
    let mut framer = LineFramer::new();
    // Partial lines, non-JSON lines, blank lines, and a bare object with no
    // trailing newline must all be handled without a panic and without the
    // same malformed bytes being re-parsed across feeds.
    for chunk in chunks.0 {
        let _ = framer.feed(&chunk);
    }
});
