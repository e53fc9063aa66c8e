//! Fuzz target for the mouse protocol decoder.
//!
//! Feeds arbitrary bytes, split at fuzzer-chosen points, through the
//! streaming decoder and checks that every event it produces is well formed
//! and that the carry-over buffer stays bounded.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use opentui_mouse::input::{MAX_PENDING_BYTES, MouseDecoder, decode};

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    splits: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mut decoder = MouseDecoder::new();
    let mut rest = input.data.as_slice();

    for split in input.splits.iter().map(|&s| s as usize) {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(split.min(rest.len()));
        for event in decoder.push(chunk) {
            assert!(event.is_well_formed(), "decoded malformed event {event:?}");
        }
        assert!(decoder.pending().len() <= MAX_PENDING_BYTES);
        rest = tail;
    }
    for event in decoder.push(rest) {
        assert!(event.is_well_formed(), "decoded malformed event {event:?}");
    }
    assert!(decoder.pending().len() <= MAX_PENDING_BYTES);

    if let Some(event) = decode(&input.data) {
        assert!(event.is_well_formed());
    }
});
