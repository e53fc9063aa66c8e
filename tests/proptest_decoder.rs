//! Property-based tests for the mouse decoder and click tracker.
//!
//! Uses proptest to verify that decoding is total over arbitrary input,
//! independent of how the stream is chunked, and that SGR button codes map
//! to the documented button/action/modifier triple.

use opentui_mouse::input::{ClickTracker, MAX_PENDING_BYTES, MouseDecoder, decode};
use opentui_mouse::{MouseAction, MouseButton, MouseEvent};
use proptest::prelude::*;
use std::time::Instant;

// ============================================================================
// Strategies
// ============================================================================

/// Parts of an SGR report.
#[derive(Clone, Debug)]
struct SgrReport {
    index: u32,
    shift: bool,
    alt: bool,
    ctrl: bool,
    motion: bool,
    wheel: bool,
    release: bool,
    x: u32,
    y: u32,
}

impl SgrReport {
    fn code(&self) -> u32 {
        self.index
            | (u32::from(self.shift) << 2)
            | (u32::from(self.alt) << 3)
            | (u32::from(self.ctrl) << 4)
            | (u32::from(self.motion) << 5)
            | (u32::from(self.wheel) << 6)
    }

    fn bytes(&self) -> Vec<u8> {
        let terminator = if self.release { 'm' } else { 'M' };
        format!("\x1b[<{};{};{}{terminator}", self.code(), self.x, self.y).into_bytes()
    }

    /// Whether the code describes a reportable event.
    fn reportable(&self) -> bool {
        // Bare index 3 without motion or wheel is an SGR "no button" press
        self.wheel || self.motion || self.index != 3
    }
}

fn sgr_strategy() -> impl Strategy<Value = SgrReport> {
    (
        0u32..4,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        1u32..10_000,
        1u32..10_000,
    )
        .prop_map(
            |(index, shift, alt, ctrl, motion, wheel, release, x, y)| SgrReport {
                index,
                shift,
                alt,
                ctrl,
                motion,
                wheel,
                release,
                x,
                y,
            },
        )
}

/// Bytes that can never start a report.
fn noise_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no ESC", |b| *b != 0x1b), 0..16)
}

fn decode_all(chunks: &[&[u8]]) -> Vec<MouseEvent> {
    let mut decoder = MouseDecoder::new();
    chunks.iter().flat_map(|c| decoder.push(c)).collect()
}

// ============================================================================
// Totality
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Arbitrary input never panics and only yields well-formed events.
    #[test]
    fn arbitrary_bytes_decode_safely(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut decoder = MouseDecoder::new();
        for event in decoder.push(&data) {
            prop_assert!(event.is_well_formed(), "malformed: {:?}", event);
        }
        prop_assert!(decoder.pending().len() <= MAX_PENDING_BYTES);
        if let Some(event) = decode(&data) {
            prop_assert!(event.is_well_formed());
        }
    }

    /// Input built from report fragments also stays safe.
    #[test]
    fn fragment_soup_decodes_safely(
        parts in prop::collection::vec(
            prop::sample::select(vec![
                &b"\x1b"[..], b"\x1b[", b"\x1b[<", b"\x1b[M", b"0", b"35", b";", b"M", b"m",
                b"999999999999", b" ", b"!",
            ]),
            0..64,
        )
    ) {
        let data: Vec<u8> = parts.concat();
        let mut decoder = MouseDecoder::new();
        for event in decoder.push(&data) {
            prop_assert!(event.is_well_formed(), "malformed: {:?}", event);
        }
    }
}

// ============================================================================
// SGR decoding
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every SGR code decodes to the documented classification.
    #[test]
    fn sgr_code_classification(report in sgr_strategy()) {
        let decoded = decode(&report.bytes());

        if !report.reportable() {
            prop_assert!(decoded.is_none());
            return Ok(());
        }
        let event = decoded.expect("reportable code decodes");

        prop_assert_eq!((event.x, event.y), (report.x, report.y));
        prop_assert_eq!(event.raw, report.code());
        prop_assert_eq!(
            (event.shift, event.alt, event.ctrl),
            (report.shift, report.alt, report.ctrl)
        );

        let held = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];
        let wheel = [
            MouseButton::WheelUp,
            MouseButton::WheelDown,
            MouseButton::WheelLeft,
            MouseButton::WheelRight,
        ];
        let index = report.index as usize;
        if report.wheel {
            prop_assert_eq!(event.action, MouseAction::Wheel);
            prop_assert_eq!(event.button, wheel[index]);
        } else if report.motion && index < 3 {
            prop_assert_eq!(event.action, MouseAction::Drag);
            prop_assert_eq!(event.button, held[index]);
        } else if report.motion {
            prop_assert_eq!(event.action, MouseAction::Move);
            prop_assert_eq!(event.button, MouseButton::None);
        } else if report.release {
            prop_assert_eq!(event.action, MouseAction::Release);
            prop_assert_eq!(event.button, held[index]);
        } else {
            prop_assert_eq!(event.action, MouseAction::Press);
            prop_assert_eq!(event.button, held[index]);
        }
    }

    /// Noise without ESC around a report does not change the result.
    #[test]
    fn noise_around_report_is_ignored(
        report in sgr_strategy(),
        before in noise_strategy(),
        after in noise_strategy(),
    ) {
        let mut data = before;
        data.extend(report.bytes());
        data.extend(after);
        prop_assert_eq!(decode(&data), decode(&report.bytes()));
    }

    /// Splitting a stream at any point yields the same events.
    #[test]
    fn chunking_does_not_change_events(
        reports in prop::collection::vec(sgr_strategy(), 1..8),
        cut_a in any::<prop::sample::Index>(),
        cut_b in any::<prop::sample::Index>(),
    ) {
        let stream: Vec<u8> = reports.iter().flat_map(SgrReport::bytes).collect();
        let mut cuts = [cut_a.index(stream.len() + 1), cut_b.index(stream.len() + 1)];
        cuts.sort_unstable();
        let (head, rest) = stream.split_at(cuts[0]);
        let (middle, tail) = rest.split_at(cuts[1] - cuts[0]);

        let whole = decode_all(&[stream.as_slice()]);
        let split = decode_all(&[head, middle, tail]);
        prop_assert_eq!(whole, split);
    }
}

// ============================================================================
// Click synthesis
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A click follows a release exactly when the button matches and both
    /// axes moved at most the threshold.
    #[test]
    fn click_iff_within_threshold(
        threshold in 0u32..4,
        (px, py) in (1u32..50, 1u32..50),
        (rx, ry) in (1u32..50, 1u32..50),
        same_button in any::<bool>(),
    ) {
        let mut tracker = ClickTracker::new(threshold);
        let now = Instant::now();
        let release_button = if same_button { MouseButton::Left } else { MouseButton::Right };

        tracker.on_decoded(MouseEvent::press(px, py, MouseButton::Left), now);
        let tracked = tracker.on_decoded(MouseEvent::release(rx, ry, release_button), now);

        let expected = same_button && px.abs_diff(rx) <= threshold && py.abs_diff(ry) <= threshold;
        prop_assert_eq!(tracked.synthesized.is_some(), expected);
        if let Some(click) = tracked.synthesized {
            prop_assert_eq!((click.x, click.y), (rx, ry));
            prop_assert_eq!(click.action, MouseAction::Click);
        }
        prop_assert!(tracker.pending().is_none());
    }
}
