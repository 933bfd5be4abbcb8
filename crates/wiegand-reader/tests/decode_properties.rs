//! Property tests for the accumulate-and-classify path.

use proptest::prelude::*;
use wiegand_core::constants::{NIBBLE_MASK, SILENCE_THRESHOLD_MS};
use wiegand_core::{DataLine, DecodedFrame, DiscardReason, KeyInput, WiegandFormat, WiegandFrame};
use wiegand_reader::{Classification, FrameClassifier, RawBits, WiegandBus};

const EDGE_AT: u64 = 10_000;
const AFTER_SILENCE: u64 = EDGE_AT + SILENCE_THRESHOLD_MS + 1;

fn classify(frame: &WiegandFrame) -> (Classification, RawBits) {
    let bus = WiegandBus::new();
    for line in frame.lines() {
        bus.record_edge(line, EDGE_AT);
    }
    let mut classifier = FrameClassifier::new();
    let result = bus.with_bits(|bits| classifier.classify(bits, AFTER_SILENCE));
    (result, bus.snapshot())
}

proptest! {
    #[test]
    fn card26_round_trip(id in 0u32..(1 << 24)) {
        let (result, bits) = classify(&WiegandFrame::card26(id).unwrap());
        prop_assert_eq!(
            result,
            Classification::Frame(DecodedFrame::new(id, WiegandFormat::Card26, 26))
        );
        prop_assert!(bits.is_empty());
    }

    #[test]
    fn card34_round_trip(id in any::<u32>()) {
        let (result, bits) = classify(&WiegandFrame::card34(id));
        prop_assert_eq!(
            result,
            Classification::Frame(DecodedFrame::new(id, WiegandFormat::Card34, 34))
        );
        prop_assert_eq!(bits.high(), 0);
    }

    #[test]
    fn keypad4_accepts_every_nibble(code in 0u32..16) {
        let (result, _) = classify(&WiegandFrame::keypad4(KeyInput::from_code(code)).unwrap());
        prop_assert_eq!(
            result,
            Classification::Frame(DecodedFrame::new(code, WiegandFormat::Keypad4, 4))
        );
    }

    #[test]
    fn keypad8_requires_complement(high in 0u32..16, low in 0u32..16) {
        let byte = (high << 4) | low;
        let frame = WiegandFrame::from_bit_str(&format!("{:08b}", byte)).unwrap();

        let (result, bits) = classify(&frame);

        if low == (!high & NIBBLE_MASK) {
            prop_assert_eq!(
                result,
                Classification::Frame(DecodedFrame::new(low, WiegandFormat::Keypad8, 8))
            );
        } else {
            prop_assert_eq!(
                result,
                Classification::Discarded(DiscardReason::ParityMismatch {
                    high_nibble: high as u8,
                    low_nibble: low as u8,
                })
            );
            prop_assert_eq!(bits.last_edge_ms(), AFTER_SILENCE);
        }
        prop_assert!(bits.is_empty());
    }

    #[test]
    fn unsupported_lengths_are_discarded(bits in prop::collection::vec(any::<bool>(), 1..64)) {
        let count = bits.len() as u32;
        prop_assume!(WiegandFormat::from_bit_count(count).is_none());

        let (result, after) = classify(&WiegandFrame::raw(bits));

        prop_assert_eq!(
            result,
            Classification::Discarded(DiscardReason::UnsupportedLength { bit_count: count })
        );
        prop_assert!(after.is_empty());
    }

    #[test]
    fn frame_after_reset_ignores_previous_bits(
        previous in prop::collection::vec(any::<bool>(), 0..64),
        id in any::<u32>(),
    ) {
        let mut bits = RawBits::new();
        let mut classifier = FrameClassifier::new();

        for &bit in &previous {
            bits.push(DataLine::for_bit(bit), EDGE_AT);
        }
        classifier.classify(&mut bits, AFTER_SILENCE);

        let next_edge = AFTER_SILENCE + 100;
        for line in WiegandFrame::card34(id).lines() {
            bits.push(line, next_edge);
        }
        prop_assert_eq!(bits.bit_count(), 34);

        let result = classifier.classify(&mut bits, next_edge + SILENCE_THRESHOLD_MS + 1);
        prop_assert_eq!(
            result,
            Classification::Frame(DecodedFrame::new(id, WiegandFormat::Card34, 34))
        );
    }
}
