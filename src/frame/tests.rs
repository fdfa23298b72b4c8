//! Unit tests for frames and the reassembler.

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::*;

fn wire(payloads: &[&[u8]]) -> Vec<u8> {
    payloads
        .iter()
        .flat_map(|p| {
            Frame::from_payload(p)
                .expect("test payloads are small")
                .into_bytes()
        })
        .collect()
}

#[fixture]
fn reassembler() -> FrameReassembler { FrameReassembler::new(8) }

#[test]
fn frame_header_excludes_itself() {
    let frame = Frame::from_payload([0xAAu8; 5]).expect("frame");
    assert_eq!(&frame.as_ref()[..4], &[5, 0, 0, 0]);
    assert_eq!(frame.payload_len(), 5);
    assert_eq!(frame.wire_len(), 9);
}

#[rstest]
fn exactly_four_buffered_bytes_complete_an_empty_frame(mut reassembler: FrameReassembler) {
    let frames = reassembler.push(&[0, 0, 0, 0]).expect("push");
    assert_eq!(frames.len(), 1, "header check must fire at exactly 4 bytes");
    assert_eq!(frames[0].payload_len(), 0);
    assert_eq!(reassembler.buffered_len(), 0);
}

#[rstest]
#[case::inside_header(vec![2, 5])]
#[case::inside_payload(vec![4, 5])]
#[case::at_frame_boundary(vec![7, 9])]
fn two_frames_split_three_ways(mut reassembler: FrameReassembler, #[case] cuts: Vec<usize>) {
    let bytes = wire(&[b"abc", b""]);
    let (first, rest) = bytes.split_at(cuts[0]);
    let (second, third) = rest.split_at(cuts[1] - cuts[0]);

    let mut frames = Vec::new();
    for chunk in [first, second, third] {
        reassembler
            .add_bytes(chunk, |f| frames.push(f))
            .expect("well-formed input");
    }

    let lengths: Vec<usize> = frames.iter().map(Frame::payload_len).collect();
    assert_eq!(lengths, vec![3, 0]);
    assert_eq!(frames[0].payload(), b"abc");
}

#[rstest]
fn partial_payload_waits_for_the_rest(mut reassembler: FrameReassembler) {
    let bytes = wire(&[b"0123456789"]);

    let frames = reassembler.push(&bytes[..10]).expect("push");
    assert!(frames.is_empty(), "six of ten payload bytes must not emit");
    assert_eq!(reassembler.buffered_len(), 10);

    let frames = reassembler.push(&bytes[10..]).expect("push");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload(), b"0123456789");
}

#[rstest]
fn callback_count_matches_return_value(mut reassembler: FrameReassembler) {
    let bytes = wire(&[b"a", b"bb", b"ccc"]);
    let mut seen = 0;
    let completed = reassembler
        .add_bytes(&bytes, |_| seen += 1)
        .expect("well-formed input");
    assert_eq!(completed, 3);
    assert_eq!(seen, 3);
}

#[rstest]
fn reset_discards_partial_frame(mut reassembler: FrameReassembler) {
    reassembler.push(&[9, 0, 0, 0, 1, 2]).expect("push");
    reassembler.reset();
    assert_eq!(reassembler.buffered_len(), 0);

    let frames = reassembler.push(&wire(&[b"xy"])).expect("push");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].payload(), b"xy");
}

#[test]
fn oversized_prefix_is_rejected_and_buffer_cleared() {
    let mut reassembler = FrameReassembler::new(16).with_max_frame_length(Some(8));
    let err = reassembler
        .push(&[9, 0, 0, 0])
        .expect_err("nine bytes exceed the limit");

    assert_eq!(err, ReassemblyError::FrameTooLarge { size: 9, max: 8 });
    assert_eq!(reassembler.buffered_len(), 0);
}

#[test]
fn frames_before_an_oversized_prefix_are_still_emitted() {
    let mut reassembler = FrameReassembler::new(16).with_max_frame_length(Some(4));
    let mut bytes = wire(&[b"ok"]);
    bytes.extend_from_slice(&[0xFF, 0xFF, 0, 0]);

    let mut frames = Vec::new();
    let result = reassembler.add_bytes(&bytes, |f| frames.push(f));

    assert!(matches!(result, Err(ReassemblyError::FrameTooLarge { .. })));
    assert_eq!(frames.len(), 1);
}

#[test]
fn unlimited_by_default_grows_to_fit() {
    let mut reassembler = FrameReassembler::new(2);
    let payload = vec![7u8; 10_000];
    let frames = reassembler.push(&wire(&[&payload])).expect("push");
    assert_eq!(frames[0].payload(), payload.as_slice());
}

fn payloads_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..48), 0..12)
}

fn cuts_strategy() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0usize..1024, 0..16)
}

fn split_at_cuts(bytes: &[u8], mut cuts: Vec<usize>) -> Vec<&[u8]> {
    cuts.iter_mut().for_each(|c| *c %= bytes.len() + 1);
    cuts.sort_unstable();
    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(&bytes[start..cut]);
        start = cut;
    }
    chunks.push(&bytes[start..]);
    chunks
}

proptest! {
    #[test]
    fn any_split_yields_the_same_frames_in_order(
        payloads in payloads_strategy(),
        cuts in cuts_strategy(),
    ) {
        let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
        let bytes = wire(&refs);
        let expected: Vec<Frame> = refs
            .iter()
            .map(|p| Frame::from_payload(p).expect("frame"))
            .collect();

        let mut reassembler = FrameReassembler::new(4);
        let mut frames = Vec::new();
        for chunk in split_at_cuts(&bytes, cuts) {
            reassembler.add_bytes(chunk, |f| frames.push(f))?;
        }

        prop_assert_eq!(frames, expected);
        prop_assert_eq!(reassembler.buffered_len(), 0);
    }

    #[test]
    fn reset_behaves_like_a_fresh_reassembler(
        junk in proptest::collection::vec(any::<u8>(), 0..3),
        payloads in payloads_strategy(),
        cuts in cuts_strategy(),
    ) {
        let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
        let bytes = wire(&refs);

        let mut reused = FrameReassembler::new(4);
        reused.push(&junk)?;
        reused.reset();
        let mut fresh = FrameReassembler::new(4);

        let mut from_reused = Vec::new();
        let mut from_fresh = Vec::new();
        for chunk in split_at_cuts(&bytes, cuts) {
            reused.add_bytes(chunk, |f| from_reused.push(f))?;
            fresh.add_bytes(chunk, |f| from_fresh.push(f))?;
        }
        prop_assert_eq!(from_reused, from_fresh);
    }

    #[test]
    fn incomplete_tail_never_emits(
        payload in proptest::collection::vec(any::<u8>(), 1..64),
        keep in 0usize..64,
    ) {
        let bytes = wire(&[&payload]);
        let keep = keep.min(bytes.len() - 1);

        let mut reassembler = FrameReassembler::new(4);
        prop_assert!(reassembler.push(&bytes[..keep])?.is_empty());
        let frames = reassembler.push(&bytes[keep..])?;
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].payload(), payload.as_slice());
    }
}
