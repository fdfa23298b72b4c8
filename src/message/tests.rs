//! Unit tests for the message codec.

use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::frame::Frame;

#[test]
fn u32_then_default_string_round_trips() {
    let mut writer = MessageWriter::new();
    writer.write_u32(0x1234_5678);
    writer.write_string("hi").expect("short string encodes");

    assert_eq!(
        writer.as_bytes(),
        &[0x78, 0x56, 0x34, 0x12, 4, 0, b'h', 0, b'i', 0]
    );

    let mut reader = MessageReader::new(writer.into_bytes());
    assert_eq!(reader.read_u32().expect("u32"), 0x1234_5678);
    assert_eq!(reader.read_string().expect("string"), "hi");
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn bool_writes_one_and_reads_any_nonzero_as_true() {
    let mut writer = MessageWriter::new();
    writer.write_bool(true);
    writer.write_bool(false);
    assert_eq!(writer.as_bytes(), &[1, 0]);

    let mut reader = MessageReader::new(&[0x7f_u8, 0][..]);
    assert!(reader.read_bool().expect("first bool"));
    assert!(!reader.read_bool().expect("second bool"));
}

#[test]
fn every_primitive_round_trips_in_order() {
    let mut writer = MessageWriter::with_capacity(64);
    writer.write_u8(0xAB);
    writer.write_i8(-5);
    writer.write_u16(0xBEEF);
    writer.write_i16(-1234);
    writer.write_u32(u32::MAX);
    writer.write_i32(i32::MIN);
    writer.write_u64(0x0102_0304_0506_0708);
    writer.write_i64(-42);
    writer.write_f32(1.5);
    writer.write_f64(-0.125);
    writer.write_bool(true);
    assert_eq!(writer.position(), 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8 + 4 + 8 + 1);

    let mut reader = MessageReader::new(writer.into_bytes());
    assert_eq!(reader.read_u8().expect("u8"), 0xAB);
    assert_eq!(reader.read_i8().expect("i8"), -5);
    assert_eq!(reader.read_u16().expect("u16"), 0xBEEF);
    assert_eq!(reader.read_i16().expect("i16"), -1234);
    assert_eq!(reader.read_u32().expect("u32"), u32::MAX);
    assert_eq!(reader.read_i32().expect("i32"), i32::MIN);
    assert_eq!(reader.read_u64().expect("u64"), 0x0102_0304_0506_0708);
    assert_eq!(reader.read_i64().expect("i64"), -42);
    assert_eq!(reader.read_f32().expect("f32").to_bits(), 1.5f32.to_bits());
    assert_eq!(reader.read_f64().expect("f64").to_bits(), (-0.125f64).to_bits());
    assert!(reader.read_bool().expect("bool"));
}

#[rstest]
#[case::u16(&[1][..], 2)]
#[case::u32(&[1, 2, 3][..], 4)]
#[case::u64(&[1, 2, 3, 4, 5, 6, 7][..], 8)]
fn short_reads_report_end_of_stream(#[case] data: &'static [u8], #[case] needed: usize) {
    let mut reader = MessageReader::new(data);
    let err = match needed {
        2 => reader.read_u16().map(u64::from),
        4 => reader.read_u32().map(u64::from),
        _ => reader.read_u64(),
    }
    .expect_err("read past the end must fail");

    assert_eq!(
        err,
        DecodeError::EndOfStream {
            needed,
            remaining: data.len()
        }
    );
    assert_eq!(reader.position(), 0, "failed reads leave the cursor in place");
}

#[test]
fn empty_payload_fails_on_first_read() {
    let mut reader = MessageReader::new(Vec::new());
    assert!(matches!(
        reader.read_u8(),
        Err(DecodeError::EndOfStream {
            needed: 1,
            remaining: 0
        })
    ));
}

#[test]
fn truncated_string_restores_cursor() {
    let mut reader = MessageReader::new(&[6u8, 0, b'h', 0][..]);
    assert!(matches!(
        reader.read_string(),
        Err(DecodeError::EndOfStream { .. })
    ));
    assert_eq!(reader.position(), 0);
}

#[rstest]
#[case(StringEncoding::Utf16Le, vec![4, 0, b'o', 0, b'k', 0])]
#[case(StringEncoding::Utf16Be, vec![4, 0, 0, b'o', 0, b'k'])]
#[case(StringEncoding::Utf8, vec![2, 0, b'o', b'k'])]
fn string_length_counts_encoded_bytes(
    #[case] encoding: StringEncoding,
    #[case] expected: Vec<u8>,
) {
    let mut writer = MessageWriter::new();
    writer
        .write_string_with("ok", encoding)
        .expect("short string encodes");
    assert_eq!(writer.as_bytes(), expected.as_slice());

    let mut reader = MessageReader::new(expected);
    assert_eq!(reader.read_string_with(encoding).expect("decode"), "ok");
}

#[test]
fn odd_length_utf16_is_rejected() {
    let mut reader = MessageReader::new(&[3u8, 0, b'a', 0, b'b'][..]);
    assert_eq!(
        reader.read_string(),
        Err(DecodeError::InvalidString {
            encoding: StringEncoding::Utf16Le
        })
    );
}

#[test]
fn oversized_string_is_rejected_without_writing() {
    let mut writer = MessageWriter::new();
    let text = "x".repeat(usize::from(u16::MAX) + 1);

    let err = writer
        .write_string_with(&text, StringEncoding::Utf8)
        .expect_err("string longer than u16::MAX bytes");
    assert_eq!(
        err,
        EncodeError::StringTooLong {
            len: usize::from(u16::MAX) + 1
        }
    );
    assert_eq!(writer.position(), 0);
}

#[test]
fn reset_rewinds_the_writer() {
    let mut writer = MessageWriter::new();
    writer.write_u64(7);
    writer.reset();
    writer.write_u8(1);
    assert_eq!(writer.as_bytes(), &[1]);
}

#[test]
fn reader_from_frame_skips_length_prefix() {
    let mut writer = MessageWriter::new();
    writer.write_u16(0x0102);
    let frame = Frame::from_payload(writer.into_bytes()).expect("small payload frames");

    let mut reader = MessageReader::from_frame(&frame).expect("frame has a header");
    assert_eq!(reader.position(), 4);
    assert_eq!(reader.read_u16().expect("first field"), 0x0102);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn read_bytes_returns_exact_slice() {
    let mut reader = MessageReader::new(&[1u8, 2, 3, 4][..]);
    reader.read_u8().expect("skip one");
    assert_eq!(reader.read_bytes(2).expect("two bytes").as_ref(), &[2, 3]);
    assert_eq!(reader.remaining(), 1);
}

#[derive(Clone, Debug)]
enum Field {
    Bool(bool),
    U8(u8),
    I16(i16),
    U32(u32),
    I64(i64),
    F32(f32),
    F64(f64),
    Text(String),
}

fn field_strategy() -> impl Strategy<Value = Field> {
    prop_oneof![
        any::<bool>().prop_map(Field::Bool),
        any::<u8>().prop_map(Field::U8),
        any::<i16>().prop_map(Field::I16),
        any::<u32>().prop_map(Field::U32),
        any::<i64>().prop_map(Field::I64),
        any::<f32>().prop_map(Field::F32),
        any::<f64>().prop_map(Field::F64),
        ".{0,24}".prop_map(Field::Text),
    ]
}

proptest! {
    #[test]
    fn generated_field_sequences_decode_bit_identically(
        fields in proptest::collection::vec(field_strategy(), 0..32)
    ) {
        let mut writer = MessageWriter::new();
        for field in &fields {
            match field {
                Field::Bool(v) => writer.write_bool(*v),
                Field::U8(v) => writer.write_u8(*v),
                Field::I16(v) => writer.write_i16(*v),
                Field::U32(v) => writer.write_u32(*v),
                Field::I64(v) => writer.write_i64(*v),
                Field::F32(v) => writer.write_f32(*v),
                Field::F64(v) => writer.write_f64(*v),
                Field::Text(v) => writer.write_string(v).expect("short text encodes"),
            }
        }

        let mut reader = MessageReader::new(writer.into_bytes());
        for field in &fields {
            match field {
                Field::Bool(v) => prop_assert_eq!(reader.read_bool()?, *v),
                Field::U8(v) => prop_assert_eq!(reader.read_u8()?, *v),
                Field::I16(v) => prop_assert_eq!(reader.read_i16()?, *v),
                Field::U32(v) => prop_assert_eq!(reader.read_u32()?, *v),
                Field::I64(v) => prop_assert_eq!(reader.read_i64()?, *v),
                Field::F32(v) => prop_assert_eq!(reader.read_f32()?.to_bits(), v.to_bits()),
                Field::F64(v) => prop_assert_eq!(reader.read_f64()?.to_bits(), v.to_bits()),
                Field::Text(v) => prop_assert_eq!(&reader.read_string()?, v),
            }
        }
        prop_assert_eq!(reader.remaining(), 0);
    }
}
