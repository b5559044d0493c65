//! 定宽数组编解码器族的性质测试。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：七种元素共用一套计数规则，逐类型手写样例容易遗漏；
//!   以 Proptest 生成任意数组，统一验证往返律与“按整元素截断”律；
//! - **合同与边界 (What)**：浮点元素限定在有限区间内，避免 NaN 破坏相等比较；
//!   轨迹版本与非轨迹版本必须产出相同字节。

use proptest::prelude::*;
use spark_schema::{
    ArraySchema, BYTES, BufferError, CHARS, CodecBuf, DOUBLES, Element, Explain, FLOATS, INTS,
    LONGS, SHORTS, Schema, codes,
};

fn round_trip<E: Element + PartialEq>(schema: ArraySchema<E>, values: &Vec<E>) -> Vec<E> {
    let mut buffer = CodecBuf::new();
    schema.write_to(&mut buffer, Some(values)).expect("编码成功");
    assert_eq!(buffer.readable_bytes(), values.len() * E::WIDTH);
    schema
        .read_from(&mut buffer)
        .expect("解码成功")
        .expect("无界解码总是产出数组")
}

fn bounded_prefix<E: Element + PartialEq>(
    schema: ArraySchema<E>,
    values: &Vec<E>,
    length: usize,
) -> Vec<E> {
    let mut buffer = CodecBuf::new();
    schema.write_to(&mut buffer, Some(values)).expect("编码成功");
    schema
        .read_bounded(&mut buffer, length as i32)
        .expect("解码成功")
        .expect("有界解码总是产出数组")
}

proptest! {
    #[test]
    fn every_element_kind_round_trips(
        bytes in prop::collection::vec(any::<u8>(), 0..64),
        chars in prop::collection::vec(any::<u16>(), 0..64),
        shorts in prop::collection::vec(any::<i16>(), 0..64),
        ints in prop::collection::vec(any::<i32>(), 0..64),
        floats in prop::collection::vec(-1.0e6f32..1.0e6f32, 0..64),
        longs in prop::collection::vec(any::<i64>(), 0..64),
        doubles in prop::collection::vec(-1.0e12f64..1.0e12f64, 0..64),
    ) {
        prop_assert_eq!(round_trip(BYTES, &bytes), bytes);
        prop_assert_eq!(round_trip(CHARS, &chars), chars);
        prop_assert_eq!(round_trip(SHORTS, &shorts), shorts);
        prop_assert_eq!(round_trip(INTS, &ints), ints);
        prop_assert_eq!(round_trip(FLOATS, &floats), floats);
        prop_assert_eq!(round_trip(LONGS, &longs), longs);
        prop_assert_eq!(round_trip(DOUBLES, &doubles), doubles);
    }

    #[test]
    fn bounded_decode_truncates_to_whole_elements(
        longs in prop::collection::vec(any::<i64>(), 1..16),
        cut in 0usize..128,
    ) {
        let length = cut.min(longs.len() * 8);
        let decoded = bounded_prefix(LONGS, &longs, length);
        prop_assert_eq!(&decoded[..], &longs[..length / 8]);
    }

    #[test]
    fn bounded_encode_writes_prefix_of_whole_elements(
        shorts in prop::collection::vec(any::<i16>(), 0..32),
        length in 0i32..80,
    ) {
        let mut buffer = CodecBuf::new();
        SHORTS
            .write_bounded(&mut buffer, length, Some(&shorts))
            .expect("编码成功");
        let count = (length as usize / 2).min(shorts.len());
        prop_assert_eq!(buffer.readable_bytes(), count * 2);
        let decoded = SHORTS.read_from(&mut buffer).expect("解码成功");
        prop_assert_eq!(decoded, Some(shorts[..count].to_vec()));
    }
}

#[test]
fn empty_buffer_decodes_to_empty_array() {
    let mut input = CodecBuf::new();
    assert_eq!(INTS.read_from(&mut input).expect("空缓冲"), Some(Vec::new()));
    assert_eq!(
        DOUBLES.read_bounded(&mut input, 0).expect("零长度"),
        Some(Vec::new())
    );
}

#[test]
fn absent_value_writes_nothing() {
    let mut output = CodecBuf::new();
    FLOATS.write_to(&mut output, None).expect("缺省值");
    FLOATS.write_bounded(&mut output, 8, None).expect("缺省值");
    assert!(!output.is_readable());
}

#[test]
fn elements_are_big_endian() {
    let mut output = CodecBuf::new();
    CHARS
        .write_to(&mut output, Some(&vec![0x0102, 0xA0B0]))
        .expect("编码成功");
    DOUBLES
        .write_to(&mut output, Some(&vec![1.0]))
        .expect("编码成功");
    assert_eq!(
        output.readable(),
        &[0x01, 0x02, 0xA0, 0xB0, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn bounded_decode_beyond_readable_bytes_fails_with_underflow() {
    let mut input = CodecBuf::from(&[0u8, 0, 0, 1]);
    let err = INTS.read_bounded(&mut input, 8).expect_err("只有一个元素");
    assert_eq!(err.code(), codes::DECODE_FAILED);
    assert!(matches!(
        err.buffer_cause(),
        Some(BufferError::Underflow {
            requested: 8,
            readable: 4
        })
    ));
    assert_eq!(input.reader_index(), 0);
}

#[test]
fn traced_calls_record_field_and_keep_bytes() {
    let values = vec![-1i16, 0, 1];
    let mut plain = CodecBuf::new();
    SHORTS.write_to(&mut plain, Some(&values)).expect("编码成功");

    let mut traced = CodecBuf::new();
    let mut explain = Explain::new();
    SHORTS
        .write_traced(&mut traced, Some(&values), Some(&mut explain))
        .expect("编码成功");
    assert_eq!(traced.readable(), plain.readable());

    let decoded = SHORTS
        .read_traced(&mut traced, Some(&mut explain))
        .expect("解码成功");
    assert_eq!(decoded, Some(values));
    let rendered = explain.to_string();
    assert_eq!(
        rendered,
        "[0000+6] short[3]: [-1, 0, 1]\n[0000+6] short[3]: [-1, 0, 1]\n"
    );
}
