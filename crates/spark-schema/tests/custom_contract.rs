//! 自描述类型桥接契约测试。
//!
//! - `Marker`：解码吞下全部可读字节，编码固定输出 4 字节标记；
//! - `Strict`：以首字节校验报文，用于验证失败路径携带目标类型名。

use std::error::Error as _;
use std::sync::Arc;

use bytes::Bytes;
use spark_schema::{
    CodecBuf, CustomMessage, CustomSchema, DynSchema, Explain, Schema, SchemaError,
    TypedSchemaAdapter, codes,
};
use thiserror::Error;

const MARKER: &[u8; 4] = b"MARK";

#[derive(Debug, Default, PartialEq, Eq)]
struct Marker {
    payload: Vec<u8>,
}

impl CustomMessage for Marker {
    type Error = std::convert::Infallible;

    fn decode(&mut self, input: &mut CodecBuf) -> Result<(), Self::Error> {
        self.payload.extend_from_slice(&input.read_remaining());
        Ok(())
    }

    fn encode(&self) -> Result<Bytes, Self::Error> {
        Ok(Bytes::from_static(MARKER))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
enum StrictError {
    #[error("bad leading byte {0:#04x}")]
    BadLead(u8),
    #[error("nothing to encode")]
    Empty,
}

#[derive(Debug, Default)]
struct Strict {
    body: Vec<u8>,
}

impl CustomMessage for Strict {
    type Error = StrictError;

    fn decode(&mut self, input: &mut CodecBuf) -> Result<(), Self::Error> {
        let lead = input.read_remaining();
        match lead.first() {
            Some(0x7E) => {
                self.body = lead[1..].to_vec();
                Ok(())
            }
            Some(other) => Err(StrictError::BadLead(*other)),
            None => Err(StrictError::Empty),
        }
    }

    fn encode(&self) -> Result<Bytes, Self::Error> {
        if self.body.is_empty() {
            return Err(StrictError::Empty);
        }
        let mut out = Vec::with_capacity(self.body.len() + 1);
        out.push(0x7E);
        out.extend_from_slice(&self.body);
        Ok(Bytes::from(out))
    }
}

#[test]
fn empty_buffer_decodes_to_nothing() {
    let schema = CustomSchema::<Marker>::new();
    let mut input = CodecBuf::new();
    assert_eq!(schema.read_from(&mut input).expect("空缓冲不是错误"), None);
}

#[test]
fn absent_value_writes_nothing_and_present_value_appends_marker() {
    let schema = CustomSchema::<Marker>::new();
    let mut output = CodecBuf::new();
    output.write_u8(0xAA);

    schema.write_to(&mut output, None).expect("缺省值");
    assert_eq!(output.readable(), &[0xAA]);

    schema
        .write_to(&mut output, Some(&Marker::default()))
        .expect("写入标记");
    assert_eq!(output.readable(), b"\xAAMARK");
}

#[test]
fn decode_hands_remaining_bytes_to_the_instance() {
    let schema = CustomSchema::<Marker>::new();
    let mut input = CodecBuf::from(&[1u8, 2, 3]);
    let decoded = schema.read_from(&mut input).expect("解码成功");
    assert_eq!(
        decoded,
        Some(Marker {
            payload: vec![1, 2, 3]
        })
    );
    assert!(!input.is_readable());
}

#[test]
fn bounded_decode_only_exposes_declared_length() {
    let schema = CustomSchema::<Marker>::new();
    let mut input = CodecBuf::from(&[1u8, 2, 3, 4]);
    let decoded = schema.read_bounded(&mut input, 2).expect("有界解码");
    assert_eq!(decoded.map(|marker| marker.payload), Some(vec![1, 2]));
    assert_eq!(input.readable(), &[3, 4], "上界已恢复");
}

#[test]
fn failures_are_tagged_with_target_type() {
    let schema = CustomSchema::<Strict>::new();

    let mut input = CodecBuf::from(&[0x01u8, 0x02]);
    let err = schema.read_from(&mut input).expect_err("首字节不合法");
    assert_eq!(err.code(), codes::DECODE_FAILED);
    let SchemaError::Decode { type_name, .. } = &err else {
        panic!("应为解码错误: {err:?}");
    };
    assert!(type_name.ends_with("Strict"));
    let cause = err
        .source()
        .and_then(|source| source.downcast_ref::<StrictError>());
    assert_eq!(cause, Some(&StrictError::BadLead(0x01)));

    let mut output = CodecBuf::new();
    let err = schema
        .write_to(&mut output, Some(&Strict::default()))
        .expect_err("空报文无法编码");
    assert!(matches!(err, SchemaError::Encode { type_name, .. } if type_name.ends_with("Strict")));
    assert!(!output.is_readable());
}

#[test]
fn merge_from_fills_existing_instance() {
    let schema = CustomSchema::<Strict>::new();
    let mut target = Strict::default();

    assert!(!schema
        .merge_from(&mut CodecBuf::new(), &mut target)
        .expect("空缓冲"));
    assert!(target.body.is_empty());

    let mut input = CodecBuf::from(&[0x7Eu8, 0x10, 0x20]);
    assert!(schema.merge_from(&mut input, &mut target).expect("合法报文"));
    assert_eq!(target.body, [0x10, 0x20]);
}

#[test]
fn traced_bridge_produces_no_field_detail() {
    let schema = CustomSchema::<Marker>::new();
    let mut explain = Explain::new();
    let mut input = CodecBuf::from(&[9u8]);
    let decoded = schema
        .read_traced(&mut input, Some(&mut explain))
        .expect("解码成功");
    assert!(decoded.is_some());
    assert!(explain.is_empty());
}

#[test]
fn object_layer_round_trips_through_bridge() {
    let shared = TypedSchemaAdapter::shared(CustomSchema::<Strict>::new());
    let message = Strict {
        body: vec![0xAB, 0xCD],
    };

    let mut buffer = CodecBuf::new();
    shared
        .write_dyn(&mut buffer, &message, None)
        .expect("对象层编码");
    assert_eq!(buffer.readable(), &[0x7E, 0xAB, 0xCD]);

    let decoded = shared.read_as::<Strict>(&mut buffer).expect("对象层解码");
    assert_eq!(decoded.map(|strict| strict.body), Some(vec![0xAB, 0xCD]));

    let err = shared
        .write_dyn(&mut CodecBuf::new(), &7u32, None)
        .expect_err("值类型不符");
    assert_eq!(err.code(), codes::TYPE_MISMATCH);
}

#[test]
fn debug_names_the_wrapped_type() {
    assert_eq!(
        format!("{:?}", CustomSchema::<Marker>::new()),
        "{typeClass=Marker}"
    );
    let shared: Arc<dyn DynSchema> = TypedSchemaAdapter::shared(CustomSchema::<Marker>::new());
    assert!(shared.value_type().ends_with("Marker"));
}
