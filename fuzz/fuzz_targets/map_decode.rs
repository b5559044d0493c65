#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spark_schema::{
    BYTES, CodecBuf, INTS, LengthWidth, MapSchema, NoopSink, NumberSchema, Schema,
    SchemaMapBuilder, TlvLayout, U8_SCHEMA,
};

/// Fuzz 用例：任意字节流 + 长度字段宽度选择。
///
/// - **Why**：TLV 解码直接面对终端上报的原始字节，长度字段可能为任意值（含 4 字节宽度下的负数），
///   必须保证只返回错误、从不越界或恐慌；
/// - **What**：每轮解码后可读上界必须回到输入末尾，且重新编码已解出的条目不会失败。
#[derive(Debug, Arbitrary)]
struct MapFuzzCase {
    width: u8,
    wire: Vec<u8>,
}

struct Layout(LengthWidth);

impl TlvLayout for Layout {
    type Key = u8;
    type KeySchema = NumberSchema<u8>;

    fn key_schema(&self) -> NumberSchema<u8> {
        U8_SCHEMA
    }

    fn length_width(&self) -> LengthWidth {
        self.0
    }

    fn add_schemas(&self, schemas: &mut SchemaMapBuilder<u8>) {
        schemas.add(0x01, INTS).add(0x02, BYTES);
    }
}

fuzz_target!(|case: MapFuzzCase| {
    let width = match case.width % 3 {
        0 => LengthWidth::Byte,
        1 => LengthWidth::Word,
        _ => LengthWidth::DWord,
    };
    let schema = MapSchema::with_sink(&Layout(width), Arc::new(NoopSink));
    let mut input = CodecBuf::from(case.wire);
    let end = input.writer_index();

    loop {
        match schema.read_from(&mut input) {
            Ok(Some(entry)) => {
                assert_eq!(input.writer_index(), end, "有界子读取后上界必须恢复");
                let mut output = CodecBuf::new();
                schema
                    .write_to(&mut output, Some(&entry))
                    .expect("已解出的条目必可重新编码");
            }
            Ok(None) => break,
            Err(_) => {
                assert_eq!(input.writer_index(), end, "失败路径同样恢复上界");
                break;
            }
        }
    }
});
