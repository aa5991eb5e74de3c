#![no_main]

use hardy_postcard::{
    decode::Decoder,
    value::{self, FieldShape, Shape},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let shape = Shape::Struct(vec![
        FieldShape::new("name", Shape::String),
        FieldShape::skipped("cache", Shape::Bytes),
        FieldShape::new(
            "entries",
            Shape::Map(
                Box::new(Shape::Char),
                Box::new(Shape::Array(Box::new(Shape::I32), 2)),
            ),
        ),
        FieldShape::new("weight", Shape::Option(Box::new(Shape::F64))),
        FieldShape::new("tail", Shape::Seq(Box::new(Shape::U16))),
    ]);

    // Decoding only accepts canonical input, so a re-encode must reproduce
    // exactly the bytes consumed
    let mut decoder = Decoder::new(data);
    if let Ok(value) = shape.parse(&mut decoder) {
        let encoded = value::emit_shaped(&value, &shape).expect("Failed to re-encode");
        assert_eq!(encoded, &data[..decoder.offset()]);
    }
});
