#![no_main]

use hardy_postcard::{
    decode,
    value::{self, FieldShape, Shape},
};
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

fuzz_target!(|data: &[u8]| {
    _ = decode::parse::<(String, Vec<u8>, Option<i64>)>(data);
    _ = decode::parse::<BTreeMap<u32, Vec<f32>>>(data);
    _ = decode::parse::<Result<char, [i16; 4]>>(data);

    let shape = Shape::Seq(Box::new(Shape::Struct(vec![
        FieldShape::new("id", Shape::Varint),
        FieldShape::new("flag", Shape::Option(Box::new(Shape::Bool))),
        FieldShape::new(
            "kind",
            Shape::Enum(vec![None, Some(Shape::Isize), Some(Shape::Bytes)]),
        ),
    ])));
    if let Ok(value) = value::parse(data, &shape) {
        _ = format!("{value:?}");
    }
});
