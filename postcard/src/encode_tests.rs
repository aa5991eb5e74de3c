use super::encode::*;
use super::{Error, Varint};
use alloc::{boxed::Box, collections::BTreeMap, string::String, vec, vec::Vec};
use hex_literal::hex;

#[test]
fn scalar_tests() {
    assert_eq!(emit(&true).unwrap(), hex!("01"));
    assert_eq!(emit(&false).unwrap(), hex!("00"));

    assert_eq!(emit(&0u8).unwrap(), hex!("00"));
    assert_eq!(emit(&255u8).unwrap(), hex!("ff"));
    assert_eq!(emit(&-1i8).unwrap(), hex!("ff"));
    assert_eq!(emit(&i8::MIN).unwrap(), hex!("80"));

    assert_eq!(emit(&127u16).unwrap(), hex!("7f"));
    assert_eq!(emit(&128u16).unwrap(), hex!("8001"));
    assert_eq!(emit(&16384u16).unwrap(), hex!("808001"));
    assert_eq!(emit(&u16::MAX).unwrap(), hex!("ffff03"));
    assert_eq!(emit(&u32::MAX).unwrap(), hex!("ffffffff0f"));
    assert_eq!(emit(&u64::MAX).unwrap(), hex!("ffffffffffffffffff01"));
    assert_eq!(emit(&300usize).unwrap(), hex!("ac02"));

    assert_eq!(emit(&-1i16).unwrap(), hex!("01"));
    assert_eq!(emit(&-64i16).unwrap(), hex!("7f"));
    assert_eq!(emit(&64i16).unwrap(), hex!("8001"));
    assert_eq!(emit(&i16::MIN).unwrap(), hex!("ffff03"));
    assert_eq!(emit(&i32::MIN).unwrap(), hex!("ffffffff0f"));
    assert_eq!(emit(&i32::MAX).unwrap(), hex!("feffffff0f"));
    assert_eq!(emit(&i64::MIN).unwrap(), hex!("ffffffffffffffffff01"));
    assert_eq!(emit(&-1isize).unwrap(), hex!("01"));

    // Never zigzagged
    assert_eq!(emit(&Varint(300)).unwrap(), hex!("ac02"));
    assert_eq!(emit(&Varint(1)).unwrap(), hex!("01"));
}

#[test]
fn float_tests() {
    assert_eq!(emit(&0.0f32).unwrap(), hex!("00000000"));
    assert_eq!(emit(&-0.0f32).unwrap(), hex!("00000080"));
    assert_eq!(emit(&1.0f32).unwrap(), hex!("0000803f"));
    assert_eq!(emit(&-32.005859375f32).unwrap(), hex!("000600c2"));
    assert_eq!(emit(&f32::NAN).unwrap(), hex!("0000c07f"));

    assert_eq!(emit(&1.0f64).unwrap(), hex!("000000000000f03f"));
    assert_eq!(emit(&-32.005859375f64).unwrap(), hex!("00000000c00040c0"));
    assert_eq!(emit(&f64::INFINITY).unwrap(), hex!("000000000000f07f"));
}

#[test]
fn string_tests() {
    assert_eq!(emit("").unwrap(), hex!("00"));
    assert_eq!(emit("hello").unwrap(), hex!("05 68656c6c6f"));
    assert_eq!(
        emit(&String::from("你好世界")).unwrap(),
        hex!("0c e4bda0 e5a5bd e4b896 e7958c")
    );
    assert_eq!(emit_str("hello").unwrap(), emit("hello").unwrap());

    assert_eq!(emit(&'a').unwrap(), hex!("01 61"));
    assert_eq!(emit(&'é').unwrap(), hex!("02 c3a9"));
    assert_eq!(emit_char('😀').unwrap(), hex!("04 f09f9880"));
}

#[test]
fn bytes_tests() {
    assert_eq!(emit_bytes(&[]).unwrap(), hex!("00"));
    assert_eq!(emit_bytes(&hex!("01002030")).unwrap(), hex!("04 01002030"));

    // A u8 sequence is always the bytes form, whatever its container
    let expected = hex!("03 010203");
    assert_eq!(emit(&vec![1u8, 2, 3]).unwrap(), expected);
    assert_eq!(emit(&[1u8, 2, 3][..]).unwrap(), expected);
    assert_eq!(emit_bytes(&[1, 2, 3]).unwrap(), expected);

    let mut e = Encoder::new();
    e.emit_iter(1..4u8).unwrap();
    assert_eq!(e.build(), expected);
}

#[test]
fn seq_tests() {
    assert_eq!(emit(&Vec::<i32>::new()).unwrap(), hex!("00"));
    assert_eq!(emit(&vec![1i32, 2, 3]).unwrap(), hex!("03 020406"));
    assert_eq!(emit(&vec![1isize, 2, 3, 4, 5]).unwrap(), hex!("05 020406080a"));
    assert_eq!(emit(&vec![128u32, 1]).unwrap(), hex!("02 8001 01"));
    assert_eq!(
        emit(&vec!["a", "bc"]).unwrap(),
        hex!("02 0161 026263")
    );
    assert_eq!(
        emit(&vec![vec![1u8], vec![]]).unwrap(),
        hex!("02 0101 00")
    );

    let mut set = alloc::collections::BTreeSet::new();
    set.insert(3u16);
    set.insert(1u16);
    assert_eq!(emit(&set).unwrap(), hex!("02 01 03"));
}

#[test]
fn array_tests() {
    // No length prefix
    assert_eq!(emit(&[1u16, 2, 300]).unwrap(), hex!("01 02 ac02"));
    assert_eq!(emit(&[0u8; 4]).unwrap(), hex!("00000000"));
    assert_eq!(emit(&[true; 0]).unwrap(), hex!(""));
}

#[test]
fn map_tests() {
    assert_eq!(emit(&BTreeMap::<String, i32>::new()).unwrap(), hex!("00"));

    let mut map = BTreeMap::new();
    map.insert("b", 2i32);
    map.insert("a", 1i32);
    assert_eq!(emit(&map).unwrap(), hex!("02 0161 02 0162 04"));

    let mut map = BTreeMap::new();
    map.insert(String::from("hello"), 42i64);
    map.insert(String::from("world"), 123i64);
    assert_eq!(
        emit(&map).unwrap(),
        hex!("02 0568656c6c6f 54 05776f726c64 f601")
    );
}

#[cfg(feature = "std")]
#[test]
fn hash_map_tests() {
    let mut map = std::collections::HashMap::new();
    map.insert(7u8, true);
    assert_eq!(emit(&map).unwrap(), hex!("01 07 01"));

    let mut set = std::collections::HashSet::new();
    set.insert(-1i32);
    assert_eq!(emit(&set).unwrap(), hex!("01 01"));
}

#[test]
fn option_tests() {
    assert_eq!(emit(&None::<i32>).unwrap(), hex!("00"));
    assert_eq!(emit(&Some(42i32)).unwrap(), hex!("01 54"));
    assert_eq!(emit(&Some(None::<u8>)).unwrap(), hex!("01 00"));
    assert_eq!(emit(&Some(Box::new(7u8))).unwrap(), hex!("01 07"));
}

#[test]
fn sum_tests() {
    assert_eq!(emit(&Ok::<u8, String>(1)).unwrap(), hex!("00 01"));
    assert_eq!(emit(&Err::<u8, &str>("x")).unwrap(), hex!("01 0178"));

    let mut e = Encoder::new();
    e.emit_variant(200).unwrap();
    e.emit_u8(5).unwrap();
    assert_eq!(e.build(), hex!("c801 05"));
}

#[test]
fn tuple_tests() {
    assert_eq!(emit(&()).unwrap(), hex!(""));
    assert_eq!(
        emit(&(0xABCDu16, 0xFEu8, 0x1234_4321_ABCD_DCBAu64, 0xACAC_ACACu32)).unwrap(),
        hex!("cdd702 fe bab9b7de9ae4909a12 acd9b2e50a")
    );
    assert_eq!(
        emit(&(u16::MAX, u8::MAX, u64::MAX, u32::MAX)).unwrap(),
        hex!("ffff03 ff ffffffffffffffffff01 ffffffff0f")
    );
    assert_eq!(
        emit(&(1u8, 2u8, 3u8, 4u8, 5u8, 6u8, 7u8, 8u8)).unwrap(),
        hex!("0102030405060708")
    );
}

#[test]
fn emit_into_reuses_buffer() {
    let buf = Vec::with_capacity(64);
    let buf = emit_into(&"stale", buf).unwrap();
    let ptr = buf.as_ptr();

    let buf = emit_into(&1u32, buf).unwrap();
    assert_eq!(buf, hex!("01"));
    assert_eq!(buf.as_ptr(), ptr);
    assert!(buf.capacity() >= 64);
}

#[test]
fn emit_to_slice_tests() {
    let mut buf = [0u8; 8];
    assert_eq!(emit_to_slice(&"hi", &mut buf).unwrap(), hex!("02 6869"));

    let mut buf = [0u8; 3];
    assert_eq!(emit_to_slice(&"hello", &mut buf), Err(Error::BufferFull));

    let mut buf = [0u8; 4];
    assert_eq!(emit_to_slice(&u32::MAX, &mut buf), Err(Error::BufferFull));

    let mut buf = [0u8; 0];
    assert_eq!(emit_to_slice(&(), &mut buf).unwrap(), hex!(""));
}

#[test]
fn unknown_length_tests() {
    let mut e = Encoder::new();
    assert_eq!(
        e.emit_iter((0..10u8).filter(|v| v % 2 == 0)),
        Err(Error::SeqLengthUnknown)
    );
    assert_eq!(e.offset(), 0);

    let mut e = Encoder::new();
    assert_eq!(
        e.emit_map((0..4u8).filter(|v| *v > 1).map(|v| (v, v))),
        Err(Error::SeqLengthUnknown)
    );

    let mut e = Encoder::new();
    e.emit_map((0..2u8).map(|v| (v, v == 1))).unwrap();
    assert_eq!(e.build(), hex!("02 0000 0101"));
}
