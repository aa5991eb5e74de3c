use super::{Error, FromPostcard, ToPostcard, decode::*, encode::emit};
use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};
use hex_literal::hex;

#[derive(Debug, Clone, PartialEq, ToPostcard, FromPostcard)]
struct BasicStruct {
    a: u16,
    b: u8,
    c: u64,
    d: u32,
}

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct Renamed {
    width: u16,
    depth: u8,
    height: u64,
    weight: u32,
}

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct Tuple(i32, String);

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct Unit;

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct WithSkip {
    id: u32,
    #[postcard(skip)]
    cache: Vec<u8>,
    name: String,
}

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
enum Message {
    Quit,
    Move { x: i32, y: i32 },
    Write(String),
    Tagged(#[postcard(skip)] u8, bool),
}

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct Wrapper<T> {
    inner: Option<T>,
    items: Vec<T>,
}

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct Cached<T> {
    id: u32,
    #[postcard(skip)]
    cache: T,
}

#[derive(Debug, PartialEq, ToPostcard, FromPostcard)]
struct Nested {
    basic: BasicStruct,
    messages: Vec<Message>,
    lookup: BTreeMap<String, Tuple>,
    blob: Vec<u8>,
    fixed: [u8; 2],
}

#[test]
fn struct_tests() {
    let value = BasicStruct {
        a: 0xABCD,
        b: 0xFE,
        c: 0x1234_4321_ABCD_DCBA,
        d: 0xACAC_ACAC,
    };
    let data = emit(&value).unwrap();
    assert_eq!(data, hex!("cdd702 fe bab9b7de9ae4909a12 acd9b2e50a"));
    assert_eq!(parse_exact::<BasicStruct>(&data), Ok(value));

    for value in [
        BasicStruct { a: 0, b: 0, c: 0, d: 0 },
        BasicStruct {
            a: u16::MAX,
            b: u8::MAX,
            c: u64::MAX,
            d: u32::MAX,
        },
    ] {
        let data = emit(&value).unwrap();
        assert_eq!(parse_exact::<BasicStruct>(&data), Ok(value));
    }

    assert_eq!(emit(&Unit).unwrap(), hex!(""));
    assert_eq!(parse_exact::<Unit>(&[]), Ok(Unit));

    let tuple = Tuple(-2, String::from("ab"));
    let data = emit(&tuple).unwrap();
    assert_eq!(data, hex!("03 026162"));
    assert_eq!(parse_exact::<Tuple>(&data), Ok(tuple));
}

#[test]
fn field_names_are_not_on_the_wire() {
    let a = BasicStruct {
        a: 1,
        b: 2,
        c: 3,
        d: 4,
    };
    let data = emit(&a).unwrap();
    assert_eq!(
        data,
        emit(&Renamed {
            width: 1,
            depth: 2,
            height: 3,
            weight: 4,
        })
        .unwrap()
    );
    assert_eq!(
        parse_exact::<Renamed>(&data),
        Ok(Renamed {
            width: 1,
            depth: 2,
            height: 3,
            weight: 4,
        })
    );
}

#[test]
fn skip_tests() {
    let value = WithSkip {
        id: 7,
        cache: vec![1, 2, 3],
        name: String::from("x"),
    };
    let data = emit(&value).unwrap();
    assert_eq!(data, hex!("07 0178"));
    assert_eq!(
        parse_exact::<WithSkip>(&data),
        Ok(WithSkip {
            id: 7,
            cache: Vec::new(),
            name: String::from("x"),
        })
    );
}

#[test]
fn enum_tests() {
    assert_eq!(emit(&Message::Quit).unwrap(), hex!("00"));
    assert_eq!(emit(&Message::Move { x: 1, y: -1 }).unwrap(), hex!("01 02 01"));
    assert_eq!(
        emit(&Message::Write(String::from("hi"))).unwrap(),
        hex!("02 026869")
    );
    assert_eq!(emit(&Message::Tagged(9, true)).unwrap(), hex!("03 01"));

    assert_eq!(parse_exact::<Message>(&hex!("00")), Ok(Message::Quit));
    assert_eq!(
        parse_exact::<Message>(&hex!("01 02 01")),
        Ok(Message::Move { x: 1, y: -1 })
    );
    assert_eq!(
        parse_exact::<Message>(&hex!("03 01")),
        Ok(Message::Tagged(0, true))
    );
    assert_eq!(parse::<Message>(&hex!("04")), Err(Error::BadEnum(4)));
    assert_eq!(parse::<Message>(&hex!("8000")), Err(Error::BadVarint));
    assert_eq!(parse::<Message>(&hex!("01 02")), Err(Error::UnexpectedEnd));
}

#[test]
fn generic_tests() {
    let value = Wrapper {
        inner: Some(300u16),
        items: vec![1, 2],
    };
    let data = emit(&value).unwrap();
    assert_eq!(data, hex!("01 ac02 02 01 02"));
    assert_eq!(parse_exact::<Wrapper<u16>>(&data), Ok(value));

    // u8 items still take the bytes form
    let data = emit(&Wrapper::<u8> {
        inner: None,
        items: vec![0xaa, 0xbb],
    })
    .unwrap();
    assert_eq!(data, hex!("00 02 aabb"));
}

#[test]
fn skipped_generic_tests() {
    let value = Cached {
        id: 9,
        cache: vec![String::from("warm")],
    };
    let data = emit(&value).unwrap();
    assert_eq!(data, hex!("09"));
    assert_eq!(
        parse_exact::<Cached<Vec<String>>>(&data),
        Ok(Cached {
            id: 9,
            cache: Vec::new(),
        })
    );
}

#[test]
fn nested_round_trip() {
    let mut lookup = BTreeMap::new();
    lookup.insert(String::from("t"), Tuple(i32::MIN, String::new()));

    let value = Nested {
        basic: BasicStruct {
            a: 1,
            b: 2,
            c: 3,
            d: 4,
        },
        messages: vec![
            Message::Quit,
            Message::Move {
                x: i32::MAX,
                y: i32::MIN,
            },
            Message::Write(String::from("你好世界")),
        ],
        lookup,
        blob: vec![0, 1, 2],
        fixed: [0xde, 0xad],
    };
    let data = emit(&value).unwrap();
    let (decoded, len) = parse_detail::<Nested>(&data).unwrap();
    assert_eq!(len, data.len());
    assert_eq!(decoded, value);

    for len in 0..data.len() {
        assert_eq!(
            parse::<Nested>(&data[..len]),
            Err(Error::UnexpectedEnd),
            "prefix of {len} bytes"
        );
    }
}
