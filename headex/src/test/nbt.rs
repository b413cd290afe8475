use super::builder::Builder;
use crate::nbt::{from_reader, CompoundMap, Tag, Value};
use crate::Error;

fn decode(data: &[u8]) -> crate::Result<Value> {
    from_reader(data)
}

#[test]
fn simple_compound_round_trips() {
    let payload = Builder::new()
        .start_compound("root")
        .byte("b", -1)
        .short("s", -300)
        .int("n", 123_456)
        .long("l", 0x1122_3344_5566_7788)
        .double("d", 1.5)
        .string("greeting", "hello")
        .end_compound()
        .build();

    let mut expected = CompoundMap::new();
    expected.insert("b".to_owned(), Value::Byte(-1));
    expected.insert("s".to_owned(), Value::Short(-300));
    expected.insert("n".to_owned(), Value::Int(123_456));
    expected.insert("l".to_owned(), Value::Long(0x1122_3344_5566_7788));
    expected.insert("d".to_owned(), Value::Double(1.5));
    expected.insert("greeting".to_owned(), Value::String("hello".to_owned()));

    assert_eq!(decode(&payload).unwrap(), Value::Compound(expected));
}

#[test]
fn compound_child_order_is_preserved() {
    let payload = Builder::new()
        .start_compound("")
        .int("z", 1)
        .int("a", 2)
        .int("m", 3)
        .end_compound()
        .build();

    match decode(&payload).unwrap() {
        Value::Compound(compound) => {
            let keys: Vec<_> = compound.keys().map(String::as_str).collect();
            assert_eq!(keys, ["z", "a", "m"]);
        }
        v => panic!("expected compound, got {:?}", v),
    }
}

#[test]
fn root_name_is_discarded() {
    let named = Builder::new()
        .start_compound("level")
        .int("n", 7)
        .end_compound()
        .build();
    let anonymous = Builder::new()
        .start_compound("")
        .int("n", 7)
        .end_compound()
        .build();

    assert_eq!(decode(&named).unwrap(), decode(&anonymous).unwrap());
}

#[test]
fn non_compound_root() {
    let payload = Builder::new().string("motd", "hi").build();
    assert_eq!(decode(&payload).unwrap(), Value::String("hi".to_owned()));
}

#[test]
fn list_of_compounds() {
    let payload = Builder::new()
        .start_compound("")
        .start_list("textures", Tag::Compound, 1)
        .start_anon_compound()
        .string("Value", "abc")
        .end_anon_compound()
        .end_compound()
        .build();

    let mut texture = CompoundMap::new();
    texture.insert("Value".to_owned(), Value::String("abc".to_owned()));
    let mut expected = CompoundMap::new();
    expected.insert(
        "textures".to_owned(),
        Value::List(Tag::Compound, vec![Value::Compound(texture)]),
    );

    assert_eq!(decode(&payload).unwrap(), Value::Compound(expected));
}

#[test]
fn arrays_round_trip() {
    let payload = Builder::new()
        .start_compound("")
        .byte_array("bytes", &[-1, 0, 1])
        .int_array("ints", &[i32::MIN, 0, i32::MAX])
        .long_array("longs", &[i64::MIN, 0, i64::MAX])
        .end_compound()
        .build();

    let mut expected = CompoundMap::new();
    expected.insert("bytes".to_owned(), Value::ByteArray(vec![-1, 0, 1]));
    expected.insert(
        "ints".to_owned(),
        Value::IntArray(vec![i32::MIN, 0, i32::MAX]),
    );
    expected.insert(
        "longs".to_owned(),
        Value::LongArray(vec![i64::MIN, 0, i64::MAX]),
    );

    assert_eq!(decode(&payload).unwrap(), Value::Compound(expected));
}

#[test]
fn empty_list_of_end_is_fine() {
    // the game writes empty lists with an End element tag
    let payload = Builder::new()
        .start_compound("")
        .start_list("empty", Tag::End, 0)
        .end_compound()
        .build();

    let mut expected = CompoundMap::new();
    expected.insert("empty".to_owned(), Value::List(Tag::End, vec![]));

    assert_eq!(decode(&payload).unwrap(), Value::Compound(expected));
}

#[test]
fn non_empty_list_of_end_errors() {
    let payload = Builder::new()
        .start_compound("")
        .start_list("bad", Tag::End, 1)
        .end_compound()
        .build();

    assert!(matches!(decode(&payload), Err(Error::InvalidListTag)));
}

#[test]
fn negative_list_size_errors() {
    let payload = Builder::new()
        .start_compound("")
        .start_list("bad", Tag::Byte, -1)
        .end_compound()
        .build();

    assert!(matches!(decode(&payload), Err(Error::InvalidListTag)));
}

#[test]
fn invalid_tag_id_errors() {
    let payload = Builder::new().raw_bytes(&[13, 0, 0]).build();
    assert!(matches!(decode(&payload), Err(Error::InvalidTag(13))));
}

#[test]
fn end_as_root_errors() {
    let payload = Builder::new().raw_bytes(&[0]).build();
    assert!(matches!(decode(&payload), Err(Error::InvalidTag(0))));
}

#[test]
fn truncated_string_errors() {
    // string declares ten bytes of payload and provides none
    let payload = Builder::new()
        .tag(Tag::String)
        .name("s")
        .raw_bytes(&[0, 10])
        .build();

    assert!(matches!(decode(&payload), Err(Error::Io(_))));
}

#[test]
fn truncated_compound_errors() {
    let payload = Builder::new().start_compound("").int("n", 7).build();
    assert!(matches!(decode(&payload), Err(Error::Io(_))));
}

#[test]
fn nonunicode_string_errors() {
    let payload = Builder::new()
        .tag(Tag::String)
        .name("s")
        .raw_bytes(&[0, 1, 0xFF])
        .build();

    assert!(matches!(decode(&payload), Err(Error::NonunicodeString)));
}

#[test]
fn deep_nesting_hits_the_depth_limit() {
    let mut b = Builder::new().tag(Tag::List).name("deep");
    for _ in 0..600 {
        b = b.start_anon_list(Tag::List, 1);
    }
    let payload = b.start_anon_list(Tag::End, 0).build();

    assert!(matches!(decode(&payload), Err(Error::DepthLimit)));
}
