use tlextract::{BinaryReader, Error, MenuHeader};

fn push_string(bytes: &mut Vec<u8>, value: &str) {
    let mut len = value.len();

    while len >= 0x80 {
        bytes.push((len as u8) | 0x80);
        len >>= 7;
    }

    bytes.push(len as u8);
    bytes.extend_from_slice(value.as_bytes());
}

fn menu(name: &str, category: &str, info: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    push_string(&mut bytes, "CM3D2_MENU");
    bytes.extend_from_slice(&1000i32.to_le_bytes());
    push_string(&mut bytes, "menu/dress/skirt_a.txt");
    push_string(&mut bytes, name);
    push_string(&mut bytes, category);
    push_string(&mut bytes, info);
    bytes
}

#[test]
fn header_fields() {
    let data = menu("スカート", "Skirt", "ふわふわのスカート");
    let header = MenuHeader::parse("skirt_a.menu", &data).unwrap();

    assert_eq!(header.magic, "CM3D2_MENU");
    assert_eq!(header.version, 1000);
    assert_eq!(header.path, "menu/dress/skirt_a.txt");
    assert_eq!(header.name, "スカート");
    assert_eq!(header.category, "skirt");
    assert_eq!(header.info, "ふわふわのスカート");
}

#[test]
fn long_strings_use_multi_byte_lengths() {
    let info = "説".repeat(100);
    let data = menu("名前", "wear", &info);

    assert_eq!(MenuHeader::parse("a.menu", &data).unwrap().info, info);
}

#[test]
fn seven_bit_lengths() {
    let mut reader = BinaryReader::new(&[0xC8, 0x01, 0x05]);

    assert_eq!(reader.read_7bit_encoded_int(), Some(200));
    assert_eq!(reader.read_7bit_encoded_int(), Some(5));
    assert_eq!(reader.read_7bit_encoded_int(), None);
    assert_eq!(reader.position(), 3);
}

#[test]
fn little_endian_integers() {
    let mut reader = BinaryReader::new(&[0x01, 0x02, 0x00, 0x00, 0xFF]);

    assert_eq!(reader.read_i32(), Some(0x0201));
    assert_eq!(reader.position(), 4);
    assert_eq!(reader.read_i32(), None);
}

#[test]
fn truncated_header() {
    let mut data = menu("スカート", "Skirt", "説明");
    data.truncate(data.len() - 2);

    let err = MenuHeader::parse("skirt_a.menu", &data).unwrap_err();
    assert!(matches!(err, Error::MalformedMenu { ref file, .. } if file == "skirt_a.menu"));
}

#[test]
fn empty_data() {
    assert!(matches!(
        MenuHeader::parse("empty.menu", &[]),
        Err(Error::MalformedMenu { .. })
    ));
}
