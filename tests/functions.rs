use encoding_rs::SHIFT_JIS;
use tlextract::{
    contains_japanese, decode_shift_jis, escape_csv_item, quote_csv_item,
    split_csv, split_translation, strip_bom, BilingualLine,
};

#[test]
fn split_with_marker() {
    assert_eq!(
        split_translation("日本語<e>English"),
        BilingualLine::new("日本語", "English")
    );
}

#[test]
fn split_without_marker() {
    assert_eq!(
        split_translation("OnlySource"),
        BilingualLine::new("OnlySource", "")
    );
}

#[test]
fn split_normalizes_ellipsis() {
    assert_eq!(split_translation("A<e>B…C").translation, "B...C");
}

#[test]
fn split_trims_both_sides() {
    assert_eq!(
        split_translation("  あ <e>  b  "),
        BilingualLine::new("あ", "b")
    );
}

#[test]
fn split_marker_is_case_insensitive() {
    assert_eq!(
        split_translation("あ<E>b"),
        BilingualLine::new("あ", "b")
    );
}

#[test]
fn split_strips_stray_markers() {
    assert_eq!(split_translation("あ<e>b<E><E>c").translation, "bc");
}

#[test]
fn split_ignores_leading_marker() {
    let line = split_translation("<e>abc");

    assert_eq!(line.source, "<e>abc");
    assert!(!line.has_translation());
}

#[test]
fn escape() {
    assert_eq!(escape_csv_item("a,b"), "\"a,b\"");
    assert_eq!(escape_csv_item("plain"), "plain");
    assert_eq!(escape_csv_item("has\"quote"), "\"has\"\"quote\"");
    assert_eq!(escape_csv_item("two\nlines"), "\"two\nlines\"");
}

#[test]
fn quote_always_wraps() {
    assert_eq!(quote_csv_item("plain"), "\"plain\"");
    assert_eq!(quote_csv_item("a,b"), "\"a,b\"");
}

#[test]
fn escape_then_split_recovers_input() {
    for item in ["plain", "a,b", "has\"quote", "two\nlines", "\"\",,\n"] {
        let escaped = escape_csv_item(item);
        assert_eq!(split_csv(&escaped), vec![vec![item.to_owned()]], "{item}");
    }
}

#[test]
fn trailing_carriage_return_survives_a_line() {
    let item = "行末\r";
    let line = format!("{},{}\n", escape_csv_item(item), escape_csv_item("次"));

    assert_eq!(split_csv(&line), vec![vec![item.to_owned(), "次".to_owned()]]);
}

#[test]
fn japanese_detection() {
    assert!(contains_japanese("こんにちは"));
    assert!(contains_japanese("カタカナ"));
    assert!(contains_japanese("漢字"));
    assert!(contains_japanese("Mixed テキスト"));
    assert!(!contains_japanese("Hello, world!"));
    assert!(!contains_japanese(""));
}

#[test]
fn shift_jis_decoding() {
    let (encoded, _, _) = SHIFT_JIS.encode("@talk name=メイド");
    assert_eq!(decode_shift_jis(&encoded), "@talk name=メイド");
}

#[test]
fn bom_stripping() {
    assert_eq!(strip_bom(b"\xEF\xBB\xBFabc"), b"abc");
    assert_eq!(strip_bom(b"abc"), b"abc");
}
