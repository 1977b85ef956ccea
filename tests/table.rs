use std::{collections::HashMap, fs::read, path::Path};
use tempfile::tempdir;
use tlextract::{
    strip_bom, ColumnProjection, CsvSink, CsvTable, NoTranslations, Table,
    TableEntry, TableExtractor,
};

fn read_csv(path: &Path) -> String {
    let bytes = read(path).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    String::from_utf8(strip_bom(&bytes).to_vec()).unwrap()
}

fn locations() -> CsvTable {
    CsvTable::parse(concat!(
        "id,location,event\n",
        "1,海,海水浴\n",
        "2,海,花火\n",
        ",山,無視\n",
        "3,Beach,ビーチ\n",
    ))
}

#[test]
fn csv_table_cells() {
    let table = CsvTable::parse("id,text\r\n1,\"a, \"\"b\"\"\nc\"\r\nx,\n");

    assert_eq!(table.rows(), 3);
    assert_eq!(table.string(1, 1), "a, \"b\"\nc");
    assert_eq!(table.integer(0, 1), 1);
    assert_eq!(table.integer(0, 2), 0);
    assert!(table.has_data(0, 2));
    assert!(!table.has_data(1, 2));
    assert!(!table.has_data(5, 5));
    assert_eq!(table.string(5, 5), "");
}

#[test]
fn csv_table_from_shift_jis() {
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("id,名前\n1,メイド\n");
    let table = CsvTable::from_bytes(&encoded);

    assert_eq!(table.string(1, 1), "メイド");
}

#[test]
fn projection_keys() {
    let table = locations();

    let by_text = ColumnProjection::new([(1, "場所名/")]);
    assert_eq!(
        by_text.project(&table, 1).to_vec(),
        [TableEntry::new("場所名/海", "海")]
    );

    let by_id = ColumnProjection::new([(2, "イベント名/")]).keyed_by(0);
    assert_eq!(
        by_id.project(&table, 2).to_vec(),
        [TableEntry::new("イベント名/2", "花火")]
    );
}

#[test]
fn identical_keys_are_written_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SceneTest.csv");

    let mut sink = CsvSink::create(&path).unwrap();
    let written = TableExtractor::new(&NoTranslations, false)
        .extract_columns(
            &mut sink,
            &locations(),
            "SceneTest",
            &ColumnProjection::new([(1, "場所名/")]),
        )
        .unwrap();
    sink.finish().unwrap();

    assert_eq!(written, 2);
    assert_eq!(
        read_csv(&path),
        concat!(
            "Key,Type,Desc,Japanese,English\n",
            "\"場所名/海\",Text,,\"海\",\n",
            "\"場所名/Beach\",Text,,\"Beach\",\n",
        )
    );
}

#[test]
fn translated_and_non_japanese_rows_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SceneTest.csv");

    let translations = HashMap::from([(
        "SceneTest/イベント名/1".to_owned(),
        "Sea bathing".to_owned(),
    )]);

    let mut sink = CsvSink::create(&path).unwrap();
    TableExtractor::new(&translations, true)
        .extract_columns(
            &mut sink,
            &locations(),
            "SceneTest",
            &ColumnProjection::new([(1, "場所名/"), (2, "イベント名/")]).keyed_by(0),
        )
        .unwrap();
    sink.finish().unwrap();

    assert_eq!(
        read_csv(&path),
        concat!(
            "Key,Type,Desc,Japanese,English\n",
            "\"場所名/1\",Text,,\"海\",\n",
            "\"場所名/2\",Text,,\"海\",\n",
            "\"イベント名/2\",Text,,\"花火\",\n",
            "\"イベント名/3\",Text,,\"ビーチ\",\n",
        )
    );
}

#[test]
fn without_skipping_everything_is_kept() {
    let translations = HashMap::from([("SceneTest/場所名/海".to_owned(), "Sea".to_owned())]);
    let extractor = TableExtractor::new(&translations, false);

    assert!(!extractor.is_skipped("SceneTest", "場所名/海", "海"));
    assert!(!extractor.is_skipped("SceneTest", "場所名/Beach", "Beach"));
}

#[test]
fn keys_are_normalized_and_texts_escaped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Test.csv");
    let table = CsvTable::parse("id,name\n1,\"A×B, \"\"C\"\"\"\n2,\n");

    let mut sink = CsvSink::create(&path).unwrap();
    TableExtractor::new(&NoTranslations, false)
        .extract(&mut sink, &table, "Test", |table, row| {
            let name = table.string(1, row);
            [TableEntry::new(format!("名前/{name}"), name)].into_iter().collect()
        })
        .unwrap();
    sink.finish().unwrap();

    assert_eq!(
        read_csv(&path),
        concat!(
            "Key,Type,Desc,Japanese,English\n",
            "\"名前/A_B, \"\"C\"\"\",Text,,\"A×B, \"\"C\"\"\",\n",
        )
    );
}

#[test]
fn plain_entries_and_separators() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("skirt.csv");

    let mut sink = CsvSink::create(&path).unwrap();
    sink.write_plain_entry("skirt_a|name", "スカート", "スカート").unwrap();
    sink.write_line("----------------ROOMS----------------,,,,").unwrap();
    sink.write_plain_entry("skirt_a|info", "長い, 説明", "").unwrap();
    assert_eq!(sink.finish().unwrap(), path);

    assert_eq!(
        read_csv(&path),
        concat!(
            "Key,Type,Desc,Japanese,English\n",
            "skirt_a|name,Text,,スカート,スカート\n",
            "----------------ROOMS----------------,,,,\n",
            "skirt_a|info,Text,,\"長い, 説明\",\n",
        )
    );
}
