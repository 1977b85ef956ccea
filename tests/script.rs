use tlextract::{
    parse_subtitle_file, BilingualLine, Error, MemoryFileSystem, ScriptDocument,
    ScriptParser, ScriptRecord, SubtitleRecord,
};

fn parse(content: &str) -> tlextract::ParsedScript {
    ScriptParser::new()
        .parse(&ScriptDocument::new("test.ks", content))
        .unwrap()
}

fn talk(source: &str, translation: &str) -> ScriptRecord {
    ScriptRecord::Talk(BilingualLine::new(source, translation))
}

fn choice(source: &str, translation: &str) -> ScriptRecord {
    ScriptRecord::Choice(BilingualLine::new(source, translation))
}

#[test]
fn document_lines() {
    let document = ScriptDocument::new(
        "scenario/a0001.ks",
        ";comment\r\n  @talk  \r\n\r\nこんにちは\r\n",
    );

    assert_eq!(document.lines, ["@talk", "こんにちは"]);
    assert_eq!(document.file_name(), "a0001.ks");
    assert_eq!(document.stem(), "a0001");
}

#[test]
fn named_talk() {
    let parsed = parse("@talk name=\"Alice<e>Alice\"\nHello<e>Hi\n@hitret");

    assert_eq!(parsed.npc_names.len(), 1);
    assert_eq!(parsed.npc_names["Alice"], "Alice");
    assert_eq!(parsed.records, [talk("Hello", "Hi")]);
    assert_eq!(parsed.translated_lines, 1);
}

#[test]
fn multi_line_talk_is_merged() {
    let parsed = parse("@talk\nおはよう\nございます\nご主人様\n@hitret");

    assert_eq!(parsed.records, [talk("おはようございますご主人様", "")]);
}

#[test]
fn comments_inside_talk_are_ignored() {
    let parsed = parse("@talk\nおはよう\n;注釈\nございます\n@hitret");

    assert_eq!(parsed.records, [talk("おはようございます", "")]);
}

#[test]
fn front_matter_names_are_not_recorded() {
    let parsed = parse("@talk name=[HF]\nあ\n@hitret\n@talk name=[SF1]\nい\n@hitret");

    assert!(parsed.npc_names.is_empty());
    assert_eq!(parsed.records.len(), 2);
}

#[test]
fn any_directive_closes_talk() {
    let parsed = parse("@talk\nあ\n@ChoicesSet text=\"はい<e>Yes\" label=*a");

    assert_eq!(parsed.records, [talk("あ", ""), choice("はい", "Yes")]);
}

#[test]
fn open_talk_is_flushed_at_end() {
    let parsed = parse("@talk\n最後の台詞");

    assert_eq!(parsed.records, [talk("最後の台詞", "")]);
}

#[test]
fn message_directives() {
    let parsed = parse(concat!(
        "@ChoicesSet text=\"はい\" label=*yes\n",
        "@VRChoicesSet text=\"いいえ<e>No\"\n",
        "@YotogiMessage text=\"もっと…<e>More…\"\n",
        "@ChoicesSet label=*no\n",
    ));

    assert_eq!(
        parsed.records,
        [
            choice("はい", ""),
            choice("いいえ", "No"),
            choice("もっと…", "More...")
        ]
    );
}

#[test]
fn source_strings_are_unique() {
    let parsed = parse("@talk\nあ\n@hitret\n@talk\nあ<e>A\n@hitret\n@ChoicesSet text=\"あ\"\n@talk\n@hitret");

    assert_eq!(parsed.source_strings(), ["あ"]);
    assert_eq!(parsed.text_lines().unwrap().len(), 1);
}

#[test]
fn subtitle_for_play_voice() {
    let parsed = parse(concat!(
        "@SubtitleDisplayForPlayVoice text=\"字幕<e>Sub\" addtime=100 wait=2000 mode_c\n",
        "@PlayVoice voice=H0_001\n",
    ));

    let expected = SubtitleRecord {
        add_display_time: 100,
        display_time: 2000,
        is_casino: true,
        source: "字幕".to_owned(),
        start_time: 0,
        translation: "Sub".to_owned(),
        voice_id: "H0_001".to_owned(),
    };

    assert_eq!(parsed.records, [ScriptRecord::Subtitle(expected)]);

    let lines = parsed.text_lines().unwrap();
    assert_eq!(
        lines.first().unwrap(),
        r#"@VoiceSubtitle{"addDisplayTime":100,"displayTime":2000,"isCasino":true,"original":"字幕","startTime":0,"translation":"Sub","voice":"H0_001"}"#
    );
}

#[test]
fn subtitle_defaults() {
    let parsed = parse("@SubtitleDisplayForPlayVoice text=\"字幕\"\n@PlayVoice voice=v");

    let ScriptRecord::Subtitle(subtitle) = &parsed.records[0] else {
        panic!("expected a subtitle");
    };

    assert_eq!(subtitle.add_display_time, 0);
    assert_eq!(subtitle.display_time, -1);
    assert!(!subtitle.is_casino);
}

#[test]
fn play_voice_without_voice_discards_subtitle() {
    let parsed = parse(concat!(
        "@SubtitleDisplayForPlayVoice text=\"字幕\"\n",
        "@PlayVoice\n",
        "@PlayVoice voice=H0_002\n",
    ));

    assert!(parsed.records.is_empty());
}

#[test]
fn malformed_subtitle_is_skipped() {
    let parsed = parse(concat!(
        "@SubtitleDisplayForPlayVoice wait=100\n",
        "@SubtitleDisplayForPlayVoice text=\"字幕\" wait=abc\n",
        "@PlayVoice voice=H0_001\n",
    ));

    assert!(parsed.records.is_empty());
}

#[test]
fn malformed_subtitle_drops_pending_one() {
    let parsed = parse(concat!(
        "@SubtitleDisplayForPlayVoice text=\"古い字幕\"\n",
        "@SubtitleDisplayForPlayVoice wait=abc\n",
        "@PlayVoice voice=H0_001\n",
    ));

    assert!(parsed.records.is_empty());
}

#[test]
fn subtitle_file_grammar() {
    let subtitles = parse_subtitle_file(concat!(
        "@talk[0-1500]\n",
        "一行目<e>Line one\n",
        "@hitret\n",
        "@talk[abc]\n",
        "壊れた\n",
        "@hitret\n",
        "@talk[2147483647--2147483648]\n",
        "あふれ\n",
        "@hitret\n",
        "@talk [1500-4000]\n",
        "二行\n",
        "目\n",
        "@hitret\n",
    ));

    assert_eq!(subtitles.len(), 2);
    assert_eq!(subtitles[0].source, "一行目");
    assert_eq!(subtitles[0].translation, "Line one");
    assert_eq!(subtitles[0].start_time, 0);
    assert_eq!(subtitles[0].display_time, 1500);
    assert_eq!(subtitles[1].source, "二行目");
    assert_eq!(subtitles[1].start_time, 1500);
    assert_eq!(subtitles[1].display_time, 2500);
    assert!(subtitles.iter().all(|s| s.voice_id.is_empty()));
}

#[test]
fn companion_subtitles_get_voices_in_order() {
    let mut files = MemoryFileSystem::new();
    files.insert_script(
        "sub/sub_a.ks",
        "@talk[0-1500]\n字幕一<e>One\n@hitret\n@talk[1500-3000]\n字幕二\n@hitret\n",
    );

    let document = ScriptDocument::new(
        "a.ks",
        "@LoadSubtitleFile file=sub_a\n@PlayVoice\n@PlayVoice voice=v1\n@PlayVoice voice=v2\n@PlayVoice voice=v3",
    );
    let parsed = ScriptParser::new()
        .subtitle_files(&files)
        .parse(&document)
        .unwrap();

    assert_eq!(parsed.companion_files, ["sub_a"]);

    let subtitles: Vec<&SubtitleRecord> = parsed
        .records
        .iter()
        .filter_map(|record| match record {
            ScriptRecord::Subtitle(subtitle) => Some(subtitle),
            _ => None,
        })
        .collect();

    assert_eq!(subtitles.len(), 2);
    assert_eq!(subtitles[0].voice_id, "v1");
    assert_eq!(subtitles[0].source, "字幕一");
    assert_eq!(subtitles[0].translation, "One");
    assert_eq!(subtitles[1].voice_id, "v2");
    assert_eq!(subtitles[1].start_time, 1500);
}

#[test]
fn missing_companion_file_fails_the_script() {
    let files = MemoryFileSystem::new();
    let document = ScriptDocument::new("a.ks", "@LoadSubtitleFile file=missing");

    let err = ScriptParser::new()
        .subtitle_files(&files)
        .parse(&document)
        .unwrap_err();

    assert!(matches!(err, Error::MissingFile(ref name) if name == "missing.ks"));
}

#[test]
fn companion_files_are_ignored_without_file_system() {
    let parsed = parse("@LoadSubtitleFile file=missing\n@PlayVoice voice=v1");

    assert!(parsed.records.is_empty());
    assert!(parsed.companion_files.is_empty());
}
