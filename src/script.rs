use crate::{
    constants::{
        localization::{COULD_NOT_EXTRACT_TEXT_MSG, MALFORMED_DIRECTIVE_MSG},
        *,
    },
    functions::{decode_shift_jis, split_translation},
    game::GameFileSystem,
    tag::{parse_directive, starts_with_directive},
    types::{AttributeMap, BilingualLine, Error, SubtitleRecord},
};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use regex::Regex;
use std::{collections::VecDeque, path::Path, sync::LazyLock};

static TEXT_ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)text="((?:[^"\\]|\\.)*)""#).unwrap()
});

/// A `.ks` script: its name and content lines, trimmed, without comments and blank lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDocument {
    pub name: String,
    pub lines: Vec<String>,
}

impl ScriptDocument {
    #[must_use]
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_owned(),
            lines: content_lines(content).map(str::to_owned).collect(),
        }
    }

    /// Decodes a Shift-JIS script.
    #[must_use]
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Self {
        Self::new(name, &decode_shift_jis(bytes))
    }

    /// File name without directories, e.g. `a0001.ks`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name)
    }

    /// File name without directories and extension, e.g. `a0001`.
    #[must_use]
    pub fn stem(&self) -> &str {
        Path::new(self.file_name())
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .filter(|line| !line.starts_with(COMMENT_PREFIX))
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// One translatable unit found in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRecord {
    /// Dialogue between `@talk` and the next directive.
    Talk(BilingualLine),
    /// `text` of a `@ChoicesSet`, `@VRChoicesSet` or `@YotogiMessage`.
    Choice(BilingualLine),
    /// A subtitle that got its voice assigned by `@PlayVoice`.
    Subtitle(SubtitleRecord),
}

impl ScriptRecord {
    #[must_use]
    pub fn line(&self) -> Option<&BilingualLine> {
        match self {
            Self::Talk(line) | Self::Choice(line) => Some(line),
            Self::Subtitle(_) => None,
        }
    }
}

/// Everything extracted from one script.
#[derive(Debug, Default, Clone)]
pub struct ParsedScript {
    pub records: Vec<ScriptRecord>,
    /// Speaker names, source to inline translation.
    pub npc_names: IndexMap<String, String>,
    /// Subtitle scripts loaded by `@LoadSubtitleFile`, which must not be extracted on their own.
    pub companion_files: Vec<String>,
    /// Lines that came with an inline translation.
    pub translated_lines: usize,
}

impl ParsedScript {
    /// Talk and choice lines with a non-empty source, first occurrence of each source only.
    pub fn unique_lines(&self) -> impl Iterator<Item = &BilingualLine> {
        let mut seen: IndexSet<&str> = IndexSet::new();

        self.records.iter().filter_map(move |record| {
            let line = record.line()?;
            (!line.source.is_empty() && seen.insert(line.source.as_str()))
                .then_some(line)
        })
    }

    /// Unique source strings, in script order.
    #[must_use]
    pub fn source_strings(&self) -> Vec<String> {
        self.unique_lines().map(|line| line.source.clone()).collect()
    }

    /// Lines of the per-script `.txt` output: `source\ttranslation` for dialogue and choices,
    /// `@VoiceSubtitle{json}` for subtitles, in script order.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] - if a subtitle can't be serialized.
    pub fn text_lines(&self) -> Result<IndexSet<String>, Error> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut lines: IndexSet<String> = IndexSet::new();

        for record in &self.records {
            match record {
                ScriptRecord::Talk(line) | ScriptRecord::Choice(line) => {
                    if !line.source.is_empty()
                        && seen.insert(line.source.as_str())
                    {
                        lines.insert(line.to_tab_line());
                    }
                }
                ScriptRecord::Subtitle(subtitle) => {
                    lines.insert(format!(
                        "{VOICE_SUBTITLE_TAG}{}",
                        serde_json::to_string(subtitle)?
                    ));
                }
            }
        }

        Ok(lines)
    }
}

/// Parses a subtitle companion script: `@talk[start-end]` blocks closed by `@hitret`.
///
/// Blocks with malformed timings are skipped. Voices aren't assigned yet.
#[must_use]
pub fn parse_subtitle_file(content: &str) -> Vec<SubtitleRecord> {
    let mut subtitles = Vec::new();
    let mut buffer = String::new();
    let mut timing: Option<(i32, i32)> = None;
    let mut capturing = false;

    for line in content_lines(content) {
        if starts_with_directive(line, TALK) {
            timing = parse_timing(&line[TALK.len()..])
                .and_then(|(start, end)| Some((start, end.checked_sub(start)?)));

            if timing.is_none() {
                warn!("{MALFORMED_DIRECTIVE_MSG}: {line}");
            }

            capturing = true;
            buffer.clear();
        } else if starts_with_directive(line, HITRET) && capturing {
            capturing = false;

            if let Some((start, duration)) = timing.take() {
                subtitles.push(SubtitleRecord {
                    start_time: start,
                    display_time: duration,
                    ..SubtitleRecord::from_line(split_translation(&buffer))
                });
            }

            buffer.clear();
        } else if capturing {
            buffer.push_str(line);
        }
    }

    subtitles
}

/// `[start-end]` to `(start, end)`.
fn parse_timing(range: &str) -> Option<(i32, i32)> {
    let range = range.trim_matches(['[', ']', ' ']);
    let (start, end) = range.split_once('-')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

fn parse_int_attribute(tag: &AttributeMap, key: &str, default: i32) -> Option<i32> {
    tag.get(key).map_or(Some(default), |value| value.trim().parse().ok())
}

/// Builds the subtitle of a `@SubtitleDisplayForPlayVoice` directive. `None` if `text` is missing or a time isn't a number.
fn play_subtitle(tag: &AttributeMap) -> Option<SubtitleRecord> {
    let text = tag.get("text")?;

    Some(SubtitleRecord {
        add_display_time: parse_int_attribute(tag, "addtime", 0)?,
        display_time: parse_int_attribute(tag, "wait", -1)?,
        is_casino: tag.contains_key("mode_c"),
        ..SubtitleRecord::from_line(split_translation(text))
    })
}

#[derive(Default)]
struct ScriptState {
    /// Dialogue accumulated since `@talk`; `Some` while capturing.
    talk: Option<String>,
    /// Subtitle waiting for its `@PlayVoice`.
    pending_subtitle: Option<SubtitleRecord>,
    /// Subtitles from companion files, assigned to voices in order.
    subtitle_queue: VecDeque<SubtitleRecord>,
    parsed: ParsedScript,
}

impl ScriptState {
    fn push_line(&mut self, line: BilingualLine, choice: bool, trace: bool) {
        if line.has_translation() {
            self.parsed.translated_lines += 1;
        }

        if trace {
            if !line.source.is_empty() {
                debug!("\t\tJP:{}", line.source);
            }

            if !line.translation.is_empty() {
                debug!("\t\t\u{21B3} ENG:{}", line.translation);
            }
        }

        self.parsed.records.push(if choice {
            ScriptRecord::Choice(line)
        } else {
            ScriptRecord::Talk(line)
        });
    }

    fn flush_talk(&mut self, trace: bool) {
        if let Some(buffer) = self.talk.take() {
            self.push_line(split_translation(&buffer), false, trace);
        }
    }
}

/// The script state machine. Recognizes dialogue blocks, choices and subtitles.
///
/// # Example
///
/// ```
/// use tlextract::{ScriptDocument, ScriptParser};
///
/// let document = ScriptDocument::new(
///     "a.ks",
///     "@talk name=\"Alice<e>Alice\"\nHello<e>Hi\n@hitret",
/// );
/// let parsed = ScriptParser::new().parse(&document).unwrap();
///
/// assert_eq!(parsed.npc_names["Alice"], "Alice");
/// assert_eq!(parsed.source_strings(), ["Hello"]);
/// ```
#[derive(Default, Clone, Copy)]
pub struct ScriptParser<'a> {
    file_system: Option<&'a dyn GameFileSystem>,
    trace: bool,
}

impl<'a> ScriptParser<'a> {
    /// Creates a parser that ignores `@LoadSubtitleFile`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads subtitle companion files from `file_system`.
    #[must_use]
    pub fn subtitle_files(mut self, file_system: &'a dyn GameFileSystem) -> Self {
        self.file_system = Some(file_system);
        self
    }

    /// Logs every extracted dialogue line at debug level.
    #[must_use]
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Runs the state machine over the document.
    ///
    /// A dialogue block still open at the end of the document is emitted.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFile`] - if a subtitle companion file doesn't exist.
    pub fn parse(&self, document: &ScriptDocument) -> Result<ParsedScript, Error> {
        let mut state = ScriptState::default();

        for line in &document.lines {
            if let Some(buffer) = state.talk.as_mut() {
                if !line.starts_with(DIRECTIVE_PREFIX) {
                    buffer.push_str(line);
                    continue;
                }

                state.flush_talk(self.trace);
            }

            if starts_with_directive(line, LOAD_SUBTITLE_FILE) {
                self.load_subtitle_file(&mut state, line)?;
            } else if starts_with_directive(line, SUBTITLE_DISPLAY_FOR_PLAY_VOICE)
            {
                let tag = parse_directive(line, SUBTITLE_DISPLAY_FOR_PLAY_VOICE);

                match play_subtitle(&tag) {
                    Some(subtitle) => state.pending_subtitle = Some(subtitle),
                    None => {
                        state.pending_subtitle = None;
                        warn!("{MALFORMED_DIRECTIVE_MSG}: {line}");
                    }
                }
            } else if starts_with_directive(line, PLAY_VOICE) {
                let voice = parse_directive(line, PLAY_VOICE).swap_remove("voice");

                if let Some(mut subtitle) = state.pending_subtitle.take() {
                    if let Some(voice) = voice {
                        subtitle.voice_id = voice;
                        state.parsed.records.push(ScriptRecord::Subtitle(subtitle));
                    }
                } else if let Some(voice) = voice {
                    if let Some(mut subtitle) = state.subtitle_queue.pop_front() {
                        subtitle.voice_id = voice;
                        state.parsed.records.push(ScriptRecord::Subtitle(subtitle));
                    }
                }
            } else if starts_with_directive(line, TALK) {
                state.talk = Some(String::new());
                capture_name(&mut state, line);
            } else if MESSAGE_DIRECTIVES
                .iter()
                .any(|directive| starts_with_directive(line, directive))
            {
                match TEXT_ATTRIBUTE_RE.captures(line) {
                    Some(captures) => {
                        state.push_line(split_translation(&captures[1]), true, self.trace);
                    }
                    None => warn!("{COULD_NOT_EXTRACT_TEXT_MSG} \"{line}\""),
                }
            }
        }

        if state.talk.as_ref().is_some_and(|buffer| !buffer.is_empty()) {
            state.flush_talk(self.trace);
        }

        Ok(state.parsed)
    }

    fn load_subtitle_file(&self, state: &mut ScriptState, line: &str) -> Result<(), Error> {
        let Some(file_system) = self.file_system else {
            return Ok(());
        };

        let tag = parse_directive(line, LOAD_SUBTITLE_FILE);
        let Some(file) = tag.get("file") else {
            warn!("{MALFORMED_DIRECTIVE_MSG}: {line}");
            return Ok(());
        };

        let bytes = file_system.read_file(&format!("{file}{SCRIPT_EXTENSION}"))?;
        state
            .subtitle_queue
            .extend(parse_subtitle_file(&decode_shift_jis(&bytes)));
        state.parsed.companion_files.push(file.clone());

        Ok(())
    }
}

fn capture_name(state: &mut ScriptState, line: &str) {
    let tag = parse_directive(line, TALK);
    let Some(name) = tag.get("name") else {
        return;
    };

    let name = split_translation(name);

    if name.source.is_empty()
        || FRONT_MATTER_PREFIXES
            .iter()
            .any(|prefix| name.source.starts_with(prefix))
    {
        return;
    }

    state.parsed.npc_names.insert(name.source, name.translation);
}
