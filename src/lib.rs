//!Library extracting translatable text from COM3D2 game data: story scripts, `.nei` tables and `.menu` items.

mod constants;
mod datasets;
mod functions;
mod processors;

pub mod game;
pub mod menu;
pub mod script;
pub mod table;
pub mod tag;
pub mod types;
pub mod ui_fixes;

pub use functions::{
    contains_japanese, decode_shift_jis, escape_csv_item, quote_csv_item,
    split_translation, strip_bom, write_with_bom,
};
pub use game::{
    DirectoryFileSystem, GameFileSystem, LanguageSource, MemoryFileSystem,
    MemoryLanguageSource, NoTranslations, TranslationLookup,
};
pub use menu::{BinaryReader, MenuHeader};
pub use processors::{
    DumpReport, DumpSession, DumpTask, Dumper, DumperBuilder, GameContext,
};
pub use script::{
    ParsedScript, ScriptDocument, ScriptParser, ScriptRecord,
    parse_subtitle_file,
};
pub use table::{
    ColumnProjection, CsvSink, CsvTable, Table, TableEntry, TableExtractor,
    split_csv,
};
pub use tag::{parse_directive, parse_tag, starts_with_directive};
pub use types::{
    AttributeMap, BilingualLine, Dataset, DumpFlags, DumpOptions, Error,
    SubtitleRecord,
};
pub use ui_fixes::{
    GameInfo, ToggleTerms, localize_info_text, netorare_check_terms,
    netorare_check_toggles,
};
