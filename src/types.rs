use bitflags::bitflags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::{io, path::PathBuf, str::FromStr};
use strum_macros::{Display, EnumIs};
use thiserror::Error;

/// Attribute name to attribute value, as produced by [`crate::parse_tag`].
///
/// Bare flags are stored with the value `"true"`.
pub type AttributeMap = IndexMap<String, String>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: IO error occurred: {1}")]
    Io(PathBuf, io::Error),
    #[error("{0}: file doesn't exist in the game data")]
    MissingFile(String),
    #[error("{file}: malformed .menu header: {reason}")]
    MalformedMenu { file: String, reason: String },
    #[error("Serializing JSON data failed with: {0}")]
    Json(#[from] serde_json::Error),
    #[error("A dump is already in progress.")]
    Busy,
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(into = "u16", try_from = "u16")]
    /// Selects which datasets a dump extracts. One flag per toggle of the in-game panel.
    pub struct DumpFlags: u16 {
        /// Story scripts to per-script `.txt` files.
        const Scripts = 1 << 0;

        /// Story scripts to the aggregate `JpCache.json`.
        const ScriptsJson = 1 << 1;

        /// Raw export of the UI language sources.
        const UiTranslations = 1 << 2;

        /// Scenario, honeymoon, private mode and recollection events.
        const Events = 1 << 3;

        /// Schedule works, descriptions, conditions and categories.
        const Schedule = 1 << 4;

        /// Yotogi skills, commands and stages.
        const Yotogi = 1 << 5;

        /// Maid personalities, classes, titles and features.
        const MaidStatus = 1 << 6;

        /// Trophy names and descriptions.
        const Trophy = 1 << 7;

        /// NPC maids and sub maids.
        const Npc = 1 << 8;

        /// Guest mode profiles, rooms and scenarios.
        const Guest = 1 << 9;

        /// Dance titles and descriptions.
        const Dance = 1 << 10;

        /// Mansion DLC rooms and guests.
        const Mansion = 1 << 11;

        /// `.menu` item names and descriptions.
        const ItemNames = 1 << 12;
    }
}

impl DumpFlags {
    #[must_use]
    /// Every dataset backed by a `.nei` table.
    pub fn tables() -> Self {
        Self::Events
            | Self::Schedule
            | Self::Yotogi
            | Self::MaidStatus
            | Self::Trophy
            | Self::Npc
            | Self::Guest
            | Self::Dance
            | Self::Mansion
    }
}

impl Default for DumpFlags {
    fn default() -> Self {
        Self::Scripts | Self::UiTranslations
    }
}

impl FromStr for DumpFlags {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "scripts" => Self::Scripts,
            "scripts-json" | "scriptsjson" => Self::ScriptsJson,
            "ui" | "ui-translations" => Self::UiTranslations,
            "events" => Self::Events,
            "schedule" | "vip-events" => Self::Schedule,
            "yotogi" => Self::Yotogi,
            "maid-status" | "maidstatus" => Self::MaidStatus,
            "trophy" => Self::Trophy,
            "npc" => Self::Npc,
            "guest" => Self::Guest,
            "dance" => Self::Dance,
            "mansion" => Self::Mansion,
            "menu" | "item-names" => Self::ItemNames,
            "tables" => Self::tables(),
            "all" => Self::all(),
            _ => return Err("Expected a dataset name, `tables` or `all`"),
        })
    }
}

impl TryFrom<u16> for DumpFlags {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(Self::from_bits_truncate(value))
    }
}

impl From<DumpFlags> for u16 {
    fn from(value: DumpFlags) -> Self {
        value.bits()
    }
}

/// Snapshot of the panel's options. Copied when a dump starts, so later toggles don't affect it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DumpOptions {
    pub datasets: DumpFlags,
    /// Skip rows whose key already has a translation, or whose text isn't Japanese.
    pub skip_translated_items: bool,
    /// Trace every extracted dialogue line.
    pub debug: bool,
}

impl DumpOptions {
    /// Parses options persisted as JSON by the host.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] - if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Named extraction procedures, in the order the dumper runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum Dataset {
    #[strum(serialize = "UI translations")]
    UiTranslations,
    #[strum(serialize = "Story scripts (.txt)")]
    Scripts,
    #[strum(serialize = "Story scripts (.json)")]
    ScriptsJson,
    #[strum(serialize = ".menu item names")]
    ItemNames,
    #[strum(serialize = "Maid status")]
    MaidStatus,
    Yotogi,
    #[strum(serialize = "Scenario events")]
    ScenarioEvents,
    #[strum(serialize = "Honeymoon events")]
    HoneymoonEvents,
    #[strum(serialize = "Private mode events")]
    PrivateModeEvents,
    Memory,
    Schedule,
    Trophy,
    #[strum(serialize = "NPC")]
    Npc,
    #[strum(serialize = "Guest mode")]
    Guest,
    Dance,
    Mansion,
}

impl Dataset {
    pub const ALL: [Self; 16] = [
        Self::UiTranslations,
        Self::Scripts,
        Self::ScriptsJson,
        Self::ItemNames,
        Self::MaidStatus,
        Self::Yotogi,
        Self::ScenarioEvents,
        Self::HoneymoonEvents,
        Self::PrivateModeEvents,
        Self::Memory,
        Self::Schedule,
        Self::Trophy,
        Self::Npc,
        Self::Guest,
        Self::Dance,
        Self::Mansion,
    ];

    /// The panel flag that enables this dataset.
    #[must_use]
    pub const fn flag(self) -> DumpFlags {
        match self {
            Self::UiTranslations => DumpFlags::UiTranslations,
            Self::Scripts => DumpFlags::Scripts,
            Self::ScriptsJson => DumpFlags::ScriptsJson,
            Self::ItemNames => DumpFlags::ItemNames,
            Self::MaidStatus => DumpFlags::MaidStatus,
            Self::Yotogi => DumpFlags::Yotogi,
            Self::ScenarioEvents
            | Self::HoneymoonEvents
            | Self::PrivateModeEvents
            | Self::Memory => DumpFlags::Events,
            Self::Schedule => DumpFlags::Schedule,
            Self::Trophy => DumpFlags::Trophy,
            Self::Npc => DumpFlags::Npc,
            Self::Guest => DumpFlags::Guest,
            Self::Dance => DumpFlags::Dance,
            Self::Mansion => DumpFlags::Mansion,
        }
    }
}

/// A source-language segment and its optional inline translation.
///
/// `source` is always trimmed. `translation` is empty when the text had no inline marker.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct BilingualLine {
    pub source: String,
    pub translation: String,
}

impl BilingualLine {
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
        }
    }

    #[must_use]
    pub fn has_translation(&self) -> bool {
        !self.translation.is_empty()
    }

    /// `source\ttranslation`, the line format of per-script `.txt` files.
    #[must_use]
    pub fn to_tab_line(&self) -> String {
        format!("{}\t{}", self.source, self.translation)
    }
}

/// A voiced subtitle. Serialized with the field names the subtitle loader expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleRecord {
    #[serde(rename = "addDisplayTime")]
    pub add_display_time: i32,
    #[serde(rename = "displayTime")]
    pub display_time: i32,
    #[serde(rename = "isCasino")]
    pub is_casino: bool,
    #[serde(rename = "original")]
    pub source: String,
    #[serde(rename = "startTime")]
    pub start_time: i32,
    pub translation: String,
    #[serde(rename = "voice")]
    pub voice_id: String,
}

impl Default for SubtitleRecord {
    fn default() -> Self {
        Self {
            add_display_time: 0,
            display_time: -1,
            is_casino: false,
            source: String::new(),
            start_time: 0,
            translation: String::new(),
            voice_id: String::new(),
        }
    }
}

impl SubtitleRecord {
    #[must_use]
    pub fn from_line(line: BilingualLine) -> Self {
        Self {
            source: line.source,
            translation: line.translation,
            ..Default::default()
        }
    }
}
