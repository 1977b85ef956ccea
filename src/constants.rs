use const_format::formatcp;

pub(crate) mod localization {
    pub const DUMP_STARTED_MSG: &str =
        "Dumping game localisation files! Please be patient!";
    pub const DUMP_FINISHED_MSG: &str = "Done! Dumped files are located in";
    pub const DATASET_FAILED_MSG: &str =
        "Dataset failed, continuing with the next one.";
    pub const SCRIPT_FAILED_MSG: &str = "Couldn't extract script";
    pub const PARSED_FILE_MSG: &str = "Parsed file";
    pub const WROTE_FILE_MSG: &str = "Wrote file";
    pub const COULD_NOT_EXTRACT_TEXT_MSG: &str =
        "Failed to extract line from";
    pub const MALFORMED_DIRECTIVE_MSG: &str = "Skipping malformed directive";
    pub const MALFORMED_MENU_MSG: &str = "Skipping malformed .menu file";
}

/// Default output root, relative to the game directory.
pub const TL_DIR: &str = "COM3D2_Localisation";
pub const SCRIPT_DIR: &str = "Script";
pub const UI_DIR: &str = "UI";

pub const NPC_NAMES_FILE: &str = "__npc_names.txt";
pub const JP_CACHE_FILE: &str = "JpCache.json";

pub const CSV_HEADER: &str = "Key,Type,Desc,Japanese,English";
pub const CSV_TEXT_TYPE: &str = "Text";

pub const SCRIPT_EXTENSION: &str = ".ks";
pub const MENU_EXTENSION: &str = ".menu";

/// Sentinel separating source text from an inline translation.
pub const INLINE_MARKER: &str = "<e>";
/// Upstream artifact found inside some inline translations.
pub const STRAY_MARKER: &str = "<E>";
pub const ELLIPSIS: char = '…';
pub const ASCII_ELLIPSIS: &str = "...";

pub const COMMENT_PREFIX: char = ';';
pub const DIRECTIVE_PREFIX: char = '@';

pub const LOAD_SUBTITLE_FILE: &str = "@LoadSubtitleFile";
pub const SUBTITLE_DISPLAY_FOR_PLAY_VOICE: &str =
    "@SubtitleDisplayForPlayVoice";
pub const PLAY_VOICE: &str = "@PlayVoice";
pub const TALK: &str = "@talk";
pub const HITRET: &str = "@hitret";
pub const CHOICES_SET: &str = "@ChoicesSet";
pub const VR_CHOICES_SET: &str = "@VRChoicesSet";
pub const YOTOGI_MESSAGE: &str = "@YotogiMessage";

/// Directives whose `text` attribute is a one-line translatable message.
pub const MESSAGE_DIRECTIVES: [&str; 3] =
    [CHOICES_SET, VR_CHOICES_SET, YOTOGI_MESSAGE];

/// Name prefixes marking front-matter speakers that aren't real NPC names.
pub const FRONT_MATTER_PREFIXES: [&str; 2] = ["[HF", "[SF"];

pub const VOICE_SUBTITLE_TAG: &str = "@VoiceSubtitle";

pub const TRUE_VALUE: &str = "true";

pub const ZZZ_PREFIX: &str = "zzz_";
pub const ITEM_NAMES_DIR: &str = formatcp!("{ZZZ_PREFIX}item_names");
pub const MAID_STATUS_DIR: &str = formatcp!("{ZZZ_PREFIX}maid_status");
pub const YOTOGI_DIR: &str = formatcp!("{ZZZ_PREFIX}yotogi");
pub const SCENARIO_EVENTS_DIR: &str = formatcp!("{ZZZ_PREFIX}scenario_events");
pub const HONEYMOON_EVENTS_DIR: &str =
    formatcp!("{ZZZ_PREFIX}honeymoon_events");
pub const PRIVATE_MODE_EVENTS_DIR: &str =
    formatcp!("{ZZZ_PREFIX}privatemode_events");
pub const MEMORY_DIR: &str = formatcp!("{ZZZ_PREFIX}memory");
pub const SCHEDULE_DIR: &str = formatcp!("{ZZZ_PREFIX}schedule");
pub const TROPHY_DIR: &str = formatcp!("{ZZZ_PREFIX}trophy");
pub const NPC_EDIT_DIR: &str = formatcp!("{ZZZ_PREFIX}npc_edit");
pub const GUEST_MODE_DIR: &str = formatcp!("{ZZZ_PREFIX}guest_mode");
pub const DANCE_DIR: &str = formatcp!("{ZZZ_PREFIX}dance");
pub const MANSION_DIR: &str = formatcp!("{ZZZ_PREFIX}mansion_dlc");

pub const SECTION_SEPARATOR_SUFFIX: &str = ",,,,";
pub const ROOMS_SEPARATOR: &str =
    formatcp!("----------------ROOMS----------------{SECTION_SEPARATOR_SUFFIX}");
pub const SCENARIOS_SEPARATOR: &str = formatcp!(
    "----------------SCENARIOS----------------{SECTION_SEPARATOR_SUFFIX}"
);
pub const CONDITIONS_SEPARATOR: &str = formatcp!(
    "----------------CONDITIONS----------------{SECTION_SEPARATOR_SUFFIX}"
);

pub const GAME_INFO_DESCRIPTION_TERM: &str = "System/GameInfo_Description";
pub const NETORARE_CHECK_CATEGORY: &str = "SceneNetorareCheck";
pub const NETORARE_CHECK_ITEMS: [&str; 2] =
    ["Toggle_LockUserDraftMaid", "Toggle_IsComPlayer"];

pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
