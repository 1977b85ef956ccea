//! Localization the game UI doesn't do on its own. The host calls these at its extension points.

use crate::{
    constants::{
        GAME_INFO_DESCRIPTION_TERM, NETORARE_CHECK_CATEGORY, NETORARE_CHECK_ITEMS,
    },
    game::TranslationLookup,
};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([0-3])\}").unwrap());

/// Version strings shown in the system info dialog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub title: String,
    pub build_version: String,
    pub game_version: String,
    pub legacy_version: String,
}

/// Localizes the system info dialog text.
///
/// If `System/GameInfo_Description` is translated, returns the translation with `{0}`, `{1}`, `{2}` and `{3}`
/// replaced by the game title, build version, game version and legacy version. Otherwise returns `raw`.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use tlextract::{localize_info_text, GameInfo};
///
/// let lookup = HashMap::from([(
///     "System/GameInfo_Description".to_owned(),
///     "{0} ver. {2}".to_owned(),
/// )]);
/// let info = GameInfo {
///     title: "COM3D2".to_owned(),
///     game_version: "2.40".to_owned(),
///     ..Default::default()
/// };
///
/// assert_eq!(localize_info_text("原文", &lookup, &info), "COM3D2 ver. 2.40");
/// ```
#[must_use]
pub fn localize_info_text(
    raw: &str,
    lookup: &dyn TranslationLookup,
    info: &GameInfo,
) -> String {
    let Some(template) = lookup.try_get_translation(GAME_INFO_DESCRIPTION_TERM)
    else {
        return raw.to_owned();
    };

    PLACEHOLDER_RE
        .replace_all(&template, |captures: &Captures| match &captures[1] {
            "0" => info.title.clone(),
            "1" => info.build_version.clone(),
            "2" => info.game_version.clone(),
            _ => info.legacy_version.clone(),
        })
        .into_owned()
}

/// Terms of the result and title labels of one NTR check toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleTerms {
    pub result: String,
    pub title: String,
}

#[must_use]
pub fn netorare_check_terms(item: &str) -> ToggleTerms {
    ToggleTerms {
        result: format!("{NETORARE_CHECK_CATEGORY}/{item}_Result"),
        title: format!("{NETORARE_CHECK_CATEGORY}/{item}_Title"),
    }
}

/// Terms for every toggle of the NTR check scene, paired with the toggle's object name.
#[must_use]
pub fn netorare_check_toggles() -> [(&'static str, ToggleTerms); 2] {
    NETORARE_CHECK_ITEMS.map(|item| (item, netorare_check_terms(item)))
}
