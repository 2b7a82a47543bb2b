//! Languages carried by the exports.

/// Translation languages, in column order of the relational export.
pub const LANGUAGES: &[&str] = &["de", "fa", "sv", "ru", "zh_HK", "pt", "fi", "fr"];

/// Display names, in the order the JSON index lists them.
pub const LOCALES: &[(&str, &str)] = &[
    ("de", "Deutsch"),
    ("en", "English"),
    ("fa", "فارسى"),
    ("ru", "Русский язык"),
    ("sv", "Svenska"),
    ("zh_HK", "中文 (香港)"),
    ("pt", "Português"),
    ("fi", "Suomi"),
    ("fr", "Français"),
];

/// Locales the apps offer in their settings.
pub const SUPPORTED_LOCALES: &[&str] = &["de", "en", "sv"];

pub fn locale_name(code: &str) -> Option<&'static str> {
    LOCALES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}
