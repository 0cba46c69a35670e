//! Language-keyed text tables.
//!
//! The tables are TOML files compiled into the binary. They are parsed once
//! at startup into a [`TextCatalog`] which is then passed to whatever needs
//! to render prose. Keys the generator itself substitutes into are typed
//! fields; everything else is UI copy consumed only by the page script.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const EN_TOML: &str = include_str!("../texts/en.toml");
const ZH_TOML: &str = include_str!("../texts/zh.toml");

/// Report languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    /// Traditional Chinese.
    Zh,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Zh];

    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Zh => "zh",
        }
    }
}

/// Text table for one language.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Texts {
    /// Value for the document's `lang` attribute.
    pub lang: String,
    pub title: String,

    pub interp_compare: String,
    pub interp_tradeoff: String,
    pub interp_consistent: String,
    pub interp_tail: String,
    pub interp_p99_missing: String,
    pub interp_finding: String,

    pub warning_requests_zero: String,
    pub warning_transfer_zero: String,
    pub warning_note_cpu: String,
    pub warning_note_io: String,
    pub warning_note_json: String,
    pub warning_note_other: String,

    #[serde(flatten)]
    pub ui: BTreeMap<String, String>,
}

impl Texts {
    /// Look up a UI string, returning an empty string for unknown keys.
    pub fn ui(&self, key: &str) -> &str {
        self.ui.get(key).map(String::as_str).unwrap_or("")
    }
}

/// All text tables, parsed once.
#[derive(Debug, Clone)]
pub struct TextCatalog {
    en: Texts,
    zh: Texts,
}

impl TextCatalog {
    pub fn load() -> Result<Self, ReportError> {
        Ok(Self {
            en: parse(Lang::En, EN_TOML)?,
            zh: parse(Lang::Zh, ZH_TOML)?,
        })
    }

    pub fn get(&self, lang: Lang) -> &Texts {
        match lang {
            Lang::En => &self.en,
            Lang::Zh => &self.zh,
        }
    }

    /// Tables keyed by language code, as embedded in the report.
    pub fn by_code(&self) -> BTreeMap<&'static str, &Texts> {
        Lang::ALL.iter().map(|l| (l.code(), self.get(*l))).collect()
    }
}

fn parse(lang: Lang, source: &str) -> Result<Texts, ReportError> {
    toml::from_str(source).map_err(|source| ReportError::Texts {
        lang: lang.code(),
        source,
    })
}

/// Replace each `{key}` placeholder in `template` with its value.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}
