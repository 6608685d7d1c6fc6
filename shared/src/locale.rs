//! Site languages and localized field selection
//!
//! Content rows carry one column per language (`title_en`, `title_th`,
//! `title_zh`). English is mandatory, the others fall back to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported site language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Th,
    Zh,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Th, Language::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Th => "th",
            Self::Zh => "zh",
        }
    }

    /// Pick the first supported language out of an `Accept-Language` header.
    ///
    /// Quality weights are honoured; region subtags (`zh-CN`, `th-TH`) map to
    /// their primary language.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Language)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().split(';');
                let tag = pieces.next()?.trim();
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                if quality <= 0.0 {
                    return None;
                }
                let primary = tag.split(['-', '_']).next()?;
                primary.parse::<Language>().ok().map(|l| (quality, l))
            })
            .collect();
        // Stable sort keeps header order for equal weights
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, l)| *l)
    }

    /// Resolve the request language: explicit query value, then header, then English.
    pub fn resolve(query: Option<&str>, accept_language: Option<&str>) -> Self {
        query
            .and_then(|q| q.parse().ok())
            .or_else(|| accept_language.and_then(Self::from_accept_language))
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "th" => Ok(Self::Th),
            "zh" => Ok(Self::Zh),
            _ => Err(()),
        }
    }
}

/// Select the text for `lang`, falling back to English when the translation
/// is missing or blank.
pub fn pick<'a>(lang: Language, en: &'a str, th: Option<&'a str>, zh: Option<&'a str>) -> &'a str {
    let translated = match lang {
        Language::En => None,
        Language::Th => th,
        Language::Zh => zh,
    };
    translated.filter(|s| !s.trim().is_empty()).unwrap_or(en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("th".parse::<Language>(), Ok(Language::Th));
        assert_eq!(" ZH ".parse::<Language>(), Ok(Language::Zh));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_accept_language_regions_and_quality() {
        assert_eq!(
            Language::from_accept_language("zh-CN,zh;q=0.9,en;q=0.8"),
            Some(Language::Zh)
        );
        assert_eq!(
            Language::from_accept_language("fr-FR, en;q=0.5, th;q=0.7"),
            Some(Language::Th)
        );
        assert_eq!(Language::from_accept_language("de, fr"), None);
    }

    #[test]
    fn test_accept_language_zero_quality_is_refused() {
        assert_eq!(Language::from_accept_language("th;q=0"), None);
        assert_eq!(
            Language::from_accept_language("th;q=0, zh;q=0.2"),
            Some(Language::Zh)
        );
        assert_eq!(Language::resolve(None, Some("th;q=0.0")), Language::En);
    }

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(Language::resolve(Some("th"), Some("zh")), Language::Th);
        assert_eq!(Language::resolve(Some("xx"), Some("zh-TW")), Language::Zh);
        assert_eq!(Language::resolve(None, None), Language::En);
    }

    #[test]
    fn test_pick_falls_back_to_english() {
        assert_eq!(pick(Language::Th, "Beach", Some("ชายหาด"), None), "ชายหาด");
        assert_eq!(pick(Language::Zh, "Beach", Some("ชายหาด"), None), "Beach");
        assert_eq!(pick(Language::Zh, "Beach", None, Some("  ")), "Beach");
        assert_eq!(pick(Language::En, "Beach", Some("ชายหาด"), Some("海滩")), "Beach");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Th).unwrap(), "\"th\"");
    }
}
