//! Response locale and bilingual labels.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Languages the backend answers in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Pick the locale from an `Accept-Language` header value.
    ///
    /// Only the first listed tag is considered; a region subtag is ignored.
    /// `*`, unknown languages and a missing header all fall back to English.
    pub fn from_accept_language(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Locale::default();
        };

        header
            .split(',')
            .next()
            .and_then(|tag| tag.split(';').next())
            .map(|tag| tag.trim().to_lowercase())
            .and_then(|tag| {
                let primary = tag.split('-').next().unwrap_or_default().to_string();
                primary.parse().ok()
            })
            .unwrap_or_default()
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ar" => Ok(Locale::Ar),
            _ => Err(()),
        }
    }
}

impl core::fmt::Display for Locale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display labels of a catalog record in every supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub en: String,
    pub ar: String,
}

impl Labels {
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    pub fn for_locale(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Ar => &self.ar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_accept_language_tag_wins() {
        assert_eq!(Locale::from_accept_language(Some("ar-EG,en;q=0.8")), Locale::Ar);
        assert_eq!(Locale::from_accept_language(Some("EN-us, ar")), Locale::En);
    }

    #[test]
    fn unknown_or_missing_language_falls_back_to_english() {
        assert_eq!(Locale::from_accept_language(None), Locale::En);
        assert_eq!(Locale::from_accept_language(Some("*")), Locale::En);
        assert_eq!(Locale::from_accept_language(Some("fr-FR")), Locale::En);
    }

    #[test]
    fn labels_follow_locale() {
        let labels = Labels::new("Users", "المستخدمين");
        assert_eq!(labels.for_locale(Locale::Ar), "المستخدمين");
        assert_eq!(labels.for_locale(Locale::En), "Users");
    }
}
