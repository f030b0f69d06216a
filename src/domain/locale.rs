//! Supported locales.
//!
//! The site serves a fixed set of locales. Anything outside the set is
//! normalised to [`Locale::DEFAULT`] at the resolver boundary and never travels
//! further into the system.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DomainError;

macro_rules! locales {
    ($($variant:ident => ($code:literal, $name:literal)),+ $(,)?) => {
        /// A locale from the supported set.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Locale {
            $($variant),+
        }

        impl Locale {
            /// Every supported locale, in registration order.
            pub const ALL: &'static [Locale] = &[$(Locale::$variant),+];

            /// Short code used in URLs, bundle file names and the store.
            pub const fn code(self) -> &'static str {
                match self {
                    $(Locale::$variant => $code),+
                }
            }

            /// English display name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Locale::$variant => $name),+
                }
            }

            /// Look up a locale by its exact code.
            pub fn from_code(code: &str) -> Option<Locale> {
                match code {
                    $($code => Some(Locale::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

locales! {
    En => ("en", "English"),
    Ar => ("ar", "Arabic"),
    Bn => ("bn", "Bengali"),
    Es => ("es", "Spanish"),
    Fr => ("fr", "French"),
    De => ("de", "German"),
    It => ("it", "Italian"),
    Pt => ("pt", "Portuguese"),
    Ru => ("ru", "Russian"),
    Ja => ("ja", "Japanese"),
    Zh => ("zh", "Chinese"),
    Vi => ("vi", "Vietnamese"),
    Th => ("th", "Thai"),
    Km => ("km", "Khmer"),
    Id => ("id", "Indonesian"),
    Ne => ("ne", "Nepali"),
    Uz => ("uz", "Uzbek"),
    Fil => ("fil", "Filipino"),
    Mn => ("mn", "Mongolian"),
    Ur => ("ur", "Urdu"),
    Si => ("si", "Sinhala"),
    Ta => ("ta", "Tamil"),
    My => ("my", "Burmese"),
}

impl Locale {
    /// Locale served when a request names nothing supported.
    pub const DEFAULT: Locale = Locale::En;

    /// Resolve a requested code, substituting the default for anything unsupported.
    pub fn normalize(requested: &str) -> Locale {
        Locale::from_code(requested.trim()).unwrap_or(Locale::DEFAULT)
    }

    pub fn is_default(self) -> bool {
        self == Locale::DEFAULT
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::DEFAULT
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Locale::from_code(value.trim())
            .ok_or_else(|| DomainError::validation(format!("unsupported locale `{value}`")))
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
