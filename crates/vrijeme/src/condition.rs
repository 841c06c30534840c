//! Mapping from DHMZ condition phrases to canonical condition categories.

use serde::Serialize;
use std::fmt;

/// Canonical weather condition category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    ClearNight,
    Sunny,
    Cloudy,
    #[serde(rename = "partlycloudy")]
    PartlyCloudy,
    Fog,
    Rainy,
    Pouring,
    Snowy,
    Lightning,
    LightningRainy,
    Hail,
    Windy,
    WindyCloudy,
    Exceptional,
}

/// Exact phrase table, lowercase as published by DHMZ.
const PHRASES: &[(&str, Condition)] = &[
    ("vedro", Condition::ClearNight),
    ("sunčano", Condition::Sunny),
    ("potpuno oblačno", Condition::Cloudy),
    ("pretežno oblačno", Condition::Cloudy),
    ("pretežno vedro", Condition::PartlyCloudy),
    ("umjereno oblačno", Condition::PartlyCloudy),
    ("magla", Condition::Fog),
    ("maglovito", Condition::Fog),
    ("slaba kiša", Condition::Rainy),
    ("kiša", Condition::Rainy),
    ("jaka kiša", Condition::Pouring),
    ("slab snijeg", Condition::Snowy),
    ("snijeg", Condition::Snowy),
    ("grmljavina", Condition::Lightning),
    ("munja", Condition::Lightning),
    ("grmljavina, kiša", Condition::LightningRainy),
    ("tuča", Condition::Hail),
    ("povjetarac", Condition::Windy),
    ("lahor", Condition::Windy),
    ("jak vjetar", Condition::Windy),
    ("vjetrovito", Condition::Windy),
    ("slab vjetar", Condition::Windy),
    ("umjeren vjetar", Condition::Windy),
    ("umjereno jak vjetar", Condition::Windy),
];

const WIND_PHRASES: &[&str] = &[
    "povjetarac",
    "lahor",
    "jak vjetar",
    "vjetrovito",
    "slab vjetar",
    "umjeren vjetar",
    "umjereno jak vjetar",
];

const CLOUD_PHRASES: &[&str] = &["potpuno oblačno", "pretežno oblačno"];

impl Condition {
    /// Map a lowercase condition phrase to its category.
    ///
    /// Exact matches win. A comma-separated phrase naming both a wind and a
    /// cloud condition is `WindyCloudy`. Anything else is `Exceptional`.
    pub fn from_phrase(phrase: &str) -> Self {
        if let Some((_, condition)) = PHRASES.iter().find(|(p, _)| *p == phrase) {
            return *condition;
        }

        let parts: Vec<&str> = phrase.split(',').map(str::trim).collect();
        if parts.len() > 1 {
            let windy = parts.iter().any(|p| WIND_PHRASES.contains(p));
            let cloudy = parts.iter().any(|p| CLOUD_PHRASES.contains(p));
            if windy && cloudy {
                return Condition::WindyCloudy;
            }
        }

        Condition::Exceptional
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::ClearNight => "clear-night",
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::PartlyCloudy => "partlycloudy",
            Condition::Fog => "fog",
            Condition::Rainy => "rainy",
            Condition::Pouring => "pouring",
            Condition::Snowy => "snowy",
            Condition::Lightning => "lightning",
            Condition::LightningRainy => "lightning-rainy",
            Condition::Hail => "hail",
            Condition::Windy => "windy",
            Condition::WindyCloudy => "windy-cloudy",
            Condition::Exceptional => "exceptional",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
