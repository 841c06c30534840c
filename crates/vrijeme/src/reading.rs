//! Published weather snapshot for one city.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::condition::Condition;
use crate::error::RefreshError;
use crate::feed::CityRecord;
use crate::normalize::{normalize_integer, normalize_numeric, normalize_token};

/// Wind direction token as reported by the feed.
///
/// The feed uses the 16-point compass rose plus `C` for calm.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WindDirection {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
    #[serde(rename = "C")]
    Calm,
}

impl WindDirection {
    const COMPASS: [WindDirection; 16] = [
        WindDirection::N,
        WindDirection::NNE,
        WindDirection::NE,
        WindDirection::ENE,
        WindDirection::E,
        WindDirection::ESE,
        WindDirection::SE,
        WindDirection::SSE,
        WindDirection::S,
        WindDirection::SSW,
        WindDirection::SW,
        WindDirection::WSW,
        WindDirection::W,
        WindDirection::WNW,
        WindDirection::NW,
        WindDirection::NNW,
    ];

    /// Upstream token for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindDirection::N => "N",
            WindDirection::NNE => "NNE",
            WindDirection::NE => "NE",
            WindDirection::ENE => "ENE",
            WindDirection::E => "E",
            WindDirection::ESE => "ESE",
            WindDirection::SE => "SE",
            WindDirection::SSE => "SSE",
            WindDirection::S => "S",
            WindDirection::SSW => "SSW",
            WindDirection::SW => "SW",
            WindDirection::WSW => "WSW",
            WindDirection::W => "W",
            WindDirection::WNW => "WNW",
            WindDirection::NW => "NW",
            WindDirection::NNW => "NNW",
            WindDirection::Calm => "C",
        }
    }

    /// Bearing in degrees clockwise from north; calm has no bearing.
    pub fn bearing(&self) -> Option<f64> {
        Self::COMPASS
            .iter()
            .position(|d| d == self)
            .map(|i| i as f64 * 22.5)
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "C" {
            return Ok(WindDirection::Calm);
        }
        Self::COMPASS
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown wind direction: {}", s))
    }
}

/// One immutable set of readings for one city as of one refresh cycle.
///
/// Every field is independently optional; `None` means the feed had no
/// usable value, which is distinct from a zero reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reading {
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity, percent
    pub humidity: Option<i64>,
    /// Hectopascals
    pub pressure: Option<f64>,
    /// Signed hectopascals. Carried over from the previous snapshot when
    /// the current payload has no usable value.
    pub pressure_tendency: Option<f64>,
    /// km/h
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<WindDirection>,
    /// Lowercased condition phrase, empty when the feed has none
    pub condition_raw: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Reading {
    /// Build a snapshot from a matched city record.
    ///
    /// `previous` is the last published snapshot and only feeds the
    /// pressure tendency fallback; no other field is carried over. Fails
    /// only when the record has no `<Podatci>` block.
    pub fn from_record(
        record: &CityRecord,
        previous: Option<&Reading>,
    ) -> Result<Self, RefreshError> {
        let data = record.data()?;

        let pressure_tendency = normalize_numeric(data.pressure_tendency.as_deref())
            .or_else(|| previous.and_then(|p| p.pressure_tendency));

        let wind_direction =
            normalize_token(data.wind_direction.as_deref()).and_then(|token| {
                token
                    .parse::<WindDirection>()
                    .map_err(|e| log::debug!("{}: {}", record.name, e))
                    .ok()
            });

        Ok(Self {
            temperature: normalize_numeric(data.temperature.as_deref()),
            humidity: normalize_integer(data.humidity.as_deref()),
            pressure: normalize_numeric(data.pressure.as_deref()),
            pressure_tendency,
            wind_speed: normalize_numeric(data.wind_speed.as_deref()),
            wind_direction,
            condition_raw: normalize_token(data.condition.as_deref())
                .map(|c| c.to_lowercase())
                .unwrap_or_default(),
            latitude: normalize_numeric(record.latitude.as_deref()),
            longitude: normalize_numeric(record.longitude.as_deref()),
        })
    }

    /// Canonical condition category, or `None` when the feed gave no phrase.
    pub fn condition(&self) -> Option<Condition> {
        if self.condition_raw.is_empty() {
            None
        } else {
            Some(Condition::from_phrase(&self.condition_raw))
        }
    }
}
