//! Declarative sensor table projected from a [`Reading`].
//!
//! Consumers that expose one value per sensor iterate [`SENSORS`]; the
//! coordinator itself never looks at this table.

use serde::Serialize;
use std::fmt;

use crate::reading::Reading;

/// A single projected sensor value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Integer(i64),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(v) => write!(f, "{}", v),
            SensorValue::Integer(v) => write!(f, "{}", v),
            SensorValue::Text(v) => f.write_str(v),
        }
    }
}

/// Static description of one sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorKind {
    /// Stable key, e.g. `pressure_tendency`
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    project: fn(&Reading) -> Option<SensorValue>,
}

impl SensorKind {
    pub fn value(&self, reading: &Reading) -> Option<SensorValue> {
        (self.project)(reading)
    }
}

pub const SENSORS: &[SensorKind] = &[
    SensorKind {
        key: "temperature",
        label: "Temperature",
        unit: Some("°C"),
        project: |r| r.temperature.map(SensorValue::Number),
    },
    SensorKind {
        key: "humidity",
        label: "Humidity",
        unit: Some("%"),
        project: |r| r.humidity.map(SensorValue::Integer),
    },
    SensorKind {
        key: "pressure",
        label: "Pressure",
        unit: Some("hPa"),
        project: |r| r.pressure.map(SensorValue::Number),
    },
    SensorKind {
        key: "pressure_tendency",
        label: "Pressure Tendency",
        unit: Some("hPa"),
        project: |r| r.pressure_tendency.map(SensorValue::Number),
    },
    SensorKind {
        key: "wind_speed",
        label: "Wind Speed",
        unit: Some("km/h"),
        project: |r| r.wind_speed.map(SensorValue::Number),
    },
    SensorKind {
        key: "wind_direction",
        label: "Wind Direction",
        unit: Some("°"),
        project: |r| {
            r.wind_direction
                .and_then(|d| d.bearing())
                .map(SensorValue::Number)
        },
    },
    SensorKind {
        key: "condition",
        label: "Weather Condition",
        unit: None,
        project: |r| r.condition().map(|c| SensorValue::Text(c.to_string())),
    },
    SensorKind {
        key: "latitude",
        label: "Latitude",
        unit: Some("°"),
        project: |r| r.latitude.map(SensorValue::Number),
    },
    SensorKind {
        key: "longitude",
        label: "Longitude",
        unit: Some("°"),
        project: |r| r.longitude.map(SensorValue::Number),
    },
];

/// Look up a sensor by key.
pub fn sensor(key: &str) -> Option<&'static SensorKind> {
    SENSORS.iter().find(|s| s.key == key)
}
