//! Deserializers that accept both typed values and the attribute strings older records hold.

use egui::Pos2;
use serde::de::{self, Deserializer};
use serde::Deserialize;

use super::ShapeId;
use super::geometry::parse_points;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn parse_number<E: de::Error>(value: NumberOrString) -> Result<f64, E> {
    match value {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("expected a number, found `{s}`"))),
    }
}

pub(crate) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    parse_number(NumberOrString::deserialize(deserializer)?).map(|n| n as f32)
}

pub(crate) fn optional_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f32>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => parse_number(value).map(|n| Some(n as f32)),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Integer(u64),
    Float(f64),
    Text(String),
}

/// Largest float that still converts to a `u64` without saturating
const MAX_FLOAT_ID: f64 = 18_446_744_073_709_549_568.0;

fn float_id<E: de::Error>(n: f64) -> Result<ShapeId, E> {
    if !(0.0..=MAX_FLOAT_ID).contains(&n) || n.fract() != 0.0 {
        return Err(E::custom(format!("invalid shape id {n}")));
    }
    Ok(n as ShapeId)
}

pub(crate) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ShapeId, D::Error> {
    match IdRepr::deserialize(deserializer)? {
        IdRepr::Integer(n) => Ok(n),
        IdRepr::Float(n) => float_id(n),
        IdRepr::Text(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => Ok(n),
                Err(_) => s
                    .parse::<f64>()
                    .map_err(|_| de::Error::custom(format!("invalid shape id `{s}`")))
                    .and_then(float_id),
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Number(f64),
    Text(String),
    Other(de::IgnoredAny),
}

/// Start coordinate of a rectangle or line. Records written by older sessions may hold the
/// whole drag object here, or nothing at all; both read as `0`.
pub(crate) fn start_coordinate<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<f32, D::Error> {
    Ok(match CoordinateRepr::deserialize(deserializer)? {
        CoordinateRepr::Number(n) => n as f32,
        CoordinateRepr::Text(s) => s.trim().parse::<f32>().unwrap_or(0.0),
        CoordinateRepr::Other(_) => 0.0,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointsRepr {
    List(Vec<Pos2>),
    Text(String),
}

pub(crate) fn points<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Pos2>, D::Error> {
    match PointsRepr::deserialize(deserializer)? {
        PointsRepr::List(points) => Ok(points),
        PointsRepr::Text(text) => parse_points(&text).map_err(de::Error::custom),
    }
}
