//! # Decomposition Wire Codec
//!
//! Request: one `date,value` line per raw point.
//!
//! Response: `seasonal:<13 comma-separated numbers>trend:<N comma-separated numbers>`
//! with no other delimiters. Tokens may carry surrounding whitespace. `N` is
//! the raw series length. The engine returns no dates, so both components
//! borrow the raw series' dates by position.

use shared::dto::trends::SeriesPoint;

use crate::core::error::{ExploreError, Result};

pub const SEASONAL_MARKER: &str = "seasonal:";
pub const TREND_MARKER: &str = "trend:";

/// One annual cycle of monthly buckets, first month repeated.
pub const SEASONAL_POINTS: usize = 13;

/// Decoded engine output for one term, dated from its raw series.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub seasonal: Vec<SeriesPoint>,
    pub trend: Vec<SeriesPoint>,
}

/// Serialize a raw series for the engine.
pub fn encode_request(points: &[SeriesPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.date, p.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Half-up rounding to two decimals (`-0.125` → `-0.12`).
pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Half-up rounding to the nearest integer (`-2.5` → `-2`).
pub fn round_integer(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn parse_token(token: &str, component: &str, position: usize) -> Result<f64> {
    let trimmed = token.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ExploreError::Protocol(format!(
            "non-numeric {} token {:?} at position {}",
            component, trimmed, position
        ))),
    }
}

/// Fallback spacing between extrapolated seasonal dates.
const DEFAULT_DATE_STEP_DAYS: i64 = 7;

/// Dates for the 13 seasonal points: the raw series' dates by position,
/// continued at the raw series' own spacing when it is shorter than a cycle.
fn seasonal_dates(raw: &[SeriesPoint]) -> Vec<String> {
    let mut dates: Vec<String> = raw.iter().take(SEASONAL_POINTS).map(|p| p.date.clone()).collect();
    let Some(last) = dates.last().cloned() else {
        return vec![String::new(); SEASONAL_POINTS];
    };

    let parsed: Vec<_> = raw.iter().filter_map(|p| lib_utils::parse_date(&p.date).ok()).collect();
    let step = match parsed.as_slice() {
        [.., before, last] if last > before => *last - *before,
        _ => chrono::Duration::days(DEFAULT_DATE_STEP_DAYS),
    };

    match lib_utils::parse_date(&last) {
        Ok(mut date) => {
            while dates.len() < SEASONAL_POINTS {
                date += step;
                dates.push(lib_utils::format_date(date));
            }
        }
        Err(_) => dates.resize(SEASONAL_POINTS, last),
    }
    dates
}

/// Decode the numeric blocks of an engine response.
///
/// Returns the first 13 seasonal values rounded to 2 decimals and every trend
/// value rounded to the nearest integer.
pub fn decode_values(text: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let seasonal_at = text
        .find(SEASONAL_MARKER)
        .ok_or_else(|| ExploreError::Protocol("missing seasonal marker".to_string()))?;
    let trend_at = text
        .find(TREND_MARKER)
        .ok_or_else(|| ExploreError::Protocol("missing trend marker".to_string()))?;

    let seasonal_start = seasonal_at + SEASONAL_MARKER.len();
    if trend_at < seasonal_start {
        return Err(ExploreError::Protocol(
            "trend marker precedes seasonal block".to_string(),
        ));
    }

    let seasonal_block = &text[seasonal_start..trend_at];
    let trend_block = &text[trend_at + TREND_MARKER.len()..];

    let seasonal = seasonal_block
        .split(',')
        .take(SEASONAL_POINTS)
        .enumerate()
        .map(|(i, token)| parse_token(token, "seasonal", i).map(round_2dp))
        .collect::<Result<Vec<_>>>()?;
    if seasonal.len() < SEASONAL_POINTS {
        return Err(ExploreError::Protocol(format!(
            "expected {} seasonal values, got {}",
            SEASONAL_POINTS,
            seasonal.len()
        )));
    }

    let trend = trend_block
        .split(',')
        .enumerate()
        .map(|(i, token)| parse_token(token, "trend", i).map(round_integer))
        .collect::<Result<Vec<_>>>()?;

    Ok((seasonal, trend))
}

/// Decode an engine response against the raw series it answers.
///
/// The trend must have one value per raw point.
pub fn decode_response(text: &str, raw: &[SeriesPoint]) -> Result<Decomposition> {
    let (seasonal, trend) = decode_values(text)?;
    if trend.len() != raw.len() {
        return Err(ExploreError::Protocol(format!(
            "trend has {} values for {} raw points",
            trend.len(),
            raw.len()
        )));
    }

    let seasonal = seasonal
        .into_iter()
        .zip(seasonal_dates(raw))
        .map(|(value, date)| SeriesPoint::new(date, value))
        .collect();
    let trend = trend
        .into_iter()
        .zip(raw)
        .map(|(value, point)| SeriesPoint::new(point.date.clone(), value))
        .collect();

    Ok(Decomposition { seasonal, trend })
}
