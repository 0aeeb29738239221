//! Series normalizer: raw provider candle arrays to ordered daily price points.

use chrono::DateTime;

use crate::error::PipelineError;
use crate::types::{CandlePayload, PricePoint};

/// Ordered closing prices, the only input the indicator engine consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosingSeries(Vec<f64>);

impl ClosingSeries {
    pub fn from_points(points: &[PricePoint]) -> Self {
        Self(points.iter().map(|p| p.close).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }
}

impl From<Vec<f64>> for ClosingSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Fetch a required parallel array, checking it lines up with the timestamps.
fn required<'a>(
    name: &str,
    values: &'a Option<Vec<Option<f64>>>,
    expected: usize,
) -> Result<&'a [Option<f64>], PipelineError> {
    let values = values
        .as_deref()
        .ok_or_else(|| PipelineError::MalformedSeries(format!("missing {} array", name)))?;
    if values.len() != expected {
        return Err(PipelineError::MalformedSeries(format!(
            "{} has {} values for {} timestamps",
            name,
            values.len(),
            expected
        )));
    }
    Ok(values)
}

/// Turn a provider payload into price points ordered ascending by date.
///
/// Rows where any of open/high/low/close is null are skipped; a missing
/// volume counts as zero. When two rows fall on the same calendar day the
/// later row wins.
pub fn normalize(payload: &CandlePayload) -> Result<Vec<PricePoint>, PipelineError> {
    let timestamps = match payload.timestamps.as_deref() {
        Some(ts) if !ts.is_empty() => ts,
        _ => {
            return Err(PipelineError::DataUnavailable(
                "No candle timestamps in response".to_string(),
            ))
        }
    };

    let n = timestamps.len();
    let opens = required("open", &payload.open, n)?;
    let highs = required("high", &payload.high, n)?;
    let lows = required("low", &payload.low, n)?;
    let closes = required("close", &payload.close, n)?;
    let volumes = payload.volume.as_deref().unwrap_or_default();

    let mut points = Vec::with_capacity(n);
    for (i, &ts) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) =
            (opens[i], highs[i], lows[i], closes[i])
        else {
            continue;
        };

        let date = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| PipelineError::MalformedSeries(format!("invalid timestamp {}", ts)))?
            .date_naive();

        points.push(PricePoint {
            date,
            open,
            high,
            low,
            close,
            volume: volumes.get(i).copied().flatten().unwrap_or(0.0),
        });
    }

    if points.is_empty() {
        return Err(PipelineError::DataUnavailable(
            "No usable candles in response".to_string(),
        ));
    }

    points.sort_by_key(|p| p.date);
    let mut ordered: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match ordered.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => ordered.push(point),
        }
    }

    Ok(ordered)
}
