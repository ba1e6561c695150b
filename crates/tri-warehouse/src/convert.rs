//! `DuckDB` value → JSON conversion.

use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use serde_json::{Number, Value as Json};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

const fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn float(value: f64) -> Json {
    Number::from_f64(value).map_or(Json::Null, Json::Number)
}

/// A decimal stays a number only when `f64` holds every digit of it.
fn decimal(text: String) -> Json {
    let significant = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    match text.parse::<f64>() {
        Ok(parsed) if parsed.to_string() == significant => float(parsed),
        _ => Json::String(text),
    }
}

/// Convert one cell. Integers that fit stay numbers; dates and times become
/// ISO strings; anything without a natural JSON form becomes its debug text.
pub fn to_json(value: Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(b),
        Value::TinyInt(i) => Json::from(i),
        Value::SmallInt(i) => Json::from(i),
        Value::Int(i) => Json::from(i),
        Value::BigInt(i) => Json::from(i),
        Value::UTinyInt(i) => Json::from(i),
        Value::USmallInt(i) => Json::from(i),
        Value::UInt(i) => Json::from(i),
        Value::UBigInt(i) => Json::from(i),
        Value::HugeInt(i) => i64::try_from(i).map_or_else(|_| Json::String(i.to_string()), Json::from),
        Value::Float(f) => float(f64::from(f)),
        Value::Double(f) => float(f),
        Value::Decimal(d) => decimal(d.to_string()),
        Value::Text(s) | Value::Enum(s) => Json::String(s),
        Value::Date32(days) => days
            .checked_add(UNIX_EPOCH_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map_or(Json::Null, |d| Json::String(d.to_string())),
        Value::Timestamp(unit, v) => DateTime::from_timestamp_micros(to_micros(unit, v))
            .map_or(Json::Null, |ts| {
                Json::String(ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
            }),
        Value::Time64(unit, v) => {
            let micros = to_micros(unit, v);
            let secs = u32::try_from(micros.div_euclid(1_000_000)).unwrap_or(0);
            NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
                .map_or(Json::Null, |t| Json::String(t.to_string()))
        }
        Value::List(items) | Value::Array(items) => {
            Json::Array(items.into_iter().map(to_json).collect())
        }
        other => Json::String(format!("{other:?}")),
    }
}
