//! Built-in tools served by the JSON-RPC endpoint

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use super::registry::{HandlerResult, ToolError, ToolRegistry};

/// Korea Standard Time, UTC+9 with no DST
const KST_OFFSET_SECS: i32 = 9 * 3600;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn kst() -> HandlerResult<FixedOffset> {
    FixedOffset::east_opt(KST_OFFSET_SECS)
        .ok_or_else(|| ToolError::Failed("invalid KST offset".to_string()))
}

fn format_kst(now: DateTime<Utc>) -> HandlerResult<Value> {
    let local = kst()?.from_utc_datetime(&now.naive_utc());
    Ok(json!({ "time": local.format(TIME_FORMAT).to_string() }))
}

/// `get_current_time`: `{"time": "YYYY-MM-DD HH:MM:SS"}` in KST
pub fn get_current_time(_params: &Map<String, Value>) -> HandlerResult<Value> {
    format_kst(Utc::now())
}

fn parse_start_date(raw: &str) -> HandlerResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    raw.parse::<NaiveDateTime>()
        .map(|dt| dt.date())
        .map_err(|e| ToolError::invalid_argument("start_date", format!("'{}': {}", raw, e)))
}

/// `calculate_discharge_date`: ISO date `service_days` after `start_date`
pub fn calculate_discharge_date(params: &Map<String, Value>) -> HandlerResult<Value> {
    let start = params
        .get("start_date")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_argument("start_date", "expected an ISO date string"))?;
    let days = params
        .get("service_days")
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::invalid_argument("service_days", "expected an integer"))?;

    let start = parse_start_date(start)?;
    let discharge = Duration::try_days(days)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| ToolError::Failed(format!("date out of range: {} + {} days", start, days)))?;

    Ok(Value::String(discharge.format("%Y-%m-%d").to_string()))
}

impl ToolRegistry {
    /// Registry with the built-in tools
    pub fn with_builtin_tools() -> HandlerResult<Self> {
        let mut registry = Self::new();

        registry.register(
            "get_current_time",
            "Get the current date and time in Korea Standard Time (Asia/Seoul).",
            json!({
                "type": "object",
                "properties": {}
            }),
            get_current_time,
        )?;

        registry.register(
            "calculate_discharge_date",
            "Return the ISO date reached after serving the given number of days from a start date.",
            json!({
                "type": "object",
                "properties": {
                    "start_date": {
                        "type": "string",
                        "description": "Start date in ISO format, e.g. 2024-01-15"
                    },
                    "service_days": {
                        "type": "integer",
                        "description": "Number of days to serve"
                    }
                },
                "required": ["start_date", "service_days"]
            }),
            calculate_discharge_date,
        )?;

        Ok(registry)
    }
}
