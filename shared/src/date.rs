//! 时间格式化模块
//!
//! 后端以 ISO-8601 字符串返回 `created_at`，可能带或不带时区偏移
//! (Python `datetime.isoformat()` 的输出)。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 解析后端时间戳，无时区偏移时按 UTC 处理
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = value.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    value
        .parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 格式化为 `Oct 14, 2026`；无法解析时原样返回
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%b %-d, %Y").to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_python_isoformat() {
        assert_eq!(format_date("2026-10-14T09:30:00.123456"), "Oct 14, 2026");
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let dt = parse_timestamp("2026-03-01T01:00:00+02:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2026-02-28 23:00");
    }

    #[test]
    fn test_date_only_and_garbage() {
        assert_eq!(format_date("2026-01-05"), "Jan 5, 2026");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
