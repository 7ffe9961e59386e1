use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

/// `1234` -> `1.2K`, `2_340_000` -> `2.34M`.
pub fn format_tokens(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.2}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

pub fn format_cost(cost_usd: f64) -> String {
    format!("${cost_usd:.2}")
}

/// Four decimals for per-row costs in the usage tables, where single calls
/// are far below a cent.
pub fn format_cost_precise(cost_usd: f64) -> String {
    format!("${cost_usd:.4}")
}

/// Shortens full model identifiers for display:
/// `claude-opus-4-5-20251101` -> `Opus 4.5`.
pub fn format_model_name(model: &str) -> String {
    if model.contains("opus-4-5") {
        return "Opus 4.5".to_string();
    }
    if model.contains("sonnet-4-5") {
        return "Sonnet 4.5".to_string();
    }
    if model.contains("sonnet-4-") {
        return "Sonnet 4".to_string();
    }
    if model.contains("haiku") {
        return "Haiku".to_string();
    }
    if model.contains("opus") {
        return "Opus".to_string();
    }
    if model.contains("sonnet") {
        return "Sonnet".to_string();
    }
    model.to_string()
}

/// Calendar-relative date for list rows: `Today 14:05`, `Yesterday 09:30`,
/// `3d ago`, else `Jun 14`. Unparseable timestamps render as-is.
pub fn format_relative_date(now: OffsetDateTime, timestamp: &str) -> String {
    let Ok(parsed) = OffsetDateTime::parse(timestamp, &Rfc3339) else {
        return timestamp.to_string();
    };
    let parsed = parsed.to_offset(now.offset());
    let diff_days = (now.date() - parsed.date()).whole_days();

    let clock = format_description!("[hour]:[minute]");
    match diff_days {
        0 => match parsed.format(&clock) {
            Ok(time_text) => format!("Today {time_text}"),
            Err(_) => "Today".to_string(),
        },
        1 => match parsed.format(&clock) {
            Ok(time_text) => format!("Yesterday {time_text}"),
            Err(_) => "Yesterday".to_string(),
        },
        2..=6 => format!("{diff_days}d ago"),
        _ => {
            let month_day = format_description!("[month repr:short] [day padding:none]");
            parsed
                .format(&month_day)
                .unwrap_or_else(|_| timestamp.to_string())
        }
    }
}

/// Full date-time for transcript headers: `2025-06-15 14:05`.
pub fn format_date_time(timestamp: &str) -> String {
    let Ok(parsed) = OffsetDateTime::parse(timestamp, &Rfc3339) else {
        return timestamp.to_string();
    };
    let description = format_description!("[year]-[month]-[day] [hour]:[minute]");
    parsed
        .format(&description)
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_token_counts_with_magnitude_suffix() {
        assert_eq!(format_tokens(532), "532");
        assert_eq!(format_tokens(4_500), "4.5K");
        assert_eq!(format_tokens(1_230_000), "1.23M");
    }

    #[test]
    fn formats_costs() {
        assert_eq!(format_cost(12.345), "$12.35");
        assert_eq!(format_cost_precise(0.00042), "$0.0004");
    }

    #[test]
    fn shortens_model_names() {
        assert_eq!(format_model_name("claude-opus-4-5-20251101"), "Opus 4.5");
        assert_eq!(format_model_name("claude-sonnet-4-5-20250929"), "Sonnet 4.5");
        assert_eq!(format_model_name("claude-3-5-haiku-20241022"), "Haiku");
        assert_eq!(format_model_name("gpt-5.2"), "gpt-5.2");
    }

    #[test]
    fn relative_dates_use_calendar_days() {
        let now = datetime!(2025-06-15 10:00:00 UTC);
        assert_eq!(
            format_relative_date(now, "2025-06-15T00:00:00Z"),
            "Today 00:00"
        );
        // Late yesterday evening is still "Yesterday" even though fewer than
        // 24 hours have elapsed.
        assert_eq!(
            format_relative_date(now, "2025-06-14T23:30:00Z"),
            "Yesterday 23:30"
        );
        assert_eq!(format_relative_date(now, "2025-06-12T10:00:00Z"), "3d ago");
        assert_eq!(format_relative_date(now, "2025-06-01T10:00:00Z"), "Jun 1");
    }

    #[test]
    fn unparseable_timestamps_pass_through() {
        let now = datetime!(2025-06-15 10:00:00 UTC);
        assert_eq!(format_relative_date(now, "not-a-date"), "not-a-date");
        assert_eq!(format_date_time("not-a-date"), "not-a-date");
    }
}
