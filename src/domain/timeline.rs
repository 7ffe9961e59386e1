use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime};

use crate::domain::SessionSummary;

/// A named recency bucket for the session timeline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupLabel {
    Today,
    LastWeek,
    ThisMonth,
    Month { year: i32, month: u8 },
}

impl GroupLabel {
    pub fn title(self) -> String {
        match self {
            Self::Today => "Today".to_string(),
            Self::LastWeek => "Last Week".to_string(),
            Self::ThisMonth => "This Month".to_string(),
            Self::Month { year, month } => format!("{year}-{month}"),
        }
    }

    // Fixed buckets first, then explicit months most-recent-first. The
    // offset constant only needs to exceed any realistic year*12+month.
    fn sort_key(self) -> i64 {
        match self {
            Self::Today => 0,
            Self::LastWeek => 1,
            Self::ThisMonth => 2,
            Self::Month { year, month } => 100_000 - (i64::from(year) * 12 + i64::from(month)),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelineGroup {
    pub label: GroupLabel,
    pub sessions: Vec<SessionSummary>,
}

/// Assigns a calendar date to its timeline bucket relative to `today`.
///
/// All comparisons are on calendar dates, never elapsed hours. The week
/// starts on Monday. Dates that fit no fixed bucket (including future dates
/// from clock skew) land in their own `<year>-<month>` bucket.
pub fn date_group(today: Date, session_date: Date) -> GroupLabel {
    let diff_days = (today - session_date).whole_days();
    if diff_days == 0 {
        return GroupLabel::Today;
    }

    let monday_this_week =
        today - Duration::days(i64::from(today.weekday().number_days_from_monday()));
    let monday_last_week = monday_this_week - Duration::days(7);
    if session_date >= monday_last_week && session_date < monday_this_week {
        return GroupLabel::LastWeek;
    }

    let first_of_month = today.replace_day(1).unwrap_or(today);
    if session_date >= first_of_month && session_date < monday_last_week {
        return GroupLabel::ThisMonth;
    }

    GroupLabel::Month {
        year: session_date.year(),
        month: session_date.month() as u8,
    }
}

/// Buckets sessions by their updated timestamp and returns groups in display
/// order: Today, Last Week, This Month, then explicit months newest first.
/// Session order within a group follows the input order.
pub fn group_sessions(today: Date, sessions: &[SessionSummary]) -> Vec<TimelineGroup> {
    let mut groups: Vec<TimelineGroup> = Vec::new();
    for session in sessions {
        let session_date = parse_rfc3339_date(&session.updated_at).unwrap_or(today);
        let label = date_group(today, session_date);
        match groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.sessions.push(session.clone()),
            None => groups.push(TimelineGroup {
                label,
                sessions: vec![session.clone()],
            }),
        }
    }
    groups.sort_by_key(|group| group.label.sort_key());
    groups
}

pub fn parse_rfc3339_date(value: &str) -> Option<Date> {
    OffsetDateTime::parse(value, &Rfc3339)
        .ok()
        .map(|timestamp| timestamp.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn summary(id: &str, updated_at: &str) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            project_path: "/p".to_string(),
            project_name: "p".to_string(),
            title: String::new(),
            created_at: updated_at.to_string(),
            updated_at: updated_at.to_string(),
            message_count: 0,
            tool_calls: Vec::new(),
            source: None,
        }
    }

    #[test]
    fn session_updated_today_groups_as_today() {
        let today = date!(2025 - 06 - 15);
        assert_eq!(date_group(today, today), GroupLabel::Today);
    }

    #[test]
    fn eight_days_back_from_a_wednesday_is_last_week() {
        // 2025-06-18 is a Wednesday; 8 days back is Tuesday 2025-06-10, which
        // falls in the Monday-start week before this one.
        let today = date!(2025 - 06 - 18);
        assert_eq!(
            date_group(today, date!(2025 - 06 - 10)),
            GroupLabel::LastWeek
        );
    }

    #[test]
    fn same_month_before_last_week_is_this_month() {
        // Today 2025-06-15 (Sunday): this week's Monday is 06-09, last
        // week's Monday is 06-02.
        let today = date!(2025 - 06 - 15);
        assert_eq!(
            date_group(today, date!(2025 - 06 - 01)),
            GroupLabel::ThisMonth
        );
    }

    #[test]
    fn earlier_month_gets_its_own_bucket() {
        let today = date!(2025 - 06 - 15);
        assert_eq!(
            date_group(today, date!(2025 - 05 - 20)),
            GroupLabel::Month {
                year: 2025,
                month: 5
            }
        );
    }

    #[test]
    fn month_bucket_title_has_no_zero_padding() {
        let label = GroupLabel::Month {
            year: 2025,
            month: 5,
        };
        assert_eq!(label.title(), "2025-5");
    }

    #[test]
    fn future_dates_fall_through_to_their_month_bucket() {
        let today = date!(2025 - 06 - 15);
        assert_eq!(
            date_group(today, date!(2025 - 07 - 02)),
            GroupLabel::Month {
                year: 2025,
                month: 7
            }
        );
    }

    #[test]
    fn groups_are_ordered_and_months_descend() {
        let today = date!(2025 - 06 - 15);
        let sessions = vec![
            summary("march", "2025-03-03T08:00:00Z"),
            summary("today", "2025-06-15T09:00:00Z"),
            summary("may", "2025-05-20T10:00:00Z"),
            summary("last-week", "2025-06-03T11:00:00Z"),
            summary("this-month", "2025-06-01T12:00:00Z"),
        ];
        let groups = group_sessions(today, &sessions);
        let labels: Vec<GroupLabel> = groups.iter().map(|group| group.label).collect();
        assert_eq!(
            labels,
            vec![
                GroupLabel::Today,
                GroupLabel::LastWeek,
                GroupLabel::ThisMonth,
                GroupLabel::Month {
                    year: 2025,
                    month: 5
                },
                GroupLabel::Month {
                    year: 2025,
                    month: 3
                },
            ]
        );
    }

    #[test]
    fn grouping_is_stable_across_repeated_runs() {
        let today = date!(2025 - 06 - 15);
        let sessions = vec![
            summary("a", "2025-06-15T09:00:00Z"),
            summary("b", "2025-06-15T08:00:00Z"),
            summary("c", "2025-05-02T08:00:00Z"),
        ];
        let first = group_sessions(today, &sessions);
        let second = group_sessions(today, &sessions);
        assert_eq!(first, second);
        assert_eq!(
            first[0]
                .sessions
                .iter()
                .map(|session| session.id.as_str())
                .collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }
}
