use crate::domain::model::{DateRange, TimeFilter};
use chrono::{Datelike, Duration, Months, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// 資料最早的紀錄日，`all` 一律從這天開始
pub const DATA_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2020, 1, 1) {
    Some(date) => date,
    None => panic!("invalid data epoch"),
};

static CUSTOM_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:custom:)?(\d{4}-\d{2}-\d{2})[:|](\d{4}-\d{2}-\d{2})$")
        .expect("valid custom range regex")
});

impl TimeFilter {
    pub const ALL_NAMED: [TimeFilter; 8] = [
        TimeFilter::Today,
        TimeFilter::Last7Days,
        TimeFilter::Last30Days,
        TimeFilter::MonthToDate,
        TimeFilter::Last90Days,
        TimeFilter::Last6Months,
        TimeFilter::LastYear,
        TimeFilter::AllTime,
    ];

    /// 解析時間篩選 token，不認得的 token 回到 7 天
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token {
            "today" => Self::Today,
            "7days" => Self::Last7Days,
            "30days" => Self::Last30Days,
            "mtd" => Self::MonthToDate,
            "90days" => Self::Last90Days,
            "6months" => Self::Last6Months,
            "1year" => Self::LastYear,
            "all" => Self::AllTime,
            other => match parse_custom(other) {
                Some(filter) => filter,
                None => {
                    tracing::warn!("⚠️ Unknown time filter '{}', using last 7 days", other);
                    Self::Last7Days
                }
            },
        }
    }

    pub fn token(&self) -> String {
        match self {
            Self::Today => "today".to_string(),
            Self::Last7Days => "7days".to_string(),
            Self::Last30Days => "30days".to_string(),
            Self::MonthToDate => "mtd".to_string(),
            Self::Last90Days => "90days".to_string(),
            Self::Last6Months => "6months".to_string(),
            Self::LastYear => "1year".to_string(),
            Self::AllTime => "all".to_string(),
            Self::Custom { start, end } => format!("{}:{}", start, end),
        }
    }

    /// 檔名用的片段，冒號在部分檔案系統不合法
    pub fn filename_context(&self) -> String {
        match self {
            Self::Custom { start, end } => format!("{}_to_{}", start, end),
            other => other.token(),
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

fn parse_custom(token: &str) -> Option<TimeFilter> {
    let caps = CUSTOM_RANGE.captures(token)?;
    let start = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(&caps[2], "%Y-%m-%d").ok()?;
    Some(TimeFilter::Custom { start, end })
}

/// 依 `now` 計算時間篩選對應的日期區間
pub fn resolve(filter: TimeFilter, now: NaiveDate) -> DateRange {
    let (start, label) = match filter {
        TimeFilter::Today => (now, "Today".to_string()),
        TimeFilter::Last7Days => (now - Duration::days(7), "Last 7 Days".to_string()),
        TimeFilter::Last30Days => (now - Duration::days(30), "Last 30 Days".to_string()),
        TimeFilter::MonthToDate => (now.with_day(1).unwrap_or(now), "Month to Date".to_string()),
        TimeFilter::Last90Days => (now - Duration::days(90), "Last 90 Days".to_string()),
        TimeFilter::Last6Months => (
            now.checked_sub_months(Months::new(6)).unwrap_or(DATA_EPOCH),
            "Last 6 Months".to_string(),
        ),
        TimeFilter::LastYear => (
            now.checked_sub_months(Months::new(12)).unwrap_or(DATA_EPOCH),
            "Last Year".to_string(),
        ),
        TimeFilter::AllTime => (DATA_EPOCH, "All Time".to_string()),
        TimeFilter::Custom { start, end } => {
            return DateRange {
                start,
                end,
                label: format!("{} - {}", start, end),
            };
        }
    };

    DateRange {
        start,
        end: now,
        label,
    }
}

pub fn resolve_token(token: &str, now: NaiveDate) -> DateRange {
    resolve(TimeFilter::parse(token), now)
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// 後端時間區間查詢參數
    pub fn to_query(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_seven_day_window() {
        let range = resolve_token("7days", date(2024, 1, 8));
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 8));
        assert_eq!(range.label, "Last 7 Days");
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn test_unknown_token_falls_back_to_seven_days() {
        let now = date(2024, 1, 8);
        assert_eq!(resolve_token("badtoken", now), resolve_token("7days", now));
        assert_eq!(TimeFilter::parse(""), TimeFilter::Last7Days);
    }

    #[test]
    fn test_custom_range() {
        let range = resolve_token("2024-01-01:2024-01-31", date(2024, 6, 1));
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 31));
        assert_eq!(range.label, "2024-01-01 - 2024-01-31");

        let prefixed = TimeFilter::parse("custom:2024-02-01:2024-02-29");
        assert_eq!(
            prefixed,
            TimeFilter::Custom {
                start: date(2024, 2, 1),
                end: date(2024, 2, 29)
            }
        );
    }

    #[test]
    fn test_invalid_custom_dates_fall_back() {
        assert_eq!(TimeFilter::parse("2024-02-30:2024-03-01"), TimeFilter::Last7Days);
    }

    #[test]
    fn test_calendar_windows() {
        let now = date(2024, 8, 31);

        let mtd = resolve(TimeFilter::MonthToDate, now);
        assert_eq!(mtd.start, date(2024, 8, 1));
        assert_eq!(mtd.label, "Month to Date");

        // 2 月沒有 31 號，夾到月底
        let six_months = resolve(TimeFilter::Last6Months, now);
        assert_eq!(six_months.start, date(2024, 2, 29));

        let year = resolve(TimeFilter::LastYear, date(2024, 2, 29));
        assert_eq!(year.start, date(2023, 2, 28));

        let ninety = resolve(TimeFilter::Last90Days, now);
        assert_eq!(ninety.start, date(2024, 6, 2));
    }

    #[test]
    fn test_today_and_all_time() {
        let now = date(2024, 5, 10);
        let today = resolve(TimeFilter::Today, now);
        assert_eq!((today.start, today.end), (now, now));

        let all = resolve(TimeFilter::AllTime, now);
        assert_eq!(all.start, DATA_EPOCH);
        assert_eq!(all.label, "All Time");
    }

    #[test]
    fn test_tokens_round_trip() {
        for filter in TimeFilter::ALL_NAMED {
            assert_eq!(TimeFilter::parse(&filter.token()), filter);
        }
        let custom = TimeFilter::Custom {
            start: date(2024, 1, 1),
            end: date(2024, 1, 31),
        };
        assert_eq!(custom.filename_context(), "2024-01-01_to_2024-01-31");
    }

    #[test]
    fn test_query_params() {
        let range = resolve_token("30days", date(2024, 3, 31));
        let query = range.to_query();
        assert_eq!(query[0], ("start_date", "2024-03-01".to_string()));
        assert_eq!(query[1], ("end_date", "2024-03-31".to_string()));
    }
}
