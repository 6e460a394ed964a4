//! 儀表板顯示用的數字、金額、百分比格式化
//!
//! 全部是純函式，任何有限數值輸入都不會失敗。

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

pub const DEFAULT_CURRENCY: &str = "PKR";

static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").expect("valid ISO date regex"));

/// 以 1000 為級距縮寫，例如 1500 → "1.5K"
///
/// 級距索引為 `floor(log1000(|n|))`，夾在後綴表範圍內；小於 1 的值不加後綴。
pub fn format_large_number(n: f64, decimals: usize) -> String {
    if n == 0.0 || !n.is_finite() {
        return "0".to_string();
    }

    let index = (n.abs().log10() / 3.0)
        .floor()
        .clamp(0.0, (SUFFIXES.len() - 1) as f64) as usize;
    let scaled = n / 1000f64.powi(index as i32);

    format!("{}{}", trim_fixed(scaled, decimals), SUFFIXES[index])
}

pub fn format_large_number_default(n: f64) -> String {
    format_large_number(n, 1)
}

/// 負數把符號放在幣別前面："-PKR 500"
pub fn format_currency(amount: f64, currency: &str, decimals: usize) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return format!("{} 0", currency);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!(
        "{}{} {}",
        sign,
        currency,
        format_large_number(amount.abs(), decimals)
    )
}

pub fn format_pkr(amount: f64) -> String {
    format_currency(amount, DEFAULT_CURRENCY, 1)
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// 成長率（百分比）
///
/// 前期為 0 時沒有數學上的定義，這裡固定回傳 100（本期 > 0）或 0，
/// 純粹是顯示策略。
pub fn calculate_growth(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthTone {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthDisplay {
    pub text: String,
    pub tone: GrowthTone,
    pub color: &'static str,
    pub background: &'static str,
}

pub fn format_growth_with_color(growth: f64) -> GrowthDisplay {
    if growth >= 0.0 {
        GrowthDisplay {
            text: format!("+{:.1}%", growth),
            tone: GrowthTone::Positive,
            color: "text-green-600",
            background: "bg-green-50",
        }
    } else {
        GrowthDisplay {
            text: format!("{:.1}%", growth),
            tone: GrowthTone::Negative,
            color: "text-red-600",
            background: "bg-red-50",
        }
    }
}

/// 千分位格式，最多保留 3 位小數（與 en-US 的數字顯示一致）
pub fn format_with_separators(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }

    let fixed = trim_fixed(n.abs(), 3);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    if n < 0.0 && grouped != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// 取出字串開頭的 `YYYY-MM-DD`，不是合法日期時回傳 None
pub fn leading_iso_date(value: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE_PREFIX.captures(value)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

/// 固定小數位後去掉尾端的 0 與小數點
fn trim_fixed(value: f64, decimals: usize) -> String {
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        let trimmed_len = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed_len);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}
