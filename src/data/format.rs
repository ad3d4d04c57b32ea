//! Number formatting for the dashboard.

use super::rate::Rate;

/// Placeholder shown when a rate has no data.
pub const NO_DATA: &str = "--";

/// Group digits in threes: `1234567` becomes `"1,234,567"`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Per-second rate with one decimal.
pub fn format_rate_per_second(rate: Option<Rate>) -> String {
    rate.map(|r| format!("{:.1}", r.per_second))
        .unwrap_or_else(|| NO_DATA.to_string())
}

/// Per-minute rate rounded to whole messages.
pub fn format_rate_per_minute(rate: Option<Rate>) -> String {
    rate.map(|r| format!("{:.0}", r.per_minute))
        .unwrap_or_else(|| NO_DATA.to_string())
}
