//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use chrono_tz::Tz;

const MONTHS_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviated month name (`month` is 1-based)
fn month_abbreviation(language: &str, month: u32) -> &'static str {
    let table = if language.to_ascii_lowercase().starts_with("pt") {
        &MONTHS_PT_BR
    } else {
        &MONTHS_EN
    };
    table[(month.clamp(1, 12) - 1) as usize]
}

/// Format a publication date as `dd LLL yyyy` in the site timezone
///
/// # Examples
/// ```ignore
/// format_post_date(Some(&date), "pt-BR", &tz) // -> "15 mar 2021"
/// ```
pub fn format_post_date(date: Option<&DateTime<FixedOffset>>, language: &str, tz: &Tz) -> String {
    match date {
        Some(date) => {
            let local = date.with_timezone(tz);
            format!(
                "{:02} {} {}",
                local.day(),
                month_abbreviation(language, local.month()),
                local.year()
            )
        }
        None => String::new(),
    }
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
