//! Lexical forms of the XSD date/time, duration and timezone types.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const MAX_TIMEZONE_SECONDS: i64 = 14 * 3600;

/// Splits an optional trailing timezone (`Z`, `+hh:mm`, `-hh:mm`) off a lexical value.
pub fn split_timezone(s: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(rest) = s.strip_suffix('Z') {
        return Some((rest, FixedOffset::east_opt(0)));
    }
    if s.len() >= 6 && s.is_char_boundary(s.len() - 6) {
        let (head, tail) = s.split_at(s.len() - 6);
        let bytes = tail.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' {
            let hours: i32 = tail[1..3].parse().ok()?;
            let minutes: i32 = tail[4..6].parse().ok()?;
            if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
                return None;
            }
            let secs = (hours * 3600 + minutes * 60) * if bytes[0] == b'-' { -1 } else { 1 };
            return Some((head, Some(FixedOffset::east_opt(secs)?)));
        }
    }
    Some((s, None))
}

pub fn parse_date(s: &str) -> Option<(NaiveDate, Option<FixedOffset>)> {
    let (body, tz) = split_timezone(s.trim())?;
    let (sign, body) = match body.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, body),
    };
    let mut parts = body.splitn(3, '-');
    let year_part = parts.next()?;
    if year_part.len() < 4 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let month: u32 = fixed_digits(parts.next()?, 2)?;
    let day: u32 = fixed_digits(parts.next()?, 2)?;
    Some((NaiveDate::from_ymd_opt(sign * year, month, day)?, tz))
}

pub fn parse_time(s: &str) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let (body, tz) = split_timezone(s.trim())?;
    Some((parse_naive_time(body)?, tz))
}

pub fn parse_date_time(s: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let (body, tz) = split_timezone(s.trim())?;
    let (date_part, time_part) = body.split_once('T')?;
    let (date, _) = parse_date(date_part)?;
    if time_part.starts_with("24:00:00") {
        let next = date.succ_opt()?;
        return Some((next.and_time(NaiveTime::MIN), tz));
    }
    Some((date.and_time(parse_naive_time(time_part)?), tz))
}

fn parse_naive_time(body: &str) -> Option<NaiveTime> {
    let mut parts = body.splitn(3, ':');
    let hour: u32 = fixed_digits(parts.next()?, 2)?;
    let minute: u32 = fixed_digits(parts.next()?, 2)?;
    let seconds = parts.next()?;
    let (whole, fraction) = match seconds.split_once('.') {
        Some((w, f)) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => (w, f),
        Some(_) => return None,
        None => (seconds, ""),
    };
    let second: u32 = fixed_digits(whole, 2)?;
    let mut nanos = 0u32;
    for (i, b) in fraction.bytes().take(9).enumerate() {
        nanos += u32::from(b - b'0') * 10u32.pow(8 - u32::try_from(i).ok()?);
    }
    if hour == 24 && minute == 0 && second == 0 && nanos == 0 {
        return Some(NaiveTime::MIN);
    }
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

fn fixed_digits(s: &str, width: usize) -> Option<u32> {
    if s.len() != width || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses `xs:dayTimeDuration` (`-P1DT2H3M4S`) into whole seconds.
pub fn parse_day_time_duration(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let body = s.strip_prefix('P')?;
    let mut days = 0i64;
    let mut hours = 0i64;
    let mut mins = 0i64;
    let mut secs = 0i64;
    let mut cur = String::new();
    let mut time_part = false;
    let mut saw_component = false;
    for ch in body.chars() {
        if ch == 'T' {
            if time_part || !cur.is_empty() {
                return None;
            }
            time_part = true;
            continue;
        }
        if ch.is_ascii_digit() || ch == '.' {
            cur.push(ch);
            continue;
        }
        match ch {
            'D' if !time_part => days = cur.parse::<i64>().ok()?,
            'H' if time_part => hours = cur.parse::<i64>().ok()?,
            'M' if time_part => mins = cur.parse::<i64>().ok()?,
            'S' if time_part => {
                // fractional seconds are truncated to whole seconds
                let whole = cur.split('.').next().unwrap_or_default();
                secs = whole.parse::<i64>().ok()?;
            }
            _ => return None,
        }
        cur.clear();
        saw_component = true;
    }
    if !cur.is_empty() || !saw_component {
        return None;
    }
    let total = days
        .checked_mul(86400)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(mins.checked_mul(60)?)?
        .checked_add(secs)?;
    Some(if negative { -total } else { total })
}

/// Parses `xs:yearMonthDuration` (`-P1Y2M`) into months.
pub fn parse_year_month_duration(s: &str) -> Option<i32> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let body = s.strip_prefix('P')?;
    let mut years = 0i32;
    let mut months = 0i32;
    let mut cur = String::new();
    let mut saw_component = false;
    for ch in body.chars() {
        if ch.is_ascii_digit() {
            cur.push(ch);
            continue;
        }
        match ch {
            'Y' => years = cur.parse::<i32>().ok()?,
            'M' => months = cur.parse::<i32>().ok()?,
            _ => return None,
        }
        cur.clear();
        saw_component = true;
    }
    if !cur.is_empty() || !saw_component {
        return None;
    }
    let total = years.checked_mul(12)?.checked_add(months)?;
    Some(if negative { -total } else { total })
}

pub fn format_timezone(tz: FixedOffset) -> String {
    let secs = tz.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

fn format_optional_tz(tz: Option<FixedOffset>) -> String {
    tz.map(format_timezone).unwrap_or_default()
}

fn format_naive_time(time: NaiveTime) -> String {
    let base = time.format("%H:%M:%S").to_string();
    let nanos = time.nanosecond();
    if nanos == 0 {
        return base;
    }
    let fraction = format!("{nanos:09}");
    format!("{base}.{}", fraction.trim_end_matches('0'))
}

pub fn format_date(date: NaiveDate, tz: Option<FixedOffset>) -> String {
    format!("{}{}", date.format("%Y-%m-%d"), format_optional_tz(tz))
}

pub fn format_time(time: NaiveTime, tz: Option<FixedOffset>) -> String {
    format!("{}{}", format_naive_time(time), format_optional_tz(tz))
}

pub fn format_date_time(value: NaiveDateTime, tz: Option<FixedOffset>) -> String {
    format!(
        "{}T{}{}",
        value.date().format("%Y-%m-%d"),
        format_naive_time(value.time()),
        format_optional_tz(tz)
    )
}

pub fn format_day_time_duration(total: i64) -> String {
    if total == 0 {
        return "PT0S".to_string();
    }
    let sign = if total < 0 { "-" } else { "" };
    let abs = total.unsigned_abs();
    let (days, rem) = (abs / 86400, abs % 86400);
    let (hours, rem) = (rem / 3600, rem % 3600);
    let (mins, secs) = (rem / 60, rem % 60);
    let mut out = format!("{sign}P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || mins > 0 || secs > 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if mins > 0 {
            out.push_str(&format!("{mins}M"));
        }
        if secs > 0 {
            out.push_str(&format!("{secs}S"));
        }
    }
    out
}

pub fn format_year_month_duration(total: i32) -> String {
    if total == 0 {
        return "P0M".to_string();
    }
    let sign = if total < 0 { "-" } else { "" };
    let abs = total.unsigned_abs();
    let (years, months) = (abs / 12, abs % 12);
    let mut out = format!("{sign}P");
    if years > 0 {
        out.push_str(&format!("{years}Y"));
    }
    if months > 0 {
        out.push_str(&format!("{months}M"));
    }
    out
}
