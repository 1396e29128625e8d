use crate::models::ShowtimeDetails;
use crate::services::patterns;
use chrono::{NaiveDate, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_PARTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*(AM|PM)$").unwrap());

/// Extracts every showtime from one cinema's block of loosely formatted
/// text. Three strategies of descending confidence; the first one that
/// yields anything wins.
pub fn parse_showtime_block(
    block: &str,
    theater: &str,
    movie_title: Option<&str>,
    date: NaiveDate,
) -> Vec<ShowtimeDetails> {
    let (theater_name, distance) = split_trailing_distance(theater);
    let date_str = date.format("%Y-%m-%d").to_string();

    let ctx = BlockContext {
        theater: theater_name,
        distance,
        movie_title,
        date: date_str,
    };

    let mut results = inline_strategy(block, &ctx);
    if results.is_empty() {
        results = bullet_strategy(block, &ctx);
    }
    if results.is_empty() {
        results = loose_strategy(block, &ctx);
    }

    // Lexicographic is chronological here because normalization fixes the
    // "H:MM AM/PM" shape.
    results.sort_by(|a, b| a.time.cmp(&b.time));
    results
}

/// The placeholder entry for a cinema whose block says it has nothing.
pub fn placeholder_showtime(
    theater: &str,
    movie_title: Option<&str>,
    date: NaiveDate,
) -> ShowtimeDetails {
    let (theater_name, distance) = split_trailing_distance(theater);
    ShowtimeDetails {
        time: "No showtimes available".to_string(),
        end_time: String::new(),
        date: date.format("%Y-%m-%d").to_string(),
        theater: theater_name,
        price: "Check theater".to_string(),
        format: patterns::DEFAULT_FORMAT.to_string(),
        movie_title: movie_title.map(|t| t.to_string()),
        cinema_distance: distance,
    }
}

struct BlockContext<'a> {
    theater: String,
    distance: Option<String>,
    movie_title: Option<&'a str>,
    date: String,
}

impl BlockContext<'_> {
    fn showtime(&self, time: String, price: Option<String>, format: Option<String>) -> ShowtimeDetails {
        let end_time = derive_end_time(&time);
        ShowtimeDetails {
            time,
            end_time,
            date: self.date.clone(),
            theater: self.theater.clone(),
            price: price.unwrap_or_else(|| patterns::DEFAULT_PRICE.to_string()),
            format: format.unwrap_or_else(|| patterns::DEFAULT_FORMAT.to_string()),
            movie_title: self.movie_title.map(|t| t.to_string()),
            cinema_distance: self.distance.clone(),
        }
    }
}

/// Strategy 1: "10:15 AM ($12.99) [IMAX]" runs, price and format attached
/// to the time token itself.
fn inline_strategy(block: &str, ctx: &BlockContext) -> Vec<ShowtimeDetails> {
    patterns::INLINE_SHOWTIME_RE
        .captures_iter(block)
        .filter_map(|caps| {
            let time = normalize_time_parts(&caps[1], Some(&caps[2]), &caps[3])?;
            let price = caps.get(4).map(|m| format!("${}", m.as_str()));
            let format = caps.get(5).map(|m| m.as_str().trim().to_string());
            Some(ctx.showtime(time, price, format))
        })
        .collect()
}

/// Strategy 2: bullet lines searched independently for a time, a price and
/// a format. Bare "IMAX"/"3D" substrings count as formats here.
fn bullet_strategy(block: &str, ctx: &BlockContext) -> Vec<ShowtimeDetails> {
    let mut results = Vec::new();
    for line in block.lines() {
        let Some(caps) = patterns::BULLET_LINE_RE.captures(line) else {
            continue;
        };
        let content = &caps[1];
        let Some(time) = first_loose_time(content) else {
            continue;
        };
        let price = patterns::PRICE_RE.find(content).map(|m| m.as_str().to_string());
        let format = find_format(content);
        results.push(ctx.showtime(time, price, format));
    }
    results
}

/// Strategy 3: any time-looking token anywhere, everything else defaulted.
fn loose_strategy(block: &str, ctx: &BlockContext) -> Vec<ShowtimeDetails> {
    patterns::LOOSE_TIME_RE
        .captures_iter(block)
        .filter_map(|caps| {
            let time =
                normalize_time_parts(&caps[1], caps.get(2).map(|m| m.as_str()), &caps[3])?;
            Some(ctx.showtime(time, None, None))
        })
        .collect()
}

fn first_loose_time(text: &str) -> Option<String> {
    let caps = patterns::LOOSE_TIME_RE.captures(text)?;
    normalize_time_parts(&caps[1], caps.get(2).map(|m| m.as_str()), &caps[3])
}

fn find_format(text: &str) -> Option<String> {
    if let Some(caps) = patterns::BRACKET_TOKEN_RE.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    patterns::FORMAT_KEYWORDS
        .iter()
        .find(|f| text.contains(*f))
        .map(|f| f.to_string())
}

/// Renders "H:MM AM/PM": uppercase meridiem, one space before it, ":00"
/// inserted when the source had no minutes.
fn normalize_time_parts(hour: &str, minutes: Option<&str>, meridiem: &str) -> Option<String> {
    let hour: u32 = hour.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let minutes: u32 = match minutes {
        Some(m) if !m.is_empty() => m.parse().ok()?,
        _ => 0,
    };
    if minutes > 59 {
        return None;
    }
    Some(format!("{}:{:02} {}", hour, minutes, meridiem.to_uppercase()))
}

/// Start + 2 hours in the same 12-hour rendering, wrapping across midnight.
fn derive_end_time(time: &str) -> String {
    let Some(caps) = TIME_PARTS_RE.captures(time) else {
        return String::new();
    };
    let hour: u32 = caps[1].parse().unwrap_or(12);
    let minutes: u32 = caps[2].parse().unwrap_or(0);
    let meridiem = caps[3].to_uppercase();

    let hour24 = match (hour % 12, meridiem.as_str()) {
        (h, "PM") => h + 12,
        (h, _) => h,
    };
    let Some(start) = NaiveTime::from_hms_opt(hour24, minutes, 0) else {
        return String::new();
    };
    let end = start + chrono::Duration::hours(2);
    render_12h(end.hour(), end.minute())
}

fn render_12h(hour24: u32, minutes: u32) -> String {
    let meridiem = if hour24 < 12 { "AM" } else { "PM" };
    let hour = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, minutes, meridiem)
}

/// A trailing "(2.3 miles)" on the theater name is pulled out once and
/// removed from the stored name.
fn split_trailing_distance(theater: &str) -> (String, Option<String>) {
    if let Some(caps) = patterns::DISTANCE_RE.captures(theater) {
        let whole = caps.get(0).expect("capture 0 always present");
        if theater[whole.end()..].trim().is_empty() {
            return (
                theater[..whole.start()].trim().to_string(),
                Some(caps[1].trim().to_string()),
            );
        }
    }
    (theater.trim().to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn inline_strategy_parses_price_and_format() {
        let block = "- 10:15 AM ($12.99) [Standard]\n- 1:30 PM ($14.99) [IMAX]";
        let times = parse_showtime_block(block, "AMC Empire 25", Some("Dune"), date());
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].time, "10:15 AM");
        assert_eq!(times[0].price, "$12.99");
        assert_eq!(times[0].format, "Standard");
        assert_eq!(times[0].end_time, "12:15 PM");
        assert_eq!(times[1].time, "1:30 PM");
        assert_eq!(times[1].price, "$14.99");
        assert_eq!(times[1].format, "IMAX");
        assert_eq!(times[1].end_time, "3:30 PM");
    }

    #[test]
    fn bullet_strategy_handles_scattered_tokens() {
        // Times without an inline meridiem-adjacent run still parse per line.
        let block = "- IMAX screening at 7pm, tickets $15.50\n- 3D show, 9.30 pm";
        let times = parse_showtime_block(block, "Regal", None, date());
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].time, "7:00 PM");
        assert_eq!(times[0].price, "$15.50");
        assert_eq!(times[0].format, "IMAX");
        assert_eq!(times[1].time, "9:30 PM");
        assert_eq!(times[1].format, "3D");
    }

    #[test]
    fn loose_strategy_defaults_price_and_format() {
        let times = parse_showtime_block("screenings at 7pm and 9pm", "Regal", None, date());
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].time, "7:00 PM");
        assert_eq!(times[0].price, "$12.99");
        assert_eq!(times[0].format, "Standard");
    }

    #[test]
    fn empty_block_yields_nothing() {
        assert!(parse_showtime_block("", "Regal", None, date()).is_empty());
        assert!(parse_showtime_block("no times mentioned here", "Regal", None, date()).is_empty());
    }

    #[test]
    fn normalized_output_reparses_to_itself() {
        let first = parse_showtime_block("10:15 AM", "AMC", None, date());
        assert_eq!(first[0].time, "10:15 AM");
        let again = parse_showtime_block(&first[0].time, "AMC", None, date());
        assert_eq!(again[0].time, first[0].time);
    }

    #[test]
    fn end_time_wraps_across_midnight() {
        let times = parse_showtime_block("11:30 PM", "AMC", None, date());
        assert_eq!(times[0].end_time, "1:30 AM");

        let noonish = parse_showtime_block("11:00 AM", "AMC", None, date());
        assert_eq!(noonish[0].end_time, "1:00 PM");
    }

    #[test]
    fn results_sort_by_normalized_time_string() {
        let block = "- 1:30 PM ($14.99) [IMAX]\n- 10:15 AM ($12.99) [Standard]";
        let times = parse_showtime_block(block, "AMC", None, date());
        assert_eq!(times[0].time, "10:15 AM");
        assert_eq!(times[1].time, "1:30 PM");
    }

    #[test]
    fn trailing_distance_is_split_from_theater_name() {
        let times = parse_showtime_block("7:00 PM", "AMC Empire 25 (2.3 miles)", None, date());
        assert_eq!(times[0].theater, "AMC Empire 25");
        assert_eq!(times[0].cinema_distance.as_deref(), Some("2.3 miles"));
    }

    #[test]
    fn placeholder_has_fixed_time_and_price() {
        let entry = placeholder_showtime("AMC Empire 25", Some("Dune"), date());
        assert_eq!(entry.time, "No showtimes available");
        assert_eq!(entry.price, "Check theater");
        assert_eq!(entry.movie_title.as_deref(), Some("Dune"));
    }

    #[test]
    fn invalid_hours_are_rejected() {
        assert!(parse_showtime_block("13:00 PM", "AMC", None, date()).is_empty());
        assert!(parse_showtime_block("0:30 AM", "AMC", None, date()).is_empty());
    }
}
