use crate::models::CinemaShowtimeInfo;
use crate::services::patterns;
use crate::services::showtime_tokens::{parse_showtime_block, placeholder_showtime};
use chrono::NaiveDate;
use tracing::debug;

/// True when the response as a whole says the movie is not showing
/// anywhere. Checked before any per-cinema parsing is attempted.
pub fn mentions_no_showtimes(text: &str) -> bool {
    let lower = text.to_lowercase();
    patterns::NOT_SHOWING_PHRASES.iter().any(|p| lower.contains(p))
}

/// Parses a multi-cinema showtime response into per-cinema collections.
/// The structured "## [CINEMA]" markup is tried first; a line-oriented
/// strategy covers responses that ignored the expected format.
pub fn parse_cinema_sections(
    text: &str,
    movie_title: Option<&str>,
    date: NaiveDate,
) -> Vec<CinemaShowtimeInfo> {
    let mut cinemas = parse_marked_sections(text, movie_title, date);
    if cinemas.is_empty() {
        debug!("No marked cinema sections, trying line-oriented fallback");
        cinemas = parse_line_oriented(text, movie_title, date);
    }
    cinemas
}

fn parse_marked_sections(
    text: &str,
    movie_title: Option<&str>,
    date: NaiveDate,
) -> Vec<CinemaShowtimeInfo> {
    let mut sections = text.split(patterns::CINEMA_SECTION_MARKER);
    sections.next(); // preamble before the first marker

    sections
        .filter_map(|section| parse_one_section(section, movie_title, date))
        .collect()
}

fn parse_one_section(
    section: &str,
    movie_title: Option<&str>,
    date: NaiveDate,
) -> Option<CinemaShowtimeInfo> {
    let header = section.lines().next().unwrap_or("").trim();

    // Name is the first run of header text outside any parenthetical.
    let name = header
        .split('(')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if name.is_empty() {
        // Nameless sections are dropped without comment.
        return None;
    }

    let distance = patterns::DISTANCE_RE
        .captures(header)
        .map(|caps| caps[1].trim().to_string());
    let address = patterns::ADDRESS_LINE_RE
        .captures(section)
        .map(|caps| caps[1].trim().to_string());
    let prices = patterns::PRICES_LINE_RE
        .captures(section)
        .map(|caps| caps[1].trim().to_string());

    let block = showtimes_block(section);
    let showtimes = if block_reports_nothing(block) {
        vec![placeholder_showtime(header, movie_title, date)]
    } else {
        parse_showtime_block(block, header, movie_title, date)
    };

    Some(CinemaShowtimeInfo {
        name,
        address: address.unwrap_or_default(),
        distance: distance.unwrap_or_default(),
        ticket_prices: prices.unwrap_or_default(),
        showtimes,
    })
}

/// The showtimes block is whatever follows the "## [SHOWTIMES...]" marker,
/// or failing that the text after the ticket-price line, up to the next
/// "##" heading or the end of the section.
fn showtimes_block(section: &str) -> &str {
    if let Some(m) = patterns::SHOWTIMES_MARKER_RE.find(section) {
        return until_next_heading(&section[m.end()..]);
    }
    if let Some(m) = patterns::PRICES_LINE_RE.find(section) {
        return until_next_heading(&section[m.end()..]);
    }
    // No structure at all; everything after the header line.
    match section.find('\n') {
        Some(idx) => &section[idx + 1..],
        None => "",
    }
}

fn until_next_heading(text: &str) -> &str {
    match text.find("##") {
        Some(idx) => &text[..idx],
        None => text,
    }
}

fn block_reports_nothing(block: &str) -> bool {
    let lower = block.to_lowercase();
    patterns::NO_SHOWTIMES_BLOCK_PHRASES
        .iter()
        .any(|p| lower.contains(p))
}

/// Fallback for unstructured responses: a non-bulleted, non-heading line
/// with a colon starts a cinema ("Name: trailing text"), label lines fill
/// in address and prices, and time-bearing lines attach to the most
/// recently started cinema.
fn parse_line_oriented(
    text: &str,
    movie_title: Option<&str>,
    date: NaiveDate,
) -> Vec<CinemaShowtimeInfo> {
    struct PendingCinema {
        name: String,
        address: String,
        prices: String,
        block: String,
    }

    let mut pending: Vec<PendingCinema> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = patterns::ADDRESS_LINE_RE.captures(trimmed) {
            if let Some(current) = pending.last_mut() {
                current.address = caps[1].trim().to_string();
            }
            continue;
        }
        if let Some(caps) = patterns::PRICES_LINE_RE.captures(trimmed) {
            if let Some(current) = pending.last_mut() {
                current.prices = caps[1].trim().to_string();
            }
            continue;
        }

        if patterns::LOOSE_TIME_RE.is_match(trimmed) {
            if let Some(current) = pending.last_mut() {
                current.block.push_str(line);
                current.block.push('\n');
            }
            continue;
        }

        if !patterns::BULLET_LINE_RE.is_match(trimmed) {
            if let Some(idx) = trimmed.find(':') {
                let name = trimmed[..idx].trim();
                if !name.is_empty() {
                    pending.push(PendingCinema {
                        name: name.to_string(),
                        address: String::new(),
                        prices: String::new(),
                        block: String::new(),
                    });
                }
            }
        }
    }

    pending
        .into_iter()
        .map(|cinema| {
            let showtimes = parse_showtime_block(&cinema.block, &cinema.name, movie_title, date);
            CinemaShowtimeInfo {
                name: cinema.name,
                address: cinema.address,
                distance: String::new(),
                ticket_prices: cinema.prices,
                showtimes,
            }
        })
        .collect()
}
