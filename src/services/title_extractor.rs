use crate::models::{ExtractedEntities, MovieCandidate, YearConfidence};
use crate::services::patterns;
use crate::services::text_service::NormalizedResponse;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Which side of the conversation a piece of text came from. User queries
/// and assistant responses carry titles in very different shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    UserQuery,
    AssistantResponse,
}

/// Extracts movie titles and cinema names from free text. Tagged markup is
/// authoritative; everything else is a descending-confidence fallback.
pub struct TitleExtractor {
    exclusion_phrases: Vec<String>,
}

impl Default for TitleExtractor {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl TitleExtractor {
    /// `extra_exclusions` extends the built-in list of phrases that
    /// disqualify a capture from being a title.
    pub fn new(extra_exclusions: &[String]) -> Self {
        let mut exclusion_phrases: Vec<String> = patterns::DEFAULT_EXCLUSION_PHRASES
            .iter()
            .map(|p| p.to_string())
            .collect();
        exclusion_phrases.extend(extra_exclusions.iter().map(|p| p.to_lowercase()));
        Self { exclusion_phrases }
    }

    /// Extracts the single best movie title from one piece of text, or None.
    pub fn extract_single_title(&self, text: &str, source: TitleSource) -> Option<MovieCandidate> {
        match source {
            TitleSource::UserQuery => self.extract_from_user_query(text),
            TitleSource::AssistantResponse => self.extract_from_assistant_text(text),
        }
    }

    /// User queries rarely carry a year, so this mode only tries the
    /// showtime-query phrasings and never falls through to year patterns.
    fn extract_from_user_query(&self, text: &str) -> Option<MovieCandidate> {
        for pattern in patterns::USER_TITLE_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(text) {
                if let Some(m) = caps.get(1) {
                    let cleaned = clean_query_capture(m.as_str());
                    if cleaned.len() > 1 {
                        debug!("Extracted title from user query: {}", cleaned);
                        return Some(MovieCandidate::new(cleaned, None, YearConfidence::Stated));
                    }
                }
            }
        }
        None
    }

    fn extract_from_assistant_text(&self, text: &str) -> Option<MovieCandidate> {
        if let Some(caps) = patterns::TAGGED_MOVIE_RE.captures(text) {
            if let Some((title, year)) = clean_title_candidate(&caps[1]) {
                return Some(MovieCandidate::new(title, year, YearConfidence::Reported));
            }
        }

        let shapes: [&Regex; 3] = [
            &patterns::BARE_TITLE_YEAR_RE,
            &patterns::NUMBERED_TITLE_YEAR_RE,
            &patterns::BULLET_TITLE_YEAR_RE,
        ];
        for shape in shapes {
            for caps in shape.captures_iter(text) {
                // Re-attach the captured year so the cleaner's
                // parenthetical-over-dash preference applies to titles that
                // themselves end in a dash-number.
                let raw = format!("{} ({})", &caps[1], &caps[2]);
                let Some((title, year)) = clean_title_candidate(&raw) else {
                    continue;
                };
                // Descriptive sentences ("the director of X (1999)...") are
                // not titles.
                if self.is_excluded(&title) {
                    continue;
                }
                return Some(MovieCandidate::new(title, year, YearConfidence::Reported));
            }
        }
        None
    }

    /// Pulls every movie title out of an assistant response. Tagged markup,
    /// when present at all, is trusted exclusively; otherwise each line is
    /// run through the single-title extractor.
    pub fn extract_all_titles(&self, text: &str) -> Vec<MovieCandidate> {
        let mut titles = Vec::new();
        let mut seen = HashSet::new();

        for caps in patterns::TAGGED_MOVIE_RE.captures_iter(text) {
            if let Some((title, year)) = clean_title_candidate(&caps[1]) {
                if seen.insert(dedup_key(&title, year.as_deref())) {
                    titles.push(MovieCandidate::new(title, year, YearConfidence::Reported));
                }
            }
        }
        if !titles.is_empty() {
            debug!("Found {} tagged titles, skipping heuristics", titles.len());
            return titles;
        }

        for line in text.lines() {
            if let Some(candidate) = self.extract_from_assistant_text(line) {
                if candidate.title.len() > 2
                    && seen.insert(dedup_key(&candidate.title, candidate.year.as_deref()))
                {
                    titles.push(candidate);
                }
            }
        }
        titles
    }

    /// Pulls cinema names out of a response: citation titles when the
    /// service returned any, bracket tokens in the text otherwise.
    pub fn extract_cinema_names(&self, response: &NormalizedResponse) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();

        for title in &response.citations {
            let trimmed = title.trim();
            let lower = trimmed.to_lowercase();
            if trimmed.len() <= 3
                || lower.contains("google")
                || lower.contains("search")
                || lower.contains("map")
            {
                continue;
            }
            if seen.insert(lower) {
                names.push(trimmed.to_string());
            }
        }
        if !names.is_empty() {
            return names;
        }

        for caps in patterns::BRACKET_TOKEN_RE.captures_iter(&response.text) {
            let inner = caps[1].trim();
            let lower = inner.to_lowercase();
            if inner.len() <= 3 || lower.contains("here are") {
                continue;
            }
            if is_markup_token(inner) {
                continue;
            }
            if seen.insert(lower) {
                names.push(inner.to_string());
            }
        }
        names
    }

    /// Every movie title and cinema name in one response, with the
    /// multiplicity flags the navigation layer keys off.
    pub fn extract_entities(&self, response: &NormalizedResponse) -> ExtractedEntities {
        let movie_titles = self
            .extract_all_titles(&response.text)
            .iter()
            .map(|c| c.display_title().to_string())
            .collect();
        let cinema_names = self.extract_cinema_names(response);
        ExtractedEntities::from_parts(movie_titles, cinema_names)
    }

    fn is_excluded(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.exclusion_phrases.iter().any(|p| lower.starts_with(p))
    }
}

/// The pipeline's own section markup and format tokens must not be mistaken
/// for cinema names.
fn is_markup_token(inner: &str) -> bool {
    let upper = inner.to_uppercase();
    upper == "MOVIE"
        || upper == "/MOVIE"
        || upper.starts_with("CINEMA")
        || upper.starts_with("SHOWTIMES")
        || patterns::FORMAT_KEYWORDS
            .iter()
            .any(|f| upper == f.to_uppercase())
}

/// Cleans a raw title candidate: strips list markers, markdown emphasis and
/// quotes, then splits a trailing year. The parenthetical form wins when
/// both year shapes could match. Returns None when nothing is left.
pub fn clean_title_candidate(raw: &str) -> Option<(String, Option<String>)> {
    let stripped = patterns::ORDINAL_PREFIX_RE.replace(raw, "");
    let unquoted = stripped
        .replace('*', "")
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}'))
        .trim()
        .to_string();

    let (title, year) = if let Some(caps) = patterns::PAREN_YEAR_RE.captures(&unquoted) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(unquoted.len());
        (unquoted[..start].to_string(), Some(caps[1].to_string()))
    } else if let Some(caps) = patterns::DASH_YEAR_RE.captures(&unquoted) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(unquoted.len());
        (unquoted[..start].to_string(), Some(caps[1].to_string()))
    } else {
        (unquoted, None)
    };

    // The year split can leave a closing quote behind.
    let title = title
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}'))
        .trim()
        .to_string();

    if title.is_empty() {
        None
    } else {
        Some((title, year))
    }
}

/// Case-insensitive dedup key: first occurrence of a (title, year) pair
/// wins, later duplicates are dropped.
pub fn dedup_key(title: &str, year: Option<&str>) -> String {
    format!("{}|{}", title.to_lowercase(), year.unwrap_or(""))
}

fn clean_query_capture(raw: &str) -> String {
    let mut s = raw.trim();
    if s.to_lowercase().starts_with("the movie ") {
        s = &s["the movie ".len()..];
    }
    s.trim()
        .trim_end_matches(['.', ',', '!', '?', ':', ';'])
        .trim()
        .to_string()
}
