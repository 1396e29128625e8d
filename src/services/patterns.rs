use lazy_static::lazy_static;
use regex::Regex;

/// Section marker opening one cinema block in a structured showtime response.
pub const CINEMA_SECTION_MARKER: &str = "## [CINEMA]";

pub const DEFAULT_PRICE: &str = "$12.99";
pub const DEFAULT_FORMAT: &str = "Standard";

lazy_static! {
    /// Keywords that route a query to the showtimes screen. Checked before
    /// every other bucket.
    pub static ref SHOWTIME_KEYWORDS: Vec<&'static str> = vec![
        "showtime",
        "showtimes",
        "show time",
        "show times",
        "screening",
        "screenings",
        "what's playing",
        "whats playing",
        "playing at",
        "playing near",
        "what time is",
    ];

    /// Phrases that route to the now-playing movie gallery.
    pub static ref NOW_PLAYING_PHRASES: Vec<&'static str> = vec![
        "now playing",
        "in theaters",
        "in theatres",
        "in cinemas",
        "currently showing",
        "new releases",
        "latest movies",
        "movies out now",
        "current movies",
    ];

    /// Phrases that route to the nearby-cinemas gallery.
    pub static ref NEARBY_CINEMA_PHRASES: Vec<&'static str> = vec![
        "near me",
        "nearby",
        "cinemas near",
        "theaters near",
        "theatres near",
        "closest cinema",
        "closest theater",
        "movie theaters",
        "movie theatres",
        "cinemas in",
    ];

    /// Phrases that route back to the start screen.
    pub static ref HOME_PHRASES: Vec<&'static str> = vec![
        "go home",
        "home screen",
        "start screen",
        "start over",
        "main menu",
        "go back to the start",
    ];

    /// Broader search-intent keywords; these set the web-search flag without
    /// choosing a screen.
    pub static ref SEARCH_INTENT_KEYWORDS: Vec<&'static str> = vec![
        "search",
        "find",
        "look up",
        "lookup",
        "tell me about",
        "what is",
        "who is",
        "who directed",
        "when did",
        "where is",
        "how long",
        "recommend",
    ];

    /// Full phrases that mean "showtimes in general, no particular movie".
    pub static ref GENERIC_SHOWTIME_PHRASES: Vec<&'static str> = vec![
        "movie showtimes",
        "showtimes near me",
        "what's playing",
        "whats playing",
        "what is playing",
        "screening times",
        "movie times",
        "showtimes today",
        "showtimes tonight",
        "anything playing",
    ];

    /// Substrings whose presence marks a showtime query as referring to a
    /// specific movie.
    pub static ref SPECIFIC_REFERENCE_MARKERS: Vec<&'static str> =
        vec![" for ", " of ", "part ", "episode "];

    /// "for the X" / "of the X" / "for X" / "of X" — a definite reference
    /// that overrides a generic-phrase match.
    pub static ref DEFINITE_REFERENCE_RE: Regex =
        Regex::new(r"(?i)\b(?:for|of)\s+(?:the\s+)?\S+").unwrap();

    /// Tagged title markup, the authoritative shape in assistant responses.
    pub static ref TAGGED_MOVIE_RE: Regex =
        Regex::new(r"(?i)\[MOVIE\]\s*(.*?)\s*\[/MOVIE\]").unwrap();

    /// "Title (Year)" appearing anywhere in running text.
    pub static ref BARE_TITLE_YEAR_RE: Regex =
        Regex::new(r#""?([A-Z][\w:'&!,\.\- ]{1,80}?)"?\s*\((\d{4})\)"#).unwrap();

    /// "1. Title (Year)" numbered-list lines.
    pub static ref NUMBERED_TITLE_YEAR_RE: Regex =
        Regex::new(r"(?m)^\s*\d+\.\s*(.+?)\s*\((\d{4})\)").unwrap();

    /// "- Title (Year)" bullet lines.
    pub static ref BULLET_TITLE_YEAR_RE: Regex =
        Regex::new(r"(?m)^\s*[-*•]\s*(.+?)\s*\((\d{4})\)").unwrap();

    /// Ordered phrasings a user reaches for when asking about one movie's
    /// showtimes. Only the first match is used.
    pub static ref USER_TITLE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bshow\s*times?\s+(?:for|of)\s+(.+?)(?:\s+(?:near|at|in|on|tonight|today|tomorrow|this)\b.*)?$").unwrap(),
        Regex::new(r"(?i)\bwhen\s+is\s+(.+?)\s+(?:playing|showing|screening)\b").unwrap(),
        Regex::new(r"(?i)\b(?:tickets?|screenings?|times?)\s+(?:for|of)\s+(.+?)(?:\s+(?:near|at|in|on|tonight|today|tomorrow)\b.*)?$").unwrap(),
        Regex::new(r"(?i)\b(?:watch|see|is)\s+(.+?)\s+(?:playing|showing|still\s+in\s+theaters)\b").unwrap(),
    ];

    /// Default phrases that disqualify a capture from being a title; the
    /// extractor extends this list from configuration.
    pub static ref DEFAULT_EXCLUSION_PHRASES: Vec<&'static str> = vec![
        "director of",
        "directed by",
        "starring",
        "here are",
        "based on",
        "the cast of",
        "a sequel to",
        "review of",
        "movies like",
    ];

    /// Movie-level "not showing anywhere" phrasings, checked against the
    /// whole response.
    pub static ref NOT_SHOWING_PHRASES: Vec<&'static str> = vec![
        "not currently showing",
        "is not showing",
        "isn't showing",
        "is not playing",
        "not playing in theaters",
        "no longer in theaters",
        "no longer showing",
        "not showing in any theaters",
        "could not find any showtimes",
        "couldn't find any showtimes",
        "no theaters are showing",
    ];

    /// Cinema-level "this theater has nothing" phrasings, checked against a
    /// single showtimes block.
    pub static ref NO_SHOWTIMES_BLOCK_PHRASES: Vec<&'static str> = vec![
        "no showtimes available",
        "no showtimes listed",
        "no screenings scheduled",
        "sold out for today",
    ];

    /// "## [SHOWTIMES ...]" sub-marker inside a cinema section.
    pub static ref SHOWTIMES_MARKER_RE: Regex =
        Regex::new(r"##\s*\[SHOWTIMES[^\]]*\]").unwrap();

    /// "**Address:** ..." line (the bold markers are optional so the
    /// line-oriented fallback can reuse it).
    pub static ref ADDRESS_LINE_RE: Regex =
        Regex::new(r"(?im)^\s*\*{0,2}Address:?\*{0,2}:?\s*(.+)$").unwrap();

    /// "**Ticket Prices:** ..." line.
    pub static ref PRICES_LINE_RE: Regex =
        Regex::new(r"(?im)^\s*\*{0,2}Ticket\s+Prices?:?\*{0,2}:?\s*(.+)$").unwrap();

    /// "(2.3 miles)" distance parenthetical.
    pub static ref DISTANCE_RE: Regex =
        Regex::new(r"\((\d+(?:\.\d+)?\s*(?:miles?|mi|km))\)").unwrap();

    /// "H:MM AM ($12.99) [IMAX]" token run; price and format are optional
    /// but the colon is not, so looser time shapes fall through to the
    /// weaker strategies.
    pub static ref INLINE_SHOWTIME_RE: Regex = Regex::new(
        r"(?i)\b(\d{1,2}):(\d{2})\s*(AM|PM)\b(?:\s*\(\$(\d+(?:\.\d{2})?)\))?(?:\s*\[([^\]]+)\])?"
    ).unwrap();

    /// Loosest time shape: "7pm", "7.30 pm", "10:15am".
    pub static ref LOOSE_TIME_RE: Regex =
        Regex::new(r"(?i)\b(\d{1,2})[:.]?(\d{2})?\s*(am|pm)\b").unwrap();

    /// "$12.99" or "$12".
    pub static ref PRICE_RE: Regex = Regex::new(r"\$\d+(?:\.\d{2})?").unwrap();

    /// "[IMAX]"-style bracket token; also used for cinema-name citations in
    /// free text.
    pub static ref BRACKET_TOKEN_RE: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();

    /// Presentation formats that count even without brackets.
    pub static ref FORMAT_KEYWORDS: Vec<&'static str> =
        vec!["IMAX", "3D", "4DX", "Dolby", "70mm"];

    /// "- ..." bullet lines.
    pub static ref BULLET_LINE_RE: Regex = Regex::new(r"^\s*[-*•]\s*(.+)$").unwrap();

    /// Leading "1. ", "2) " or bullet markers on a candidate title.
    pub static ref ORDINAL_PREFIX_RE: Regex =
        Regex::new(r"^\s*(?:\d+[.)]\s*|[-*•]\s+)").unwrap();

    /// Trailing "(1999)" on a candidate title.
    pub static ref PAREN_YEAR_RE: Regex = Regex::new(r"\((\d{4})\)\s*$").unwrap();

    /// Trailing "- 1999" / "— 1999" on a candidate title.
    pub static ref DASH_YEAR_RE: Regex = Regex::new(r"[-–—]\s*(\d{4})\s*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_movie_captures_inner_text() {
        let caps = TAGGED_MOVIE_RE
            .captures("Sure! [MOVIE]Dune (2021)[/MOVIE] is playing.")
            .unwrap();
        assert_eq!(&caps[1], "Dune (2021)");
    }

    #[test]
    fn distance_matches_all_units() {
        for text in ["(2.3 miles)", "(1 mile)", "(0.8 mi)", "(3 km)"] {
            assert!(DISTANCE_RE.is_match(text), "no match for {}", text);
        }
        assert!(!DISTANCE_RE.is_match("(very close)"));
    }

    #[test]
    fn inline_showtime_captures_optional_parts() {
        let caps = INLINE_SHOWTIME_RE.captures("- 10:15 AM ($12.99) [IMAX]").unwrap();
        assert_eq!(&caps[1], "10");
        assert_eq!(&caps[2], "15");
        assert_eq!(&caps[4], "12.99");
        assert_eq!(&caps[5], "IMAX");

        // Colon-less times belong to the looser strategies.
        assert!(INLINE_SHOWTIME_RE.captures("7 PM").is_none());
        assert!(LOOSE_TIME_RE.is_match("7 PM"));
    }

    #[test]
    fn address_line_matches_with_and_without_bold() {
        let caps = ADDRESS_LINE_RE.captures("**Address:** 234 W 42nd St").unwrap();
        assert_eq!(caps[1].trim(), "234 W 42nd St");
        let caps = ADDRESS_LINE_RE.captures("Address: 1 Main St").unwrap();
        assert_eq!(caps[1].trim(), "1 Main St");
    }
}
