use crate::models::{IntentResult, ScreenType};
use crate::services::patterns;
use crate::services::text_service::TextServiceClient;
use tracing::{debug, warn};

/// Minimum query length before the remote classifier is worth a round trip.
const REMOTE_CLASSIFY_MIN_LEN: usize = 5;

/// Maps raw user text to a screen type plus a "fetch live data" flag.
/// Rule-based keyword buckets run first; a remote classification call is
/// the fallback for anything the rules leave undecided.
pub struct IntentClassifier {
    remote: Option<TextServiceClient>,
}

impl IntentClassifier {
    pub fn new(remote: Option<TextServiceClient>) -> Self {
        Self { remote }
    }

    /// Never fails: a remote error leaves the rule-based result untouched.
    pub async fn classify(&self, user_text: &str) -> IntentResult {
        let mut result = classify_rules(user_text);

        if result.screen.is_none() && user_text.trim().len() > REMOTE_CLASSIFY_MIN_LEN {
            if let Some(client) = &self.remote {
                match client.classify_screen_type(user_text).await {
                    Ok(Some(screen)) => {
                        debug!("Remote classifier chose {}", screen.as_str());
                        result.screen = Some(screen);
                    }
                    Ok(None) => {
                        debug!("Remote classifier returned no usable screen type");
                    }
                    Err(e) => {
                        warn!("Remote classification failed, keeping rule-based result: {}", e);
                    }
                }
            }
        }

        // Live-data screens always need the web, whichever path chose them.
        if result.screen.map_or(false, |s| s.requires_live_data()) {
            result.use_web_search = true;
        }

        result
    }
}

/// The rule-based half of classification: fixed keyword buckets tested in
/// priority order, first match wins.
pub fn classify_rules(user_text: &str) -> IntentResult {
    let text = user_text.to_lowercase();
    let mut result = IntentResult::default();

    if patterns::SHOWTIME_KEYWORDS.iter().any(|k| text.contains(k)) {
        result.screen = Some(ScreenType::MovieShowtimes);
    } else if patterns::NOW_PLAYING_PHRASES.iter().any(|p| text.contains(p)) {
        result.screen = Some(ScreenType::MovieGallery);
    } else if patterns::NEARBY_CINEMA_PHRASES.iter().any(|p| text.contains(p)) {
        result.screen = Some(ScreenType::CinemaGallery);
    } else if patterns::HOME_PHRASES.iter().any(|p| text.contains(p)) {
        result.screen = Some(ScreenType::StartScreen);
    } else if patterns::SEARCH_INTENT_KEYWORDS.iter().any(|k| text.contains(k)) {
        result.use_web_search = true;
    }

    if result.screen.map_or(false, |s| s.requires_live_data()) {
        result.use_web_search = true;
    }

    result
}

/// Decides whether a showtime-flavored query named a concrete movie or the
/// user has to be re-prompted. Only meaningful after classification chose
/// the showtimes screen.
pub fn is_generic_showtime_query(user_text: &str) -> bool {
    let text = user_text.to_lowercase();
    let has_keyword = patterns::SHOWTIME_KEYWORDS.iter().any(|k| text.contains(k));

    // A definite reference ("showtimes for the Batman") wins over any
    // generic-phrase match.
    if has_keyword && patterns::DEFINITE_REFERENCE_RE.is_match(&text) {
        return false;
    }

    if patterns::GENERIC_SHOWTIME_PHRASES.iter().any(|p| text.contains(p)) {
        return true;
    }

    has_keyword
        && !patterns::SPECIFIC_REFERENCE_MARKERS
            .iter()
            .any(|m| text.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showtime_bucket_wins_over_later_buckets() {
        let result = classify_rules("showtimes near me tonight");
        assert_eq!(result.screen, Some(ScreenType::MovieShowtimes));
        assert!(result.use_web_search);
    }

    #[test]
    fn now_playing_routes_to_movie_gallery() {
        let result = classify_rules("what movies are in theaters right now");
        assert_eq!(result.screen, Some(ScreenType::MovieGallery));
        assert!(result.use_web_search);
    }

    #[test]
    fn nearby_routes_to_cinema_gallery() {
        let result = classify_rules("cinemas near downtown");
        assert_eq!(result.screen, Some(ScreenType::CinemaGallery));
        assert!(result.use_web_search);
    }

    #[test]
    fn home_phrases_do_not_trigger_web_search() {
        let result = classify_rules("take me to the main menu");
        assert_eq!(result.screen, Some(ScreenType::StartScreen));
        assert!(!result.use_web_search);
    }

    #[test]
    fn search_keywords_set_web_flag_without_a_screen() {
        let result = classify_rules("tell me about Denis Villeneuve");
        assert_eq!(result.screen, None);
        assert!(result.use_web_search);
    }

    #[test]
    fn small_talk_matches_nothing() {
        let result = classify_rules("thanks!");
        assert_eq!(result.screen, None);
        assert!(!result.use_web_search);
    }

    #[test]
    fn generic_showtime_phrases_are_generic() {
        assert!(is_generic_showtime_query("movie showtimes"));
        assert!(is_generic_showtime_query("what's playing"));
        assert!(is_generic_showtime_query("screening times please"));
        assert!(is_generic_showtime_query("showtimes"));
    }

    #[test]
    fn definite_reference_overrides_generic_phrase() {
        // Superficially generic by keyword alone, but "for the" makes it
        // a specific request.
        assert!(!is_generic_showtime_query("showtimes for the Batman"));
        assert!(!is_generic_showtime_query("showtimes of the Godfather"));
        assert!(!is_generic_showtime_query("showtimes for Dune"));
    }

    #[test]
    fn specific_marker_without_keyword_is_not_generic() {
        assert!(!is_generic_showtime_query("when is Dune part two screening"));
    }
}
