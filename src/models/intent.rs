use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of screens the conversational layer can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenType {
    MovieGallery,
    MovieDetails,
    CinemaGallery,
    CinemaDetails,
    MovieShowtimes,
    StartScreen,
}

impl ScreenType {
    /// Screens whose content must come from a live web lookup rather than
    /// the local catalog or static chrome.
    pub fn requires_live_data(&self) -> bool {
        matches!(
            self,
            ScreenType::MovieGallery
                | ScreenType::CinemaGallery
                | ScreenType::CinemaDetails
                | ScreenType::MovieShowtimes
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenType::MovieGallery => "MOVIE_GALLERY",
            ScreenType::MovieDetails => "MOVIE_DETAILS",
            ScreenType::CinemaGallery => "CINEMA_GALLERY",
            ScreenType::CinemaDetails => "CINEMA_DETAILS",
            ScreenType::MovieShowtimes => "MOVIE_SHOWTIMES",
            ScreenType::StartScreen => "START_SCREEN",
        }
    }
}

impl FromStr for ScreenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches(|c| c == '"' || c == '.').to_uppercase().as_str() {
            "MOVIE_GALLERY" => Ok(ScreenType::MovieGallery),
            "MOVIE_DETAILS" => Ok(ScreenType::MovieDetails),
            "CINEMA_GALLERY" => Ok(ScreenType::CinemaGallery),
            "CINEMA_DETAILS" => Ok(ScreenType::CinemaDetails),
            "MOVIE_SHOWTIMES" => Ok(ScreenType::MovieShowtimes),
            "START_SCREEN" => Ok(ScreenType::StartScreen),
            other => Err(format!("unknown screen type: {}", other)),
        }
    }
}

/// Outcome of classifying one user utterance. `screen == None` means
/// "no screen change, answer conversationally".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntentResult {
    pub screen: Option<ScreenType>,
    pub use_web_search: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_type_round_trips_through_str() {
        for screen in [
            ScreenType::MovieGallery,
            ScreenType::MovieDetails,
            ScreenType::CinemaGallery,
            ScreenType::CinemaDetails,
            ScreenType::MovieShowtimes,
            ScreenType::StartScreen,
        ] {
            assert_eq!(screen.as_str().parse::<ScreenType>(), Ok(screen));
        }
    }

    #[test]
    fn invalid_screen_type_is_rejected() {
        assert!("SETTINGS_SCREEN".parse::<ScreenType>().is_err());
        assert!("".parse::<ScreenType>().is_err());
    }

    #[test]
    fn live_data_screens() {
        assert!(ScreenType::MovieShowtimes.requires_live_data());
        assert!(ScreenType::CinemaGallery.requires_live_data());
        assert!(!ScreenType::StartScreen.requires_live_data());
        assert!(!ScreenType::MovieDetails.requires_live_data());
    }
}
