use crate::models::intent::ScreenType;
use serde::Serialize;

/// Every movie title and cinema name found in one assistant response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedEntities {
    /// "Title (Year)" when the year is known, first-seen order.
    pub movie_titles: Vec<String>,
    /// Official names only, no descriptive trailing text.
    pub cinema_names: Vec<String>,
    pub has_multiple_movies: bool,
    pub has_multiple_cinemas: bool,
    pub primary_movie: Option<String>,
    pub primary_cinema: Option<String>,
}

impl ExtractedEntities {
    /// Builds the struct so the multiplicity flags and primaries always
    /// agree with the lists.
    pub fn from_parts(movie_titles: Vec<String>, cinema_names: Vec<String>) -> Self {
        let has_multiple_movies = movie_titles.len() > 1;
        let has_multiple_cinemas = cinema_names.len() > 1;
        let primary_movie = movie_titles.first().cloned();
        let primary_cinema = cinema_names.first().cloned();
        Self {
            movie_titles,
            cinema_names,
            has_multiple_movies,
            has_multiple_cinemas,
            primary_movie,
            primary_cinema,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movie_titles.is_empty() && self.cinema_names.is_empty()
    }
}

/// A single screening slot at one cinema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowtimeDetails {
    /// Normalized "H:MM AM/PM", always with a colon and a space before the
    /// meridiem.
    pub time: String,
    /// Start + 2 hours, rendered the same way; wraps across midnight.
    pub end_time: String,
    /// ISO yyyy-mm-dd.
    pub date: String,
    pub theater: String,
    pub price: String,
    pub format: String,
    pub movie_title: Option<String>,
    pub cinema_distance: Option<String>,
}

/// One cinema discovered in a parsed response, with its showtimes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CinemaShowtimeInfo {
    pub name: String,
    pub address: String,
    pub distance: String,
    pub ticket_prices: String,
    pub showtimes: Vec<ShowtimeDetails>,
}

/// Result of a live showtime lookup for one movie.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShowtimeOutcome {
    /// True when the response said the movie is not showing anywhere; the
    /// cinema list is empty in that case.
    pub no_showtimes_available: bool,
    pub cinemas: Vec<CinemaShowtimeInfo>,
}

/// The structured decision handed to the navigation layer for one user turn.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    Navigate {
        screen: ScreenType,
        entities: ExtractedEntities,
        showtimes: Option<ShowtimeOutcome>,
    },
    /// Zero or too many plausible entities where exactly one was expected;
    /// the user must be re-prompted, never guessed for.
    NeedsClarification { prompt: String },
    Conversational { reply: Option<String> },
}
