// Re-export the pipeline's data model
pub use intent::{IntentResult, ScreenType};
pub use movie::{CandidateMovie, MovieCandidate, MovieDetails, YearConfidence};
pub use showtime::{
    CinemaShowtimeInfo, ExtractedEntities, ShowtimeDetails, ShowtimeOutcome, TurnOutcome,
};

mod intent;
mod movie;
mod showtime;
