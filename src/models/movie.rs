use serde::{Deserialize, Serialize};

/// Where a candidate's release year came from. Years parsed out of the
/// user's own words are stated; years appearing in assistant text may have
/// been made up by the model, so the distinction is kept rather than
/// collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearConfidence {
    Stated,
    Reported,
}

/// A movie title pulled out of free text, with an optional 4-digit year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieCandidate {
    pub title: String,
    pub year: Option<String>,
    /// "Title (Year)" when the year is known, None otherwise.
    pub full_title: Option<String>,
    pub year_confidence: YearConfidence,
}

impl MovieCandidate {
    pub fn new(
        title: impl Into<String>,
        year: Option<String>,
        year_confidence: YearConfidence,
    ) -> Self {
        let title = title.into();
        let full_title = year.as_deref().map(|y| format!("{} ({})", title, y));
        Self {
            title,
            year,
            full_title,
            year_confidence,
        }
    }

    /// "Title (Year)" when the year is known, the bare title otherwise.
    pub fn display_title(&self) -> &str {
        self.full_title.as_deref().unwrap_or(&self.title)
    }
}

/// One movie returned by a catalog title search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMovie {
    pub id: i64,
    pub title: String,
    pub year: Option<String>,
}

/// Full catalog record for a single movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub year: Option<String>,
    pub overview: Option<String>,
    pub runtime: Option<i32>,
    #[serde(default)]
    pub rating: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_title_includes_year_when_known() {
        let with_year =
            MovieCandidate::new("Dune", Some("2021".to_string()), YearConfidence::Reported);
        assert_eq!(with_year.display_title(), "Dune (2021)");

        let without_year = MovieCandidate::new("Dune", None, YearConfidence::Stated);
        assert_eq!(without_year.full_title, None);
        assert_eq!(without_year.display_title(), "Dune");
    }
}
