use crate::error::{PipelineError, Result};
use crate::models::{CandidateMovie, MovieDetails};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Client for the canonical movie/cinema catalog.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawMovie>,
}

#[derive(Debug, Deserialize)]
struct RawMovie {
    id: i64,
    title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    id: i64,
    title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    overview: Option<String>,
    runtime: Option<i32>,
    #[serde(default)]
    vote_average: f32,
}

impl CatalogClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn search_by_title(&self, text: &str) -> Result<Vec<CandidateMovie>> {
        let url = format!("{}/search/movie", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", text)])
            .send()
            .await
            .map_err(|e| PipelineError::CatalogError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: SearchResponse = response
                    .json()
                    .await
                    .map_err(|e| PipelineError::SerializationError(e.to_string()))?;
                let candidates: Vec<CandidateMovie> = body
                    .results
                    .into_iter()
                    .filter_map(|raw| {
                        Some(CandidateMovie {
                            id: raw.id,
                            title: raw.title?,
                            year: release_year(raw.release_date.as_deref()),
                        })
                    })
                    .collect();
                debug!("Catalog returned {} candidates for '{}'", candidates.len(), text);
                Ok(candidates)
            }
            status => Err(PipelineError::CatalogError(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }

    pub async fn get_details(&self, id: i64) -> Result<MovieDetails> {
        let url = format!("{}/movie/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PipelineError::CatalogError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let raw: RawDetails = response
                    .json()
                    .await
                    .map_err(|e| PipelineError::SerializationError(e.to_string()))?;
                Ok(MovieDetails {
                    id: raw.id,
                    title: raw.title.unwrap_or_default(),
                    year: release_year(raw.release_date.as_deref()),
                    overview: raw.overview,
                    runtime: raw.runtime,
                    rating: raw.vote_average,
                })
            }
            StatusCode::NOT_FOUND => {
                Err(PipelineError::NotFound(format!("Movie {} not found", id)))
            }
            status => Err(PipelineError::CatalogError(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }
}

/// "2021-10-22" -> "2021". Anything shorter than a year is treated as
/// missing.
fn release_year(release_date: Option<&str>) -> Option<String> {
    let date = release_date?.trim();
    if date.len() >= 4 && date.chars().take(4).all(|c| c.is_ascii_digit()) {
        Some(date[..4].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_year_takes_the_leading_digits() {
        assert_eq!(release_year(Some("2021-10-22")).as_deref(), Some("2021"));
        assert_eq!(release_year(Some("1984")).as_deref(), Some("1984"));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(Some("tba")), None);
        assert_eq!(release_year(None), None);
    }
}
