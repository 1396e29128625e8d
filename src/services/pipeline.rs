use crate::config::Config;
use crate::models::{
    CandidateMovie, ExtractedEntities, MovieCandidate, ScreenType, ShowtimeOutcome, TurnOutcome,
};
use crate::services::catalog::CatalogClient;
use crate::services::intent_classifier::{is_generic_showtime_query, IntentClassifier};
use crate::services::matcher;
use crate::services::showtime_parser::{mentions_no_showtimes, parse_cinema_sections};
use crate::services::text_service::{GenerateOptions, Location, TextServiceClient};
use crate::services::title_extractor::{TitleExtractor, TitleSource};
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{info, warn};

/// Ties the pipeline together: classification, live-text fetching, entity
/// extraction and catalog matching, behind one struct owning the external
/// clients. Each call works on its own input and returns a fresh result;
/// nothing is cached or shared between turns.
pub struct MoviePipeline {
    text_service: TextServiceClient,
    catalog: CatalogClient,
    classifier: IntentClassifier,
    extractor: TitleExtractor,
}

impl MoviePipeline {
    pub fn new(config: &Config) -> Self {
        let text_service = TextServiceClient::new(
            &config.text_service_url,
            &config.text_service_api_key,
            &config.text_service_model,
            &config.default_city,
        );
        Self {
            classifier: IntentClassifier::new(Some(text_service.clone())),
            extractor: TitleExtractor::new(&config.extra_exclusion_phrases),
            catalog: CatalogClient::new(&config.catalog_url, &config.catalog_api_key),
            text_service,
        }
    }

    /// One user turn: classify, fetch live text when needed, extract, and
    /// hand back the structured decision for the navigation layer.
    pub async fn handle_user_turn(
        &self,
        user_text: &str,
        location: Option<&Location>,
        date: NaiveDate,
    ) -> TurnOutcome {
        let intent = self.classifier.classify(user_text).await;
        info!(
            "Classified {:?} -> screen {:?}, web search {}",
            user_text,
            intent.screen.map(|s| s.as_str()),
            intent.use_web_search
        );

        match intent.screen {
            Some(ScreenType::MovieShowtimes) => {
                if is_generic_showtime_query(user_text) {
                    return TurnOutcome::NeedsClarification {
                        prompt: "Which movie would you like showtimes for?".to_string(),
                    };
                }
                let Some(movie) = self
                    .extractor
                    .extract_single_title(user_text, TitleSource::UserQuery)
                else {
                    return TurnOutcome::NeedsClarification {
                        prompt: "Which movie would you like showtimes for?".to_string(),
                    };
                };
                let showtimes = self.showtimes_for_movie(&movie.title, date, location).await;
                let cinema_names = showtimes.cinemas.iter().map(|c| c.name.clone()).collect();
                TurnOutcome::Navigate {
                    screen: ScreenType::MovieShowtimes,
                    entities: ExtractedEntities::from_parts(
                        vec![movie.display_title().to_string()],
                        cinema_names,
                    ),
                    showtimes: Some(showtimes),
                }
            }
            Some(screen) if intent.use_web_search => {
                let entities = self.discover_movies(user_text, location).await;
                TurnOutcome::Navigate {
                    screen,
                    entities,
                    showtimes: None,
                }
            }
            Some(screen) => TurnOutcome::Navigate {
                screen,
                entities: ExtractedEntities::default(),
                showtimes: None,
            },
            None if intent.use_web_search => {
                let opts = GenerateOptions {
                    web_search: true,
                    location: location.cloned(),
                    ..Default::default()
                };
                match self.text_service.generate(user_text, &opts).await {
                    Ok(response) if !response.is_empty() => TurnOutcome::Conversational {
                        reply: Some(response.text),
                    },
                    Ok(_) => TurnOutcome::Conversational { reply: None },
                    Err(e) => {
                        warn!("Conversational lookup failed: {}", e);
                        TurnOutcome::Conversational { reply: None }
                    }
                }
            }
            None => TurnOutcome::Conversational { reply: None },
        }
    }

    /// Live showtime lookup for one movie. A response that says the movie
    /// is not showing anywhere short-circuits before any per-cinema
    /// parsing; failures degrade to an empty outcome.
    pub async fn showtimes_for_movie(
        &self,
        movie_title: &str,
        date: NaiveDate,
        location: Option<&Location>,
    ) -> ShowtimeOutcome {
        let hint = self.text_service.location_hint(location);
        let prompt = showtime_prompt(movie_title, date, &hint);
        let opts = GenerateOptions {
            web_search: true,
            location: location.cloned(),
            ..Default::default()
        };

        let response = match self.text_service.generate(&prompt, &opts).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Showtime lookup for '{}' failed: {}", movie_title, e);
                return ShowtimeOutcome::default();
            }
        };
        if response.is_empty() {
            return ShowtimeOutcome::default();
        }
        showtime_outcome_from_text(&response.text, movie_title, date)
    }

    /// Gallery-path fetch: asks the service what is playing and extracts
    /// every movie and cinema it mentions.
    pub async fn discover_movies(
        &self,
        query: &str,
        location: Option<&Location>,
    ) -> ExtractedEntities {
        let hint = self.text_service.location_hint(location);
        let prompt = discover_prompt(query, &hint);
        let opts = GenerateOptions {
            web_search: true,
            location: location.cloned(),
            ..Default::default()
        };

        match self.text_service.generate(&prompt, &opts).await {
            Ok(response) => self.extractor.extract_entities(&response),
            Err(e) => {
                warn!("Discovery lookup failed: {}", e);
                ExtractedEntities::default()
            }
        }
    }

    /// Looks every requested title up in the catalog concurrently, then
    /// ranks the merged candidates. Tier order, not completion order,
    /// decides the result.
    pub async fn resolve_titles(
        &self,
        requests: &[MovieCandidate],
        require_exact: bool,
    ) -> Vec<CandidateMovie> {
        let searches = requests.iter().map(|r| self.catalog.search_by_title(&r.title));
        let mut candidates = Vec::new();
        let mut seen = HashSet::new();
        for (request, result) in requests.iter().zip(join_all(searches).await) {
            match result {
                Ok(found) => {
                    for candidate in found {
                        if seen.insert(candidate.id) {
                            candidates.push(candidate);
                        }
                    }
                }
                Err(e) => warn!("Catalog search for '{}' failed: {}", request.title, e),
            }
        }
        matcher::rank_candidates(requests, &candidates, require_exact)
    }

    /// The direct-navigation shortcut: exactly one exact-mode survivor.
    pub async fn resolve_confident(&self, requests: &[MovieCandidate]) -> Option<CandidateMovie> {
        let mut ranked = self.resolve_titles(requests, true).await;
        if ranked.len() == 1 {
            ranked.pop()
        } else {
            None
        }
    }
}

/// The whole-response "not showing" check runs before any per-cinema
/// parsing, so a short-circuited outcome never carries partial results.
fn showtime_outcome_from_text(
    text: &str,
    movie_title: &str,
    date: NaiveDate,
) -> ShowtimeOutcome {
    if mentions_no_showtimes(text) {
        info!("'{}' reported as not showing", movie_title);
        return ShowtimeOutcome {
            no_showtimes_available: true,
            cinemas: Vec::new(),
        };
    }
    ShowtimeOutcome {
        no_showtimes_available: false,
        cinemas: parse_cinema_sections(text, Some(movie_title), date),
    }
}

fn showtime_prompt(movie_title: &str, date: NaiveDate, location_hint: &str) -> String {
    format!(
        "Find movie showtimes for \"{}\" near {} on {}. Format every theater as a section \
         starting with '## [CINEMA]' followed by the theater name and its distance in \
         parentheses, then an '**Address:**' line and a '**Ticket Prices:**' line, then a \
         '## [SHOWTIMES FOR {}]' heading with one '- H:MM AM ($price) [Format]' line per \
         showtime. If it is not playing anywhere nearby, say it is not currently showing.",
        movie_title,
        location_hint,
        date.format("%Y-%m-%d"),
        date.format("%B %-d, %Y"),
    )
}

fn discover_prompt(query: &str, location_hint: &str) -> String {
    format!(
        "{} (near {}). Wrap every movie title you mention in [MOVIE]Title (Year)[/MOVIE] \
         markup, and put cinema names in [square brackets].",
        query, location_hint
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showtime_prompt_carries_the_section_markup() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let prompt = showtime_prompt("Dune", date, "New York");
        assert!(prompt.contains("## [CINEMA]"));
        assert!(prompt.contains("**Ticket Prices:**"));
        assert!(prompt.contains("2024-03-10"));
        assert!(prompt.contains("Dune"));
    }

    #[test]
    fn discover_prompt_requests_tagged_titles() {
        let prompt = discover_prompt("what's playing", "Austin, TX");
        assert!(prompt.contains("[MOVIE]"));
        assert!(prompt.contains("Austin, TX"));
    }

    #[test]
    fn not_showing_short_circuits_with_no_cinemas() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        // Even with a parseable cinema section present, the movie-level
        // phrase wins and nothing is parsed.
        let text = "Dune is not currently showing near you.\n\
            ## [CINEMA] AMC Empire 25\n**Ticket Prices:** $12.99\n- 10:15 AM";
        let outcome = showtime_outcome_from_text(text, "Dune", date);
        assert!(outcome.no_showtimes_available);
        assert!(outcome.cinemas.is_empty());
    }

    #[test]
    fn normal_responses_parse_per_cinema() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let text = "## [CINEMA] AMC Empire 25 (2.3 miles)\n\
            **Address:** 234 W 42nd St, New York, NY\n\
            **Ticket Prices:** $12.99\n\
            ## [SHOWTIMES FOR March 10, 2024]\n- 10:15 AM ($12.99) [Standard]";
        let outcome = showtime_outcome_from_text(text, "Dune", date);
        assert!(!outcome.no_showtimes_available);
        assert_eq!(outcome.cinemas.len(), 1);
        assert_eq!(outcome.cinemas[0].showtimes[0].movie_title.as_deref(), Some("Dune"));
    }
}
