use crate::models::{CandidateMovie, MovieCandidate};
use tracing::debug;

/// Ranks catalog candidates against the requested titles in four strictly
/// ordered tiers:
///
/// 1. exact title and exact year
/// 2. exact title, any year
/// 3. substring in either direction and exact year
/// 4. substring in either direction, any year
///
/// Every candidate lands in at most one tier (its best across all
/// requests); candidates matching nothing are omitted. With
/// `require_exact` set, only exact-title candidates qualify, and a
/// requested year must match when one was given.
pub fn rank_candidates(
    requests: &[MovieCandidate],
    candidates: &[CandidateMovie],
    require_exact: bool,
) -> Vec<CandidateMovie> {
    let mut tiers: [Vec<CandidateMovie>; 4] = [vec![], vec![], vec![], vec![]];

    for candidate in candidates {
        let mut best: Option<usize> = None;
        for request in requests {
            if require_exact && !exact_qualifies(request, candidate) {
                continue;
            }
            if let Some(tier) = tier_for(request, candidate) {
                best = Some(best.map_or(tier, |b| b.min(tier)));
            }
        }
        if let Some(tier) = best {
            tiers[tier].push(candidate.clone());
        }
    }

    debug!(
        "Ranked candidates per tier: {} / {} / {} / {}",
        tiers[0].len(),
        tiers[1].len(),
        tiers[2].len(),
        tiers[3].len()
    );
    tiers.into_iter().flatten().collect()
}

/// The exact-match shortcut: when the caller requires an exact match and
/// exactly one candidate survives, it can be navigated to directly without
/// a selection step.
pub fn confident_match(
    requests: &[MovieCandidate],
    candidates: &[CandidateMovie],
) -> Option<CandidateMovie> {
    let mut ranked = rank_candidates(requests, candidates, true);
    if ranked.len() == 1 {
        ranked.pop()
    } else {
        None
    }
}

fn tier_for(request: &MovieCandidate, candidate: &CandidateMovie) -> Option<usize> {
    let requested = request.title.to_lowercase();
    let found = candidate.title.to_lowercase();

    let exact = requested == found;
    let substring = found.contains(&requested) || requested.contains(&found);
    let year_match = matches!(
        (request.year.as_deref(), candidate.year.as_deref()),
        (Some(a), Some(b)) if a == b
    );

    match (exact, substring, year_match) {
        (true, _, true) => Some(0),
        (true, _, false) => Some(1),
        (false, true, true) => Some(2),
        (false, true, false) => Some(3),
        _ => None,
    }
}

fn exact_qualifies(request: &MovieCandidate, candidate: &CandidateMovie) -> bool {
    if !request.title.eq_ignore_ascii_case(&candidate.title) {
        return false;
    }
    match request.year.as_deref() {
        Some(year) => candidate.year.as_deref() == Some(year),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearConfidence;

    fn request(title: &str, year: Option<&str>) -> MovieCandidate {
        MovieCandidate::new(title, year.map(String::from), YearConfidence::Reported)
    }

    fn candidate(id: i64, title: &str, year: Option<&str>) -> CandidateMovie {
        CandidateMovie {
            id,
            title: title.to_string(),
            year: year.map(String::from),
        }
    }

    fn dune_candidates() -> Vec<CandidateMovie> {
        vec![
            candidate(1, "Dune", Some("2021")),
            candidate(2, "Dune", Some("1984")),
            candidate(3, "Dune Part Two", Some("2024")),
        ]
    }

    #[test]
    fn tiers_order_exact_before_fuzzy() {
        let requests = vec![request("Dune", Some("2021"))];
        let ranked = rank_candidates(&requests, &dune_candidates(), false);
        assert_eq!(
            ranked.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn each_candidate_appears_exactly_once() {
        // Two requests that both match the same candidate must not
        // duplicate it across tiers.
        let requests = vec![request("Dune", Some("2021")), request("Dune", None)];
        let ranked = rank_candidates(&requests, &dune_candidates(), false);
        assert_eq!(ranked.len(), 3);
        let mut ids: Vec<i64> = ranked.iter().map(|c| c.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn exact_mode_returns_only_the_requested_year() {
        let requests = vec![request("Dune", Some("2021"))];
        let ranked = rank_candidates(&requests, &dune_candidates(), true);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, 1);

        let confident = confident_match(&requests, &dune_candidates()).unwrap();
        assert_eq!(confident.id, 1);
        assert_eq!(confident.year.as_deref(), Some("2021"));
    }

    #[test]
    fn exact_mode_without_year_accepts_any_year_but_needs_one_survivor() {
        let requests = vec![request("Dune", None)];
        // Both Dune releases survive, so no confident match.
        assert!(confident_match(&requests, &dune_candidates()).is_none());

        let one = vec![candidate(3, "Dune Part Two", Some("2024"))];
        let requests = vec![request("Dune Part Two", None)];
        assert_eq!(confident_match(&requests, &one).unwrap().id, 3);
    }

    #[test]
    fn substring_matches_run_in_both_directions() {
        let requests = vec![request("Dune Part Two", Some("2024"))];
        let candidates = vec![candidate(4, "Dune", None)];
        let ranked = rank_candidates(&requests, &candidates, false);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn unrelated_candidates_are_omitted() {
        let requests = vec![request("Dune", Some("2021"))];
        let candidates = vec![candidate(9, "Barbie", Some("2023"))];
        assert!(rank_candidates(&requests, &candidates, false).is_empty());
    }

    #[test]
    fn year_is_ignored_when_either_side_lacks_one() {
        let requests = vec![request("Dune", None)];
        let ranked = rank_candidates(&requests, &dune_candidates(), false);
        // No year on the request, so both exact-title candidates share
        // tier 2 in catalog order.
        assert_eq!(ranked[0].id, 1);
        assert_eq!(ranked[1].id, 2);
    }
}
