//! Journey ranking for search results.
//!
//! Candidates are filtered to the Pareto-optimal set on arrival time,
//! transfers and walking time, then put in a total order so identical
//! queries always list journeys identically.

use crate::domain::Journey;

/// Rank journeys by preference.
///
/// Journeys are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. Walking time (shorter is better)
/// 4. Leg identities, so equal journeys still have a fixed order
///
/// Returns journeys sorted best-first.
pub fn rank_journeys(mut journeys: Vec<Journey>) -> Vec<Journey> {
    journeys.sort_by(|a, b| {
        a.criteria()
            .cmp(&b.criteria())
            .then_with(|| a.stable_key().cmp(&b.stable_key()))
    });
    journeys
}

/// Remove dominated journeys.
///
/// A journey is dominated if another journey is at least as good on
/// arrival, transfers and walking, and strictly better on one of them.
pub fn remove_dominated(journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    let mut result: Vec<Journey> = Vec::with_capacity(journeys.len());

    for journey in journeys {
        let criteria = journey.criteria();
        if result.iter().any(|existing| existing.criteria().dominates(&criteria)) {
            continue;
        }
        result.retain(|existing| !criteria.dominates(&existing.criteria()));
        result.push(journey);
    }

    result
}

/// Deduplicate journeys with identical legs.
pub fn deduplicate(journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    let mut result: Vec<Journey> = Vec::with_capacity(journeys.len());
    for journey in journeys {
        if !result.contains(&journey) {
            result.push(journey);
        }
    }
    result
}

/// Reduce candidates to at most `limit` ranked, mutually non-dominated
/// journeys.
pub fn select(journeys: Vec<Journey>, limit: usize) -> Vec<Journey> {
    let mut ranked = rank_journeys(deduplicate(remove_dominated(journeys)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Leg, PatternIdx, PatternPos, ScheduleTime, StopIdx, TransitLeg, TransitLegParts, TripIdx,
        Walk,
    };

    fn time(s: &str) -> ScheduleTime {
        ScheduleTime::parse(s).unwrap()
    }

    fn ride(trip: u32, from: u32, to: u32, dep: &str, arr: &str) -> Leg {
        Leg::Transit(
            TransitLeg::new(TransitLegParts {
                pattern: PatternIdx(trip),
                trip_index: 0,
                trip: TripIdx(trip),
                board: PatternPos(0),
                alight: PatternPos(1),
                from: StopIdx(from),
                to: StopIdx(to),
                departure: time(dep),
                arrival: time(arr),
            })
            .unwrap(),
        )
    }

    fn journey(legs: Vec<Leg>) -> Journey {
        let origin = legs[0].from();
        let destination = legs[legs.len() - 1].to();
        Journey::new(origin, destination, legs).unwrap()
    }

    #[test]
    fn rank_by_arrival() {
        let j1 = journey(vec![ride(1, 0, 9, "10:00", "10:30")]);
        let j2 = journey(vec![ride(2, 0, 9, "10:15", "10:40")]);

        let ranked = rank_journeys(vec![j2, j1]);

        assert_eq!(ranked[0].arrival(), time("10:30"));
        assert_eq!(ranked[1].arrival(), time("10:40"));
    }

    #[test]
    fn rank_by_transfers_when_same_arrival() {
        let direct = journey(vec![ride(1, 0, 9, "10:00", "11:30")]);
        let change = journey(vec![
            ride(2, 0, 5, "10:00", "10:30"),
            ride(3, 5, 9, "10:45", "11:30"),
        ]);

        let ranked = rank_journeys(vec![change, direct]);

        assert_eq!(ranked[0].transfer_count(), 0);
        assert_eq!(ranked[1].transfer_count(), 1);
    }

    #[test]
    fn rank_ties_broken_by_legs() {
        let a = journey(vec![ride(4, 0, 9, "10:00", "10:30")]);
        let b = journey(vec![ride(2, 0, 9, "10:00", "10:30")]);

        let ranked = rank_journeys(vec![a.clone(), b.clone()]);
        assert_eq!(ranked, vec![b.clone(), a.clone()]);
        assert_eq!(rank_journeys(vec![b, a.clone()])[1], a);
    }

    #[test]
    fn remove_dominated_keeps_pareto_optimal() {
        // A: arrives 10:30, 0 transfers
        // B: arrives 10:40, 0 transfers (dominated by A)
        // C: arrives 10:25, 1 transfer (earlier but more transfers)
        let j_a = journey(vec![ride(1, 0, 9, "10:00", "10:30")]);
        let j_b = journey(vec![ride(2, 0, 9, "10:10", "10:40")]);
        let j_c = journey(vec![
            ride(3, 0, 5, "09:45", "10:10"),
            ride(4, 5, 9, "10:15", "10:25"),
        ]);

        let result = remove_dominated(vec![j_a, j_b, j_c]);

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|j| j.arrival() != time("10:40")));
    }

    #[test]
    fn walking_breaks_domination() {
        let ride_only = journey(vec![
            ride(1, 0, 5, "10:00", "10:10"),
            ride(2, 5, 9, "10:20", "10:40"),
        ]);
        let with_walk = journey(vec![
            ride(1, 0, 5, "10:00", "10:10"),
            Leg::Walk(Walk::new(StopIdx(5), StopIdx(6), time("10:10"), 240)),
            ride(3, 6, 9, "10:20", "10:40"),
        ]);

        let result = remove_dominated(vec![with_walk, ride_only]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].walking_secs(), 0);
    }

    #[test]
    fn deduplicate_identical() {
        let j1 = journey(vec![ride(1, 0, 9, "10:00", "10:30")]);
        let j2 = journey(vec![ride(2, 0, 9, "10:00", "10:30")]);

        let result = deduplicate(vec![j1.clone(), j2, j1]);

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn select_truncates_after_ranking() {
        let fast = journey(vec![
            ride(3, 0, 5, "09:45", "10:10"),
            ride(4, 5, 9, "10:15", "10:25"),
        ]);
        let direct = journey(vec![ride(1, 0, 9, "10:00", "10:30")]);

        let result = select(vec![direct.clone(), fast.clone()], 1);
        assert_eq!(result, vec![fast]);

        let result = select(vec![direct.clone(), direct.clone()], 5);
        assert_eq!(result, vec![direct]);
    }

    #[test]
    fn empty_input() {
        assert!(rank_journeys(vec![]).is_empty());
        assert!(remove_dominated(vec![]).is_empty());
        assert!(deduplicate(vec![]).is_empty());
        assert!(select(vec![], 3).is_empty());
    }
}
