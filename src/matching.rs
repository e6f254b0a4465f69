//! Matching engine
//!
//! Pure candidate discovery and compatibility scoring over a conference's
//! active profiles. No storage access happens here; the caller supplies the
//! pool and the set of identities that already have a connection record.

use crate::db::{Profile, UserId};
use std::collections::HashSet;

const SHARED_INTEREST_WEIGHT: u32 = 10;
const OFFER_MATCH_WEIGHT: u32 = 15;

/// A ranked candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub profile: Profile,
    pub score: u32,
    pub common_interests: Vec<String>,
}

/// Compatibility of `u` and `v`.
///
/// Shared interests count once each; an offering of one side that the other
/// is looking for counts in both directions.
pub fn score(u: &Profile, v: &Profile) -> u32 {
    let shared = overlap(&u.interests, &v.interests);
    let u_serves_v = overlap(&u.offerings, &v.looking_for);
    let v_serves_u = overlap(&v.offerings, &u.looking_for);

    SHARED_INTEREST_WEIGHT * shared + OFFER_MATCH_WEIGHT * (u_serves_v + v_serves_u)
}

/// Rank the pool for `requester`.
///
/// Excludes the requester, inactive profiles, and anyone in `excluded`;
/// keeps only candidates sharing at least one interest. Sorted by score
/// descending, ties kept in pool order.
pub fn rank_candidates(
    requester: &Profile,
    pool: &[Profile],
    excluded: &HashSet<UserId>,
) -> Vec<Match> {
    let mut matches: Vec<Match> = pool
        .iter()
        .filter(|p| p.user_id != requester.user_id)
        .filter(|p| p.is_active)
        .filter(|p| !excluded.contains(&p.user_id))
        .filter_map(|p| {
            let common = common_tags(&requester.interests, &p.interests);
            if common.is_empty() {
                return None;
            }
            Some(Match {
                score: score(requester, p),
                profile: p.clone(),
                common_interests: common,
            })
        })
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

fn overlap(a: &[String], b: &[String]) -> u32 {
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    u32::try_from(a.intersection(&b).count()).unwrap_or(u32::MAX)
}

fn common_tags(a: &[String], b: &[String]) -> Vec<String> {
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    a.iter()
        .filter(|t| b.contains(t.as_str()) && seen.insert(t.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile;
    use proptest::prelude::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_score_weights() {
        let mut u = profile(1, "U");
        u.interests = tags(&["rust", "db"]);
        u.offerings = tags(&["mentoring"]);
        u.looking_for = tags(&["funding"]);

        let mut v = profile(2, "V");
        v.interests = tags(&["rust", "db", "go"]);
        v.offerings = tags(&["funding"]);
        v.looking_for = tags(&["mentoring", "hiring"]);

        // 2 shared interests + mentoring one way + funding the other way
        assert_eq!(score(&u, &v), 20 + 15 + 15);
        assert_eq!(score(&v, &u), score(&u, &v));
    }

    #[test]
    fn test_empty_interests_match_nobody() {
        let requester = profile(1, "R");
        let mut other = profile(2, "O");
        other.interests = tags(&["rust"]);
        other.offerings = tags(&["x"]);

        assert!(rank_candidates(&requester, &[other], &HashSet::new()).is_empty());
    }

    #[test]
    fn test_rank_excludes_self_connected_and_inactive() {
        let mut requester = profile(1, "R");
        requester.interests = tags(&["rust"]);

        let mut pool = vec![requester.clone()];
        for id in 2..=5 {
            let mut p = profile(id, "P");
            p.interests = tags(&["rust"]);
            pool.push(p);
        }
        pool[3].is_active = false;

        let excluded = HashSet::from([2]);
        let ids: Vec<_> = rank_candidates(&requester, &pool, &excluded)
            .into_iter()
            .map(|m| m.profile.user_id)
            .collect();
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn test_rank_order_with_stable_ties() {
        let mut requester = profile(1, "R");
        requester.interests = tags(&["a", "b"]);

        let mut low_first = profile(2, "L1");
        low_first.interests = tags(&["a"]);
        let mut high = profile(3, "H");
        high.interests = tags(&["a", "b"]);
        let mut low_second = profile(4, "L2");
        low_second.interests = tags(&["b"]);

        let ranked = rank_candidates(
            &requester,
            &[low_first, high, low_second],
            &HashSet::new(),
        );
        let ids: Vec<_> = ranked.iter().map(|m| m.profile.user_id).collect();
        assert_eq!(ids, vec![3, 2, 4]);
        assert_eq!(ranked[0].score, 20);
        assert_eq!(ranked[0].common_interests, tags(&["a", "b"]));
    }

    fn arb_tags() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-d]", 0..4)
    }

    fn arb_profile(user_id: UserId) -> impl Strategy<Value = Profile> {
        (arb_tags(), arb_tags(), arb_tags(), any::<bool>()).prop_map(
            move |(interests, offerings, looking_for, is_active)| {
                let mut p = profile(user_id, "P");
                p.interests = interests;
                p.offerings = offerings;
                p.looking_for = looking_for;
                p.is_active = is_active;
                p
            },
        )
    }

    fn arb_pool() -> impl Strategy<Value = Vec<Profile>> {
        (0usize..8).prop_flat_map(|n| {
            (1..=n)
                .map(|i| arb_profile(i64::try_from(i).unwrap()))
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn prop_requester_never_a_candidate(requester in arb_profile(1), pool in arb_pool()) {
            let ranked = rank_candidates(&requester, &pool, &HashSet::new());
            prop_assert!(ranked.iter().all(|m| m.profile.user_id != requester.user_id));
        }

        #[test]
        fn prop_ranked_descending(requester in arb_profile(100), pool in arb_pool()) {
            let ranked = rank_candidates(&requester, &pool, &HashSet::new());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }

        #[test]
        fn prop_candidates_share_an_interest(requester in arb_profile(100), pool in arb_pool()) {
            for m in rank_candidates(&requester, &pool, &HashSet::new()) {
                prop_assert!(!m.common_interests.is_empty());
                prop_assert!(m.score >= SHARED_INTEREST_WEIGHT);
            }
        }

        #[test]
        fn prop_score_symmetric(u in arb_profile(1), v in arb_profile(2)) {
            prop_assert_eq!(score(&u, &v), score(&v, &u));
        }

        #[test]
        fn prop_excluded_never_returned(
            requester in arb_profile(100),
            pool in arb_pool(),
            excluded in prop::collection::hash_set(1i64..8, 0..8),
        ) {
            let ranked = rank_candidates(&requester, &pool, &excluded);
            prop_assert!(ranked.iter().all(|m| !excluded.contains(&m.profile.user_id)));
        }
    }
}
