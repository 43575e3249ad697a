//! Group match engine: finds the candidate group a user belongs to.

use tracing::debug;

use crate::directory::GroupSet;
use crate::types::DirectoryGroup;

/// Result of probing the candidate groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMatch {
    Matched(DirectoryGroup),
    NoMatch,
}

/// Probe `candidates` in name order and return the first group `is_member`
/// accepts for `username`.
///
/// Stops at the first match, so later groups cost no round-trips. When the
/// user belongs to several candidates, the lexicographically smallest name
/// wins. Errors from the check abort the scan.
pub fn match_group<E, F>(
    candidates: &GroupSet,
    username: &str,
    mut is_member: F,
) -> Result<GroupMatch, E>
where
    F: FnMut(&str, &str) -> Result<bool, E>,
{
    for (name, dn) in candidates {
        debug!(group = %name, user = %username, "Checking group membership");
        if is_member(username, dn.as_str())? {
            return Ok(GroupMatch::Matched(DirectoryGroup {
                name: name.clone(),
                dn: dn.clone(),
            }));
        }
    }
    Ok(GroupMatch::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> GroupSet {
        names
            .iter()
            .map(|n| (n.to_string(), format!("CN={},OU=Groups", n)))
            .collect()
    }

    #[test]
    fn test_returns_group_containing_user() {
        let candidates = groups(&["MacEnrolment-HR", "MacEnrolment-Finance", "MacEnrolment-IT"]);

        let result = match_group(&candidates, "alice", |_, dn| {
            Ok::<_, ()>(dn == "CN=MacEnrolment-Finance,OU=Groups")
        })
        .unwrap();

        assert_eq!(
            result,
            GroupMatch::Matched(DirectoryGroup {
                name: "MacEnrolment-Finance".to_string(),
                dn: "CN=MacEnrolment-Finance,OU=Groups".to_string(),
            })
        );
    }

    #[test]
    fn test_insertion_order_does_not_change_result() {
        let orders: [&[&str]; 3] = [&["A", "B", "C", "D"], &["D", "C", "B", "A"], &["C", "A", "D", "B"]];
        for order in orders {
            let result = match_group(&groups(order), "bob", |_, dn| Ok::<_, ()>(dn.starts_with("CN=C,")))
                .unwrap();
            match result {
                GroupMatch::Matched(group) => assert_eq!(group.name, "C"),
                GroupMatch::NoMatch => panic!("expected a match for order {:?}", order),
            }
        }
    }

    #[test]
    fn test_no_match_probes_every_candidate() {
        let candidates = groups(&["A", "B", "C"]);
        let mut probed = Vec::new();

        let result = match_group(&candidates, "carol", |user, dn| {
            assert_eq!(user, "carol");
            probed.push(dn.to_string());
            Ok::<_, ()>(false)
        })
        .unwrap();

        assert_eq!(result, GroupMatch::NoMatch);
        assert_eq!(probed, vec!["CN=A,OU=Groups", "CN=B,OU=Groups", "CN=C,OU=Groups"]);
    }

    #[test]
    fn test_stops_at_first_match_in_name_order() {
        let candidates = groups(&["Zeta", "Alpha", "Mid"]);
        let mut probed = Vec::new();

        let result = match_group(&candidates, "dave", |_, dn| {
            probed.push(dn.to_string());
            Ok::<_, ()>(true)
        })
        .unwrap();

        match result {
            GroupMatch::Matched(group) => assert_eq!(group.name, "Alpha"),
            GroupMatch::NoMatch => panic!("expected a match"),
        }
        assert_eq!(probed, vec!["CN=Alpha,OU=Groups"]);
    }

    #[test]
    fn test_empty_candidates_never_match() {
        let result = match_group(&GroupSet::new(), "erin", |_, _| -> Result<bool, ()> {
            panic!("no candidate to probe")
        })
        .unwrap();
        assert_eq!(result, GroupMatch::NoMatch);
    }

    #[test]
    fn test_check_error_aborts_scan() {
        let candidates = groups(&["A", "B"]);
        let mut calls = 0;
        let result = match_group(&candidates, "frank", |_, _| {
            calls += 1;
            Err::<bool, _>("directory down")
        });
        assert_eq!(result, Err("directory down"));
        assert_eq!(calls, 1);
    }
}
