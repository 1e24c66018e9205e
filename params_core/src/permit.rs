//! Colon-segmented wildcard permission matching.
//!
//! An external collaborator of the build engine: grants and actions are
//! colon-segmented strings (`users:read:*`), and an action is permitted when
//! any granted permission matches it segment for segment.

/// Returns true when any granted permission matches the requested action.
///
/// A grant matches only when it has the same number of segments as the
/// action and each grant segment equals the action segment or is `*`.
pub fn permitted<S: AsRef<str>>(granted: &[S], action: &str) -> bool {
    granted.iter().any(|grant| matches(grant.as_ref(), action))
}

fn matches(grant: &str, action: &str) -> bool {
    let grant_segments: Vec<&str> = grant.split(':').collect();
    let action_segments: Vec<&str> = action.split(':').collect();

    if grant_segments.len() != action_segments.len() {
        return false;
    }

    grant_segments
        .iter()
        .zip(&action_segments)
        .all(|(g, a)| *g == "*" || g == a)
}
