//! Permission pattern matching.

/// Checks whether a single permission pattern grants an action.
///
/// Actions are dotted `resource.verb` strings. Three pattern forms
/// exist, and nothing else matches:
///
/// - `*` grants every action
/// - `resource.*` grants any verb on that exact resource
/// - `resource.verb` grants exactly that action
///
/// `resource.*` does not reach into nested names: it grants
/// `tasks.create` but not `tasks.comments.create`. Matching is
/// case-sensitive.
pub fn pattern_grants(pattern: &str, action: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(resource) = pattern.strip_suffix(".*") {
        return match action.split_once('.') {
            Some((action_resource, verb)) => {
                action_resource == resource && !verb.is_empty() && !verb.contains('.')
            }
            None => false,
        };
    }

    pattern == action
}
