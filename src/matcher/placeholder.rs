use regex::Captures;

/// Highest group a single-digit token can name
const MAX_PLACEHOLDER: usize = 9;

/// Replace `$1`..`$9` in `target` with the corresponding capture groups.
///
/// Groups are substituted from the highest down to `$1`, each replacing every
/// occurrence of its token. Text inserted for a higher group is therefore seen
/// by the lower tokens. A token naming a group the pattern does not have stays
/// in the output as written, and a group that did not participate in the match
/// expands to an empty string. `$12` is group 1 followed by a literal `2`.
pub fn resolve_target(target: &str, captures: &Captures<'_>) -> String {
    if !target.contains('$') {
        return target.to_string();
    }

    let highest = captures.len().saturating_sub(1).min(MAX_PLACEHOLDER);
    let mut result = target.to_string();

    for group in (1..=highest).rev() {
        let token = format!("${}", group);
        if result.contains(&token) {
            let value = captures.get(group).map_or("", |m| m.as_str());
            result = result.replace(&token, value);
        }
    }

    result
}
