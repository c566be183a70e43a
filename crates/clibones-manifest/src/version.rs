//! Translation of poetry version constraints into PEP 508 range expressions.
//!
//! Coverage is deliberately partial: caret and tilde tokens are translated,
//! wildcard tokens (anything containing `*`) and every other operator produce
//! no output. Callers must not expect a round trip.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Empty version")]
    Empty,

    #[error("Invalid component '{component}' in version '{version}'")]
    InvalidComponent { version: String, component: String },

    #[error("Version '{0}' cannot be bumped without overflow")]
    Overflow(String),
}

fn parse_components(version: &str) -> Result<Vec<u64>, VersionError> {
    let trimmed = version.trim();
    if trimmed.is_empty() {
        return Err(VersionError::Empty);
    }

    trimmed
        .split('.')
        .map(|component| {
            let numeric = !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit());
            numeric
                .then(|| component.parse::<u64>().ok())
                .flatten()
                .ok_or_else(|| VersionError::InvalidComponent {
                    version: version.to_string(),
                    component: component.to_string(),
                })
        })
        .collect()
}

/// Exclusive upper bound of a caret constraint on `version`.
///
/// The leftmost nonzero component is incremented and everything after it is
/// zeroed, keeping the number of components: `1.2.4` -> `2.0.0`,
/// `0.1.2` -> `0.2.0`, `0.0.7` -> `0.0.8`. An all-zero version bumps its last
/// component, so `0.0.0` -> `0.0.1`.
pub fn upper_bound(version: &str) -> Result<String, VersionError> {
    let mut components = parse_components(version)?;
    let last = components.len() - 1;
    let index = components.iter().position(|&c| c != 0).unwrap_or(last);

    components[index] = components[index]
        .checked_add(1)
        .ok_or_else(|| VersionError::Overflow(version.to_string()))?;
    for component in &mut components[index + 1..] {
        *component = 0;
    }

    Ok(components
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("."))
}

fn translate_token(token: &str) -> Option<String> {
    if token.contains('*') {
        return None;
    }

    if let Some(version) = token.strip_prefix('^') {
        return match upper_bound(version) {
            Ok(upper) => Some(format!(">={version}, <{upper}")),
            Err(err) => {
                warn!(token, error = %err, "Skipping caret constraint");
                None
            }
        };
    }

    if let Some(version) = token.strip_prefix('~') {
        let version = version.strip_prefix('=').unwrap_or(version);
        return Some(format!("~={version}"));
    }

    None
}

/// Translate a poetry constraint such as `^1.2.4` or `~1.2, ^1.2.6`.
///
/// Tokens are split on commas and whitespace and translated independently;
/// the results are joined with `", "`.
pub fn translate_constraint(constraint: &str) -> String {
    constraint
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(translate_token)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_upper_bound_bumps_leftmost_nonzero() {
        assert_eq!(upper_bound("1.2.4").unwrap(), "2.0.0");
        assert_eq!(upper_bound("0.1.2").unwrap(), "0.2.0");
        assert_eq!(upper_bound("0.0.7").unwrap(), "0.0.8");
    }

    #[test]
    fn test_upper_bound_keeps_component_count() {
        assert_eq!(upper_bound("1.2").unwrap(), "2.0");
        assert_eq!(upper_bound("3").unwrap(), "4");
        assert_eq!(upper_bound("0.0.0.9").unwrap(), "0.0.0.10");
    }

    #[test]
    fn test_upper_bound_all_zero_bumps_last() {
        assert_eq!(upper_bound("0.0.0").unwrap(), "0.0.1");
        assert_eq!(upper_bound("0").unwrap(), "1");
    }

    #[test]
    fn test_upper_bound_rejects_non_numeric() {
        assert_eq!(upper_bound(""), Err(VersionError::Empty));
        assert!(matches!(
            upper_bound("1.2b1"),
            Err(VersionError::InvalidComponent { component, .. }) if component == "2b1"
        ));
        assert!(matches!(
            upper_bound("1..2"),
            Err(VersionError::InvalidComponent { component, .. }) if component.is_empty()
        ));
        assert!(upper_bound("+1.0").is_err());
    }

    #[test]
    fn test_upper_bound_overflow() {
        let version = format!("{}.1", u64::MAX);
        assert_eq!(upper_bound(&version), Err(VersionError::Overflow(version.clone())));
    }

    #[test]
    fn test_translate_caret() {
        assert_eq!(translate_constraint("^1.2.4"), ">=1.2.4, <2.0.0");
        assert_eq!(translate_constraint("^0.1.2"), ">=0.1.2, <0.2.0");
    }

    #[test]
    fn test_translate_tilde() {
        assert_eq!(translate_constraint("~1.2.4"), "~=1.2.4");
        assert_eq!(translate_constraint("~=1.2"), "~=1.2");
    }

    #[test]
    fn test_translate_wildcard_is_dropped() {
        assert_eq!(translate_constraint("*"), "");
        assert_eq!(translate_constraint("1.*"), "");
        assert_eq!(translate_constraint("^1.*"), "");
    }

    #[test]
    fn test_translate_unknown_operators_are_dropped() {
        assert_eq!(translate_constraint(">=1.0,<2.0"), "");
        assert_eq!(translate_constraint("==1.0"), "");
        assert_eq!(translate_constraint("^1.x"), "");
    }

    #[test]
    fn test_translate_multiple_tokens() {
        assert_eq!(
            translate_constraint("^1.2, ~1.2.6"),
            ">=1.2, <2.0, ~=1.2.6"
        );
        assert_eq!(translate_constraint("  ^2.0   >=2.1 "), ">=2.0, <3.0");
    }

    fn version_components() -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..1000, 1..5)
            .prop_filter("needs a nonzero component", |c| c.iter().any(|&v| v != 0))
    }

    proptest! {
        #[test]
        fn prop_upper_bound_is_strictly_greater(components in version_components()) {
            let version = components
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(".");
            let upper = parse_components(&upper_bound(&version).unwrap()).unwrap();
            prop_assert_eq!(upper.len(), components.len());
            prop_assert!(upper > components);
        }
    }
}
