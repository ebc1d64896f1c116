//! The set of property names that ingestion produces for internal bookkeeping.
//! These are never shown to users, regardless of what the caller asks for.

use std::collections::HashSet;
use std::sync::LazyLock;

/// The maximum number of group types a team can define.
/// Each group type gets a `$group_{i}` property during ingestion.
pub const GROUP_TYPES_LIMIT: usize = 5;

/// Hidden names which do not depend on [GROUP_TYPES_LIMIT]
const BASE_HIDDEN_PROPERTIES: [&str; 7] = [
    // set in properties by some libraries
    "distinct_id",
    // used for updating person properties
    "$set",
    "$set_once",
    // group analytics
    "$groups",
    "$group_type",
    "$group_key",
    "$group_set",
];

/// Every property name excluded from listings.
/// Built once on first access and never mutated afterwards.
pub static HIDDEN_PROPERTY_DEFINITIONS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    BASE_HIDDEN_PROPERTIES
        .iter()
        .map(|name| name.to_string())
        .chain((0..GROUP_TYPES_LIMIT).map(|i| format!("$group_{i}")))
        .collect()
});

/// returns true if the input property name is reserved for internal use
pub fn is_hidden(name: &str) -> bool {
    HIDDEN_PROPERTY_DEFINITIONS.contains(name)
}

/// Union the caller supplied exclusions with [HIDDEN_PROPERTY_DEFINITIONS].
/// The output is sorted so the bound parameter is stable across requests.
pub fn excluded_with_hidden<I>(excluded: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = excluded
        .into_iter()
        .chain(HIDDEN_PROPERTY_DEFINITIONS.iter().cloned())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_contain_base_and_group_names() {
        assert_eq!(
            HIDDEN_PROPERTY_DEFINITIONS.len(),
            BASE_HIDDEN_PROPERTIES.len() + GROUP_TYPES_LIMIT
        );
        assert!(is_hidden("distinct_id"));
        assert!(is_hidden("$set_once"));
        assert!(is_hidden("$group_0"));
        assert!(is_hidden("$group_4"));
        assert!(!is_hidden("$group_5"));
        assert!(!is_hidden("timestamp"));
    }

    #[test]
    fn it_should_union_without_duplicates() {
        let names = excluded_with_hidden(["foo".to_string(), "$set".to_string()]);

        assert_eq!(names.len(), HIDDEN_PROPERTY_DEFINITIONS.len() + 1);
        assert!(names.contains(&"foo".to_string()));
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn it_should_exclude_hidden_when_caller_excludes_nothing() {
        let names = excluded_with_hidden(Vec::new());
        assert!(names.iter().all(|n| is_hidden(n)));
        assert_eq!(names.len(), HIDDEN_PROPERTY_DEFINITIONS.len());
    }
}
