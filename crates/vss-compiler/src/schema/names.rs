//! VSS name candidates for GraphQL field names.

use std::sync::LazyLock;

use regex::Regex;

static VSS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+[A-Z]|^[a-z]+$").expect("valid VSS name pattern"));

/// Plausible VSS spellings of a lowerCamelCase GraphQL name, most specific
/// first.
///
/// ```
/// use vss_compiler::schema::vss_name_candidates;
///
/// assert_eq!(vss_name_candidates("isABSOn"), ["IsABSOn"]);
/// assert_eq!(vss_name_candidates("ABSOn"), ["ABSOn"]);
/// assert_eq!(vss_name_candidates("abs"), ["Abs", "ABS", "abs"]);
/// ```
///
/// Deploy lookups take the first candidate that hits, so the order decides
/// precedence.
pub fn vss_name_candidates(graphql_name: &str) -> Vec<String> {
    let Some(m) = VSS_NAME.find(graphql_name) else {
        return vec![graphql_name.to_string()];
    };

    let title = title_case(graphql_name);
    if m.as_str().ends_with(|c: char| c.is_ascii_uppercase()) {
        return vec![title];
    }

    // all-lowercase VSS names are rare, so they go last
    vec![title, graphql_name.to_uppercase(), graphql_name.to_string()]
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
