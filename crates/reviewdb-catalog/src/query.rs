//! Search-syntax builders for the `products(query:)` argument.

/// Handles searched per request.
pub const MAX_HANDLE_TERMS: usize = 50;

/// Titles searched per request.
pub const MAX_TITLE_TERMS: usize = 20;

/// Joins `values` into `field:"v1" OR field:"v2"`, quoting each value and
/// escaping backslashes and double quotes. Blank values are dropped.
#[must_use]
pub fn search_query(field: &str, values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| format!("{field}:\"{}\"", escape_term(v)))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn escape_term(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn handles_are_or_joined() {
        assert_eq!(
            search_query("handle", &values(&["red-shirt", "blue-hat"])),
            "handle:\"red-shirt\" OR handle:\"blue-hat\""
        );
    }

    #[test]
    fn titles_with_spaces_stay_one_term() {
        assert_eq!(
            search_query("title", &values(&["Red Cotton Shirt"])),
            "title:\"Red Cotton Shirt\""
        );
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(
            search_query("title", &values(&["12\" Pan \\ Lid"])),
            "title:\"12\\\" Pan \\\\ Lid\""
        );
    }

    #[test]
    fn blank_values_are_dropped() {
        assert_eq!(search_query("handle", &values(&["", "  ", "a"])), "handle:\"a\"");
        assert_eq!(search_query("handle", &[]), "");
    }
}
