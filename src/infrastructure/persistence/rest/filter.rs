//! PostgREST query-string operators.

/// Quote a value for use inside `in.(...)` and `or=(...)` lists.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `eq.<value>`
pub fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// `in.("a","b")`
pub fn in_list<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values.into_iter().map(quote).collect();
    format!("in.({})", quoted.join(","))
}

/// `(email.ilike."*term*",name.ilike."*term*")` for the `or` parameter
pub fn ilike_any(columns: &[&str], term: &str) -> String {
    let pattern = quote(&format!("*{}*", term));
    let clauses: Vec<String> = columns
        .iter()
        .map(|c| format!("{}.ilike.{}", c, pattern))
        .collect();
    format!("({})", clauses.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq() {
        assert_eq!(eq("abc"), "eq.abc");
    }

    #[test]
    fn test_in_list_quotes_values() {
        assert_eq!(in_list(["a", "b"]), "in.(\"a\",\"b\")");
        assert_eq!(in_list(["x,y"]), "in.(\"x,y\")");
        assert_eq!(in_list(["say \"hi\""]), "in.(\"say \\\"hi\\\"\")");
    }

    #[test]
    fn test_ilike_any() {
        assert_eq!(
            ilike_any(&["email", "name"], "ann"),
            "(email.ilike.\"*ann*\",name.ilike.\"*ann*\")"
        );
    }
}
