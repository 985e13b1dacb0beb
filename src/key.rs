//! Header key normalization

/// Canonicalizes a header (or field name) into a lookup key.
///
/// Leading and trailing whitespace is stripped, internal whitespace removed and
/// the text lowercased. The mapping does not depend on any locale, so
/// `normalize(normalize(s)) == normalize(s)` for every input.
///
/// ```
/// use xlshaper::normalize;
///
/// assert_eq!(normalize(" First Name "), "firstname");
/// assert_eq!(normalize("FIRSTNAME"), normalize("first name"));
/// ```
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
