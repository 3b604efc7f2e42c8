//! Escaping rules for line protocol and delete/Flux predicates.
//!
//! Only the characters that are syntactically significant in line protocol
//! are escaped. Double quotes are passed through untouched, so a value that
//! contains `"` will break a predicate or Flux filter it is embedded in.

/// Escape a measurement name: `,` becomes `\,` and a space becomes `\ `.
pub fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape a tag key or tag value: `,`, `=` and space are backslash-escaped.
pub fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
