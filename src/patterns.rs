//! Named extraction patterns, each compiled once. Catalog layouts drift from
//! year to year; everything position-sensitive lives here so a new layout
//! means touching one file.

use once_cell::sync::Lazy;
use regex::Regex;

/// First name or initials: the field between the first and second comma,
/// tolerating an optional space after the first comma.
pub static FIRST_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^,]*,\s?([^,]+),").unwrap());

/// Last name: first capital letter up to the first comma. Skips the
/// lowercase leave/visiting markers that precede the surname in some years.
pub static LAST_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z][^,]*),").unwrap());

/// Department field: everything after the second comma.
pub static DEPARTMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^,]*,[^,]*,\s*(.+)$").unwrap());

/// Undergraduate record as printed in catalog lines and profile pages:
/// 4-digit year, degree abbreviation, institution.
pub static ACADEMIC_RECORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:19|20)\d{2},\s*[A-Za-z][A-Za-z.\s]*,\s*[^,;]+").unwrap());

/// Graduation year, anchored to a bachelor-level degree token. Records that
/// list only a PHD or a masters degree fall through as missing; that gap is
/// in the source material and is kept as-is.
pub static GRADUATION_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"((?:19|20)\d{2}),\s*(?:B\.|A\.B\.|Diploma)").unwrap());

/// Bachelor degree family: "B.<x>." forms, "A.B.", "Diploma".
pub static DEGREE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"B\.\s?[A-Za-z]{1,2}\.|A\.B\.|Diploma").unwrap());

/// Local part of a mailto address; doubles as the unix identifier the
/// directory uses in profile URLs.
pub static UNIX_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:mailto:)?([A-Za-z0-9._%+-]+)@").unwrap());

/// Ordered degree-spelling substitutions applied before year and degree
/// extraction. Order matters: "BSc" must be rewritten before "BS" would
/// partially shadow it.
static DEGREE_SUBSTITUTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bBSc\b", "B.Sc."),
        (r"\bBA\b", "B.A."),
        (r"\bBS\b", "B.S."),
        (r"\bAB\b", "B.A."),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Rewrite bare degree abbreviations into their dotted catalog spelling.
pub fn apply_degree_substitutions(text: &str) -> String {
    DEGREE_SUBSTITUTIONS
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}
