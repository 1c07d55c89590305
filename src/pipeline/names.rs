use crate::patterns;
use crate::types::FacultyName;

/// Split one flat-file line into its name components.
///
/// Lines with fewer than two separators have no extractable name and come
/// back as `None`; downstream stages treat that as "no match", never as an
/// error.
pub fn parse_name(line: &str) -> Option<FacultyName> {
    let last = patterns::LAST_NAME.captures(line)?.get(1)?.as_str().trim();
    let first = patterns::FIRST_NAME.captures(line)?.get(1)?.as_str().trim();
    if first.is_empty() || last.is_empty() {
        return None;
    }
    Some(FacultyName::new(first, last))
}

/// Extract one name per flat-file line.
///
/// Degenerate lines yield an empty string so output length always equals
/// input length; identity stays positional.
pub fn collect_names(flat: &[String], reorder: bool) -> Vec<String> {
    flat.iter()
        .map(|line| match parse_name(line) {
            Some(name) if reorder => name.display(),
            Some(name) => name.catalog_order(),
            None => String::new(),
        })
        .collect()
}

/// Extract the department field (everything after the second comma) per line.
pub fn collect_departments(flat: &[String]) -> Vec<Option<String>> {
    flat.iter()
        .map(|line| {
            patterns::DEPARTMENT
                .captures(line)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().trim().trim_end_matches('.').to_string())
                .filter(|department| !department.is_empty())
        })
        .collect()
}
