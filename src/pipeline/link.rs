use crate::types::{RecordOutcome, RecordSource};
use regex::Regex;
use tracing::debug;

/// Look up each name's degree line in another year's catalog.
///
/// Matching is an unanchored substring test: a name that happens to be a
/// substring of a longer name can hit the wrong line. The source catalogs
/// make this rare and it is accepted as a precision limitation rather than
/// guarded against.
///
/// Output length always equals `names.len()`; a name with no usable line is
/// an explicit `Missing`, never an error. With no secondary catalog at all,
/// everything is `Missing` and the caller falls through to the directory.
pub fn link_records(
    names: &[String],
    secondary: Option<&[String]>,
    pattern: &Regex,
) -> Vec<RecordOutcome> {
    names
        .iter()
        .map(|name| link_one(name, secondary, pattern))
        .collect()
}

fn link_one(name: &str, secondary: Option<&[String]>, pattern: &Regex) -> RecordOutcome {
    if name.is_empty() {
        return RecordOutcome::Missing;
    }
    let Some(lines) = secondary else {
        return RecordOutcome::Missing;
    };

    for line in lines.iter().filter(|line| line.contains(name)) {
        if let Some(found) = pattern.find(line) {
            debug!("linked '{}' from secondary catalog", name);
            return RecordOutcome::Found {
                text: found.as_str().to_string(),
                source: RecordSource::Catalog,
            };
        }
    }
    RecordOutcome::Missing
}
