use crate::config::CleaningConfig;
use crate::types::FlatFile;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Clean a raw catalog document into one faculty record per line.
///
/// Everything before the anchor keyword goes, then everything before the
/// first comma-bearing line (residual preamble), then lines short enough to
/// be blanks or bare page numbers. A mismatched anchor yields an empty flat
/// file rather than a crash; that is the signal to fix the configuration.
pub fn normalize(raw: &[String], anchor: &str, opts: &CleaningConfig) -> FlatFile {
    let Some(anchor_idx) = raw.iter().position(|line| line.contains(anchor)) else {
        warn!("anchor keyword '{}' not found; emitting empty flat file", anchor);
        return Vec::new();
    };

    let after_anchor = &raw[anchor_idx..];
    let Some(separator_idx) = after_anchor.iter().position(|line| line.contains(',')) else {
        warn!("no field separator found after anchor '{}'; emitting empty flat file", anchor);
        return Vec::new();
    };

    let kept: Vec<String> = after_anchor[separator_idx..]
        .iter()
        .map(|line| line.trim().to_string())
        .filter(|line| line.len() > opts.short_line_threshold)
        .collect();

    debug!("kept {} of {} lines after cleaning", kept.len(), raw.len());

    match opts.rejoin_window {
        Some(window) if window > 0 => rejoin_split_lines(kept, window),
        _ => kept,
    }
}

/// Best-effort repair of soft line breaks that PDF extraction hardened.
///
/// A line among the `window` shortest whose predecessor is among the
/// `window` longest is taken for the tail of a split record and folded back
/// into its predecessor. This is a length heuristic, known to produce both
/// false positives and false negatives on unusual layouts.
fn rejoin_split_lines(lines: Vec<String>, window: usize) -> Vec<String> {
    let mut by_length: Vec<usize> = (0..lines.len()).collect();
    by_length.sort_by_key(|&i| lines[i].len());

    let shortest: HashSet<usize> = by_length.iter().take(window).copied().collect();
    let longest: HashSet<usize> = by_length.iter().rev().take(window).copied().collect();

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let is_continuation = idx > 0 && shortest.contains(&idx) && longest.contains(&(idx - 1));
        if is_continuation && !out.is_empty() {
            debug!("rejoining split line {} into its predecessor", idx);
            let predecessor = out.last_mut().unwrap();
            predecessor.push(' ');
            predecessor.push_str(line);
        } else {
            out.push(line.clone());
        }
    }
    out
}
