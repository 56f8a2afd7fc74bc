// src/playlist/selection.rs

use std::collections::BTreeSet;

use crate::errors::{PlaylistDlError, Result};

/// Parse a user selection over a list of `len` items.
///
/// Accepts `all`, or 1-based numbers and inclusive ranges separated by commas
/// and/or whitespace, e.g. `1, 5, 8-10`. Returns sorted, de-duplicated
/// 0-based indices.
pub fn parse_selection(input: &str, len: usize) -> Result<Vec<usize>> {
    let input = input.trim().to_lowercase();

    if input == "all" {
        return Ok((0..len).collect());
    }

    let mut selected = BTreeSet::new();

    for part in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_number(start, part)?;
            let end = parse_number(end, part)?;
            if start > end {
                return Err(PlaylistDlError::SelectionError(format!(
                    "range '{part}' is reversed"
                )));
            }
            check_bounds(end, len)?;
            check_bounds(start, len)?;
            selected.extend((start - 1)..end);
        } else {
            let index = parse_number(part, part)?;
            check_bounds(index, len)?;
            selected.insert(index - 1);
        }
    }

    if selected.is_empty() {
        return Err(PlaylistDlError::SelectionError(
            "no items selected".to_string(),
        ));
    }

    Ok(selected.into_iter().collect())
}

fn parse_number(text: &str, part: &str) -> Result<usize> {
    text.trim().parse::<usize>().map_err(|_| {
        PlaylistDlError::SelectionError(format!(
            "'{part}' is not a number or range (use e.g. 1, 5, 8-10 or 'all')"
        ))
    })
}

fn check_bounds(number: usize, len: usize) -> Result<()> {
    if number == 0 || number > len {
        return Err(PlaylistDlError::SelectionError(format!(
            "{number} is out of range (1-{len})"
        )));
    }
    Ok(())
}
