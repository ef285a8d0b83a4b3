use crate::models::PivotParts;

/// Pivot position within a run of `len` characters.
///
/// Even lengths pivot just left of centre (`len/2 - 1`), odd lengths on the
/// centre (`(len-1)/2`); never below zero.
pub fn pivot_for_length(len: usize) -> usize {
    if len == 0 {
        0
    } else if len % 2 == 0 {
        (len / 2).saturating_sub(1)
    } else {
        (len - 1) / 2
    }
}

/// Character index of the pivot in `text`.
///
/// With interior spaces the rule counts non-space characters only and maps
/// back, so the pivot never lands on a space.
pub fn pivot_index(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    if !chars.iter().any(|c| c.is_whitespace()) {
        return pivot_for_length(chars.len());
    }

    let visible: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .collect();

    visible
        .get(pivot_for_length(visible.len()))
        .copied()
        .unwrap_or(0)
}

/// Split display text into left, pivot character, and right
pub fn split_pivot(text: &str) -> PivotParts {
    if text.is_empty() {
        return PivotParts::default();
    }

    let index = pivot_index(text);
    let mut parts = PivotParts::default();
    for (i, c) in text.chars().enumerate() {
        match i.cmp(&index) {
            std::cmp::Ordering::Less => parts.left.push(c),
            std::cmp::Ordering::Equal => parts.pivot.push(c),
            std::cmp::Ordering::Greater => parts.right.push(c),
        }
    }
    parts
}
