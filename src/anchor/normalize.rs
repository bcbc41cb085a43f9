//! Text normalization
//!
//! Canonicalizes raw text so that content comparisons ignore case,
//! whitespace layout and typographic quote glyphs.

/// Normalize text for fingerprinting.
///
/// Lowercases, trims, collapses every whitespace run to a single ASCII space
/// and folds curly quotes to their straight forms. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    normalize_into(text, &mut out);
    out
}

/// Normalize into a caller-owned buffer, clearing it first.
///
/// Used by the window scanner to avoid an allocation per window.
pub fn normalize_into(text: &str, out: &mut String) {
    out.clear();
    let lowered = text.to_lowercase();
    let mut pending_space = false;

    for c in lowered.chars() {
        if is_space(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(fold_quote(c));
    }
}

/// Normalize and record where each output character came from.
///
/// Entry `i` of the returned map is the character index in `text` of the
/// `i`-th normalized character. A collapsed space maps to the first
/// whitespace character of its run. Lowercasing is applied per character,
/// so context-dependent folds (final sigma) are not reproduced here.
pub fn normalize_with_map(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;

    for (index, c) in text.chars().enumerate() {
        if is_space(c) {
            pending_space.get_or_insert(index);
            continue;
        }
        if let Some(space_at) = pending_space.take() {
            if !out.is_empty() {
                out.push(' ');
                map.push(space_at);
            }
        }
        for lower in c.to_lowercase() {
            out.push(fold_quote(lower));
            map.push(index);
        }
    }

    (out, map)
}

/// Whitespace as understood by the normalizer (includes the BOM)
fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn fold_quote(c: char) -> char {
    match c {
        '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' => '"',
        '\u{2018}' | '\u{2019}' | '\u{201a}' | '\u{201b}' => '\'',
        other => other,
    }
}
