//! Recursive splitter: split on blank-line
//! boundaries, accumulate paragraphs greedily up to `chunk_size`, fall back
//! to the simple splitter for any paragraph that alone exceeds `chunk_size`,
//! then re-apply overlap by prepending the tail of the previous chunk to
//! each subsequent one.

use crate::simple::split_simple;

/// Split `text` into paragraph-aware chunks of at most `chunk_size`
/// characters, with `overlap` characters of context carried from each
/// chunk into the next. Empty input produces an empty list.
#[must_use]
pub fn split_recursive(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let paragraphs: Vec<&str> = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect();

    let mut greedy: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        if paragraph.chars().count() > chunk_size {
            if !current.is_empty() {
                greedy.push(std::mem::take(&mut current));
            }
            greedy.extend(split_simple(paragraph, chunk_size, overlap));
            continue;
        }

        let candidate_len = if current.is_empty() {
            paragraph.chars().count()
        } else {
            current.chars().count() + 2 + paragraph.chars().count()
        };

        if candidate_len > chunk_size && !current.is_empty() {
            greedy.push(std::mem::take(&mut current));
        }

        if current.is_empty() {
            current.push_str(paragraph);
        } else {
            current.push_str("\n\n");
            current.push_str(paragraph);
        }
    }
    if !current.is_empty() {
        greedy.push(current);
    }

    apply_overlap(&greedy, overlap)
}

fn apply_overlap(chunks: &[String], overlap: usize) -> Vec<String> {
    if overlap == 0 || chunks.len() < 2 {
        return chunks.to_vec();
    }

    let mut out = Vec::with_capacity(chunks.len());
    let mut previous: Option<&String> = None;
    for chunk in chunks {
        match previous {
            None => out.push(chunk.clone()),
            Some(prev) => {
                let prev_chars: Vec<char> = prev.chars().collect();
                let tail_len = overlap.min(prev_chars.len());
                let tail: String = prev_chars[prev_chars.len() - tail_len..].iter().collect();
                out.push(format!("{tail}{chunk}"));
            }
        }
        previous = Some(chunk);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(split_recursive("", 100, 0).is_empty());
        assert!(split_recursive("   ", 100, 0).is_empty());
    }

    #[test]
    fn accumulates_paragraphs_up_to_size() {
        let text = "uno\n\ndos\n\ntres";
        let chunks = split_recursive(text, 8, 0);
        assert_eq!(chunks, vec!["uno\n\ndos", "tres"]);
    }

    #[test]
    fn oversized_paragraph_falls_back_to_simple() {
        let long_paragraph = "a".repeat(10);
        let chunks = split_recursive(&long_paragraph, 4, 0);
        assert_eq!(chunks, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn overlap_prepends_previous_tail() {
        let text = "uno\n\ndos";
        let chunks = split_recursive(text, 3, 2);
        assert_eq!(chunks[0], "uno");
        assert!(chunks[1].starts_with("no"));
    }
}
