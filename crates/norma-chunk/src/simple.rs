//! Simple splitter: a sliding window of `chunk_size`
//! characters, stepping by `max(1, size - clamp(overlap, 0, size-1))`, with
//! each slice trimmed and empty slices dropped.

/// Split `text` into a sliding window of `chunk_size`-character slices.
/// Empty input produces an empty list.
#[must_use]
pub fn split_simple(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let clamped_overlap = overlap.min(chunk_size.saturating_sub(1));
    let step = (chunk_size - clamped_overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < len {
        let end = (start + chunk_size).min(len);
        let slice: String = chars[start..end].iter().collect();
        let trimmed = slice.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == len {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_list() {
        assert!(split_simple("", 100, 10).is_empty());
    }

    #[test]
    fn windows_with_overlap() {
        let text = "abcdefghij";
        let chunks = split_simple(text, 4, 2);
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij"]);
    }

    #[test]
    fn final_short_window_is_kept() {
        let text = "abcdefghijk";
        let chunks = split_simple(text, 4, 2);
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij", "ijk"]);
    }

    #[test]
    fn zero_overlap_steps_by_full_size() {
        let text = "abcdefgh";
        let chunks = split_simple(text, 4, 0);
        assert_eq!(chunks, vec!["abcd", "efgh"]);
    }

    #[test]
    fn overlap_clamped_to_chunk_size_minus_one() {
        let text = "abcdef";
        let chunks = split_simple(text, 3, 100);
        assert_eq!(chunks, vec!["abc", "bcd", "cde", "def"]);
    }

    #[test]
    fn trims_whitespace_and_drops_empty_slices() {
        let text = "ab   ";
        let chunks = split_simple(text, 5, 0);
        assert_eq!(chunks, vec!["ab"]);
    }
}
