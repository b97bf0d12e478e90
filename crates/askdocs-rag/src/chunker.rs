//! Word-window chunking

use askdocs_core::{Error, Result};

/// Split text into overlapping word windows of `size` words, consecutive
/// windows sharing `overlap` words.
///
/// The cursor advances `size - overlap` words per step and stops once the
/// remaining words are already covered by the previous window, so for `n`
/// input words the output holds `ceil(max(n - overlap, 0) / (size - overlap))`
/// windows. Empty input yields no windows. `overlap >= size` would make the
/// step non-positive and is rejected up front.
///
/// Chunk boundaries are defined here and nowhere else.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    if overlap >= size {
        return Err(Error::Configuration(format!(
            "chunk size ({}) must be greater than chunk overlap ({})",
            size, overlap
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let step = size - overlap;
    let mut windows = Vec::new();
    let mut cursor = 0;
    while cursor + overlap < words.len() {
        let end = (cursor + size).min(words.len());
        windows.push(words[cursor..end].join(" "));
        cursor += step;
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn window_count_matches_formula() {
        // n = 10, size = 4, overlap = 2 -> ceil((10 - 2) / 2) = 4 windows
        let windows = split_text(&words(10), 4, 2).unwrap();
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0], "w0 w1 w2 w3");
        assert_eq!(windows[3], "w6 w7 w8 w9");

        // n = 9 leaves a short trailing window
        let windows = split_text(&words(9), 4, 2).unwrap();
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[3], "w6 w7 w8");
    }

    #[test]
    fn consecutive_windows_share_exactly_overlap_words() {
        let windows = split_text(&words(12), 5, 2).unwrap();
        for pair in windows.windows(2) {
            let left: Vec<&str> = pair[0].split(' ').collect();
            let right: Vec<&str> = pair[1].split(' ').collect();
            assert_eq!(left[left.len() - 2..], right[..2]);
        }
    }

    #[test]
    fn empty_text_yields_no_windows() {
        assert!(split_text("", 800, 200).unwrap().is_empty());
        assert!(split_text("   \n\t  ", 800, 200).unwrap().is_empty());
    }

    #[test]
    fn text_shorter_than_overlap_yields_no_windows() {
        assert_eq!(split_text(&words(2), 8, 4).unwrap().len(), 0);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let text = words(50);
        assert_eq!(
            split_text(&text, 7, 3).unwrap(),
            split_text(&text, 7, 3).unwrap()
        );
    }

    #[test]
    fn overlap_not_below_size_is_rejected() {
        assert!(matches!(
            split_text("a b c", 4, 4),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            split_text("a b c", 2, 5),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            split_text("a b c", 0, 0),
            Err(Error::Configuration(_))
        ));
    }
}
