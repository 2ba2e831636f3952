use regex::{Regex, RegexBuilder};

pub fn build_highlight_regex(query: &str) -> Option<Regex> {
    let needle = query.trim();
    if needle.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Byte ranges of every match of `regex` in `text`, in order.
pub fn match_ranges(text: &str, regex: Option<&Regex>) -> Vec<(usize, usize)> {
    match regex {
        Some(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_case_insensitively() {
        let regex = build_highlight_regex("ch").expect("regex");
        assert_eq!(match_ranges("Chess Club Champs", Some(&regex)), vec![(0, 2), (11, 13)]);
    }

    #[test]
    fn escapes_regex_metacharacters() {
        let regex = build_highlight_regex("c++").expect("regex");
        assert_eq!(match_ranges("C++ Guild", Some(&regex)), vec![(0, 3)]);
        assert!(build_highlight_regex("   ").is_none());
    }
}
