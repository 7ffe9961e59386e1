/// One span of a highlighted string. Concatenating span texts in order
/// reproduces the input exactly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HighlightSpan {
    pub text: String,
    pub highlighted: bool,
}

/// Splits `text` into spans, highlighting every case-insensitive occurrence
/// of `query`. Matching is literal substring matching; characters that a
/// pattern engine would treat as syntax carry no special meaning here. An
/// empty or whitespace-only query yields a single unhighlighted span.
pub fn highlight_spans(text: &str, query: &str) -> Vec<HighlightSpan> {
    if query.trim().is_empty() {
        return vec![HighlightSpan {
            text: text.to_string(),
            highlighted: false,
        }];
    }

    let haystack: Vec<char> = text.chars().collect();
    let needle: Vec<char> = query.chars().map(fold_char).collect();

    let mut spans = Vec::new();
    let mut pending = String::new();
    let mut index = 0;
    while index < haystack.len() {
        if matches_at(&haystack, index, &needle) {
            if !pending.is_empty() {
                spans.push(HighlightSpan {
                    text: std::mem::take(&mut pending),
                    highlighted: false,
                });
            }
            spans.push(HighlightSpan {
                text: haystack[index..index + needle.len()].iter().collect(),
                highlighted: true,
            });
            index += needle.len();
        } else {
            pending.push(haystack[index]);
            index += 1;
        }
    }
    if !pending.is_empty() {
        spans.push(HighlightSpan {
            text: pending,
            highlighted: false,
        });
    }

    spans
}

fn matches_at(haystack: &[char], start: usize, needle: &[char]) -> bool {
    if start + needle.len() > haystack.len() {
        return false;
    }
    haystack[start..start + needle.len()]
        .iter()
        .zip(needle)
        .all(|(hay, pat)| fold_char(*hay) == *pat)
}

// Simple one-to-one case fold; enough for literal substring display matching.
fn fold_char(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(spans: &[HighlightSpan]) -> String {
        spans.iter().map(|span| span.text.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_whole_text_unhighlighted() {
        let spans = highlight_spans("hello world", "");
        assert_eq!(
            spans,
            vec![HighlightSpan {
                text: "hello world".to_string(),
                highlighted: false,
            }]
        );

        let spans = highlight_spans("hello world", "   ");
        assert_eq!(spans.len(), 1);
        assert!(!spans[0].highlighted);
    }

    #[test]
    fn matches_case_insensitively() {
        let spans = highlight_spans("Hello World", "world");
        assert_eq!(
            spans,
            vec![
                HighlightSpan {
                    text: "Hello ".to_string(),
                    highlighted: false,
                },
                HighlightSpan {
                    text: "World".to_string(),
                    highlighted: true,
                },
            ]
        );
    }

    #[test]
    fn pattern_metacharacters_are_literal() {
        let spans = highlight_spans("a.b.c", ".");
        assert_eq!(concat(&spans), "a.b.c");
        let highlighted: Vec<&str> = spans
            .iter()
            .filter(|span| span.highlighted)
            .map(|span| span.text.as_str())
            .collect();
        assert_eq!(highlighted, vec![".", "."]);
    }

    #[test]
    fn highlights_all_occurrences() {
        let spans = highlight_spans("abcabcabc", "ABC");
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|span| span.highlighted));
        assert_eq!(concat(&spans), "abcabcabc");
    }

    #[test]
    fn no_match_yields_single_span() {
        let spans = highlight_spans("rust", "go");
        assert_eq!(spans.len(), 1);
        assert!(!spans[0].highlighted);
        assert_eq!(concat(&spans), "rust");
    }
}
