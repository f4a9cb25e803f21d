//! Hashtag extraction and ranking

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Maximum hashtags taken from a generator reply
pub const MAX_GENERATED_HASHTAGS: usize = 10;

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#[A-Za-z0-9_]+").expect("static hashtag pattern"))
}

/// All `#word` tokens in `text`, in order of appearance
pub fn extract_hashtags(text: &str) -> Vec<String> {
    hashtag_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Hashtags from an agent's free-text reply: distinct, in order, at most ten
pub fn parse_hashtags(reply: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in extract_hashtags(reply) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
        if seen.len() == MAX_GENERATED_HASHTAGS {
            break;
        }
    }
    seen
}

/// Hashtag frequencies over `texts`, most frequent first.
///
/// Ties keep the order in which the hashtags first appeared.
pub fn rank_hashtags<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts {
        for tag in extract_hashtags(text) {
            let count = counts.entry(tag.clone()).or_insert(0);
            if *count == 0 {
                order.push(tag);
            }
            *count += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|tag| {
            let count = counts[&tag];
            (tag, count)
        })
        .collect();
    // stable sort keeps first-appearance order among ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// The three most frequent hashtags, padded with `#Signal{n}` placeholders
pub fn top_three_signals<'a>(texts: impl IntoIterator<Item = &'a str>) -> [String; 3] {
    let mut top = rank_hashtags(texts)
        .into_iter()
        .take(3)
        .map(|(tag, _)| tag);

    std::array::from_fn(|i| top.next().unwrap_or_else(|| format!("#Signal{}", i + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hashtags_dedupes_and_caps() {
        let reply = "Try #Coffee #Latte and #Coffee again. #a #b #c #d #e #f #g #h #i";
        let tags = parse_hashtags(reply);
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0], "#Coffee");
        assert_eq!(tags[1], "#Latte");
        assert_eq!(tags[9], "#h");
    }

    #[test]
    fn test_hashtag_words_are_ascii() {
        assert_eq!(extract_hashtags("#café #日本 #web_3"), vec!["#caf", "#web_3"]);
    }

    #[test]
    fn test_parse_hashtags_empty() {
        assert!(parse_hashtags("no tags here, just # signs").is_empty());
    }

    #[test]
    fn test_rank_orders_by_count_then_first_seen() {
        let texts = [
            "#Web3 #Blockchain",
            "#Privacy #Blockchain",
            "#Web3 #Blockchain #Privacy",
            "#Innovation",
        ];
        let ranked = rank_hashtags(texts);
        assert_eq!(
            ranked,
            vec![
                ("#Blockchain".to_string(), 3),
                ("#Web3".to_string(), 2),
                ("#Privacy".to_string(), 2),
                ("#Innovation".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_three_pads_with_placeholders() {
        let top = top_three_signals(["only #One here"]);
        assert_eq!(top, ["#One".to_string(), "#Signal2".to_string(), "#Signal3".to_string()]);

        let top = top_three_signals(std::iter::empty());
        assert_eq!(top[0], "#Signal1");
    }
}
