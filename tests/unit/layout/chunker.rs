use super::*;

fn words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

#[test]
fn rejoined_chunks_reproduce_word_sequence() {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\nSed do eiusmod \
                tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam.";
    for limit in [1, 5, 12, 40, 1000] {
        let chunks = chunk(text, limit);
        assert_eq!(words(&chunks.join(" ")), words(text), "limit {limit}");
    }
}

#[test]
fn chunks_respect_limit_unless_single_word() {
    let text = "a bb ccc dddd eeeee ffffff ggggggg supercalifragilistic hh";
    let limit = 10;
    for c in chunk(text, limit) {
        let len = c.chars().count();
        assert!(
            len <= limit || !c.contains(' '),
            "chunk {c:?} exceeds {limit}"
        );
    }
    assert!(chunk(text, limit).contains(&"supercalifragilistic".to_string()));
}

#[test]
fn exact_limit_body_is_one_chunk() {
    let mut body = String::new();
    while body.chars().count() < 2500 {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str("word");
    }
    body.truncate(2500);
    let body = body.trim_end().to_string();
    assert!(body.chars().count() <= 2500);

    let chunks = chunk(&body, 2500);
    assert_eq!(chunks, vec![body]);
}

#[test]
fn one_character_over_splits_in_two() {
    let body = format!("{} {}", "a".repeat(10), "b".repeat(10));
    assert_eq!(chunk(&body, 21), vec![body.clone()]);
    assert_eq!(chunk(&body, 20), vec!["a".repeat(10), "b".repeat(10)]);
}

#[test]
fn paragraph_breaks_end_chunks() {
    let chunks = chunk("one two\n\nthree\nfour\n\n\n\nfive", 100);
    assert_eq!(chunks, vec!["one two", "three four", "five"]);
}

#[test]
fn empty_and_blank_text_yield_no_chunks() {
    assert!(chunk("", 10).is_empty());
    assert!(chunk(" \n\n \t ", 10).is_empty());
}

#[test]
fn multibyte_text_is_counted_in_chars() {
    let chunks = chunk("héllo wörld ünïcode", 11);
    assert_eq!(chunks, vec!["héllo wörld", "ünïcode"]);
}
