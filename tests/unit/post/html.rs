use super::*;

#[test]
fn paragraphs_are_separated_by_blank_lines() {
    let html = "<p>First   paragraph\n here.</p><p>Second <b>bold</b> one.</p>";
    let text = ScraperHtmlToText::default().to_text(html);
    assert_eq!(text, "First paragraph here.\n\nSecond bold one.");
}

#[test]
fn empty_and_whitespace_bodies_give_empty_text() {
    let conv = ScraperHtmlToText::default();
    assert_eq!(conv.to_text(""), "");
    assert_eq!(conv.to_text("   \n"), "");
    assert_eq!(conv.to_text("<p> </p><div></div>"), "");
}

#[test]
fn scripts_and_styles_are_dropped() {
    let html = "<style>p { color: red }</style><p>Visible</p><script>alert(1)</script>";
    assert_eq!(ScraperHtmlToText::default().to_text(html), "Visible");
}

#[test]
fn entities_are_decoded_and_inline_text_is_kept() {
    let html = "Loose text &amp; more<ul><li>one</li><li>two</li></ul>tail";
    let text = ScraperHtmlToText::default().to_text(html);
    assert_eq!(text, "Loose text & more\n\none\n\ntwo\n\ntail");
}

#[test]
fn long_paragraphs_wrap_at_column() {
    let words = vec!["abcd"; 40].join(" ");
    let text = ScraperHtmlToText::new(20).to_text(&format!("<p>{words}</p>"));
    for line in text.lines() {
        assert!(line.chars().count() <= 20, "line too long: {line:?}");
    }
    assert_eq!(
        text.split_whitespace().collect::<Vec<_>>(),
        vec!["abcd"; 40]
    );
    assert!(!text.contains("\n\n"));
}

#[test]
fn overlong_words_stay_whole() {
    let word = "x".repeat(50);
    let text = ScraperHtmlToText::new(10).to_text(&format!("<p>a {word} b</p>"));
    assert_eq!(text, format!("a\n{word}\nb"));
}

#[test]
fn double_line_breaks_split_paragraphs() {
    let conv = ScraperHtmlToText::default();
    assert_eq!(conv.to_text("<p>one<br><br>two</p>"), "one\n\ntwo");
    assert_eq!(conv.to_text("<p>one<br> \n <br/>two<br><br><br>three</p>"), "one\n\ntwo\n\nthree");
}

#[test]
fn single_line_break_keeps_the_paragraph() {
    let conv = ScraperHtmlToText::default();
    assert_eq!(conv.to_text("<p>one<br>two</p>"), "one two");
    assert_eq!(conv.to_text("<br><br>lead<br><br>"), "lead");
}

#[test]
fn line_break_paragraphs_become_separate_chunks() {
    let text = ScraperHtmlToText::default().to_text("first line<br><br>second line");
    assert_eq!(
        crate::layout::chunker::chunk(&text, 1000),
        vec!["first line".to_string(), "second line".to_string()]
    );
}
