use scraper::{Html, Node};

/// Converts an HTML body into plain text with blank lines between paragraphs.
pub trait HtmlToText {
    fn to_text(&self, html: &str) -> String;
}

/// [`HtmlToText`] backed by the `scraper` HTML parser.
#[derive(Clone, Debug)]
pub struct ScraperHtmlToText {
    wrap_column: usize,
}

impl ScraperHtmlToText {
    pub fn new(wrap_column: usize) -> Self {
        Self {
            wrap_column: wrap_column.max(1),
        }
    }
}

impl Default for ScraperHtmlToText {
    fn default() -> Self {
        Self::new(130)
    }
}

impl HtmlToText for ScraperHtmlToText {
    fn to_text(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let fragment = Html::parse_fragment(html);
        let mut paragraphs = Vec::<String>::new();
        let mut current = String::new();
        collect_paragraphs(fragment.tree.root(), &mut current, &mut paragraphs);
        flush_paragraph(&mut current, &mut paragraphs);

        paragraphs
            .iter()
            .map(|p| wrap_words(p, self.wrap_column))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn collect_paragraphs(
    node: ego_tree::NodeRef<'_, Node>,
    current: &mut String,
    out: &mut Vec<String>,
) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                current.push_str(text);
            }
            Node::Element(el) => {
                let name = el.name();
                if matches!(name, "script" | "style" | "head" | "template") {
                    continue;
                }
                if name == "br" {
                    current.push(LINE_BREAK);
                    continue;
                }
                let block = is_block(name);
                if block {
                    flush_paragraph(current, out);
                }
                collect_paragraphs(child, current, out);
                if block {
                    flush_paragraph(current, out);
                }
            }
            _ => collect_paragraphs(child, current, out),
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "blockquote"
            | "pre"
            | "ul"
            | "ol"
            | "li"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "table"
            | "tr"
            | "hr"
            | "figure"
            | "figcaption"
    )
}

/// Marks a `<br>` inside the paragraph being collected. Parsed text never contains NUL.
const LINE_BREAK: char = '\0';

/// Collapse whitespace in `current` and emit it. Two or more `<br>` with nothing but whitespace
/// between them start a new paragraph; a single one is folded into a space.
fn flush_paragraph(current: &mut String, out: &mut Vec<String>) {
    let mut words = Vec::<&str>::new();
    let mut breaks = 0usize;
    for (idx, segment) in current.split(LINE_BREAK).enumerate() {
        if idx > 0 {
            breaks += 1;
        }
        let mut segment_words = segment.split_whitespace().peekable();
        if segment_words.peek().is_none() {
            continue;
        }
        if breaks >= 2 && !words.is_empty() {
            out.push(words.join(" "));
            words.clear();
        }
        breaks = 0;
        words.extend(segment_words);
    }
    if !words.is_empty() {
        out.push(words.join(" "));
    }
    current.clear();
}

/// Greedy word wrap at `column` characters; overlong words stay on their own line.
fn wrap_words(paragraph: &str, column: usize) -> String {
    let mut lines = Vec::<String>::new();
    let mut line = String::new();
    let mut line_len = 0usize;
    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > column {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "../../tests/unit/post/html.rs"]
mod tests;
