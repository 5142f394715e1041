/// Split plain text into chunks of at most `limit` characters.
///
/// Paragraphs (separated by two or more newlines) always end a chunk. Words are joined with
/// single spaces and never split; a word longer than `limit` becomes a chunk of its own.
/// Length is counted in `char`s, an approximation of rendered width.
pub fn chunk(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for paragraph in text.split("\n\n") {
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= limit {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                chunks.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }

        if current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
    }

    chunks
}

#[cfg(test)]
#[path = "../../tests/unit/layout/chunker.rs"]
mod tests;
