//! Split long text into request-sized pieces for engines with a length cap.

/// Break `text` into chunks of at most `max_chars` characters.
///
/// Words are never split unless a single word is longer than the cap.
/// A sentence end closes the current chunk so each request reads naturally.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        for piece in split_long_word(word, max_chars) {
            let piece_len = piece.chars().count();
            let needed = if current.is_empty() { piece_len } else { current_len + 1 + piece_len };
            if needed > max_chars && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;

            if ends_sentence(&piece) {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn ends_sentence(word: &str) -> bool {
    word.ends_with(['.', '!', '?', '…', ';', ':'])
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<String> {
    if word.chars().count() <= max_chars {
        return vec![word.to_string()];
    }
    word.chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}
