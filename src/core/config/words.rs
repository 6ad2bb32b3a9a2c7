use crate::core::error::{LauncherError, LauncherResult};

/// Split a launch-file line into words.
///
/// Words are separated by whitespace. Double quotes group characters
/// (including whitespace) into one word and are removed; a backslash takes
/// the next character literally, inside or outside quotes.
pub fn split_words(line: &str) -> LauncherResult<Vec<String>> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| LauncherError::MalformedLine(format!("trailing backslash: {line}")))?;
                current.get_or_insert_with(String::new).push(escaped);
            }
            '"' => {
                quoted = !quoted;
                current.get_or_insert_with(String::new);
            }
            c if c.is_whitespace() && !quoted => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            c => current.get_or_insert_with(String::new).push(c),
        }
    }

    if quoted {
        return Err(LauncherError::MalformedLine(format!("unterminated quote: {line}")));
    }
    if let Some(word) = current {
        words.push(word);
    }

    Ok(words)
}

/// Whether a raw line carries no directive.
pub fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}
