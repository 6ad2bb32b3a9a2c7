// ─── Expander ───
// `${name}`, `${p:name}` and `$$` substitution within a single word.

use super::environment::Environment;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::props::PropertySource;

/// Expand every placeholder in `word`.
///
/// Substituted values are inserted verbatim and never re-expanded. Unknown
/// parameters and properties expand to the empty string.
pub fn expand(word: &str, env: &Environment, props: &dyn PropertySource) -> LauncherResult<String> {
    let malformed = |reason| LauncherError::MalformedExpansion {
        word: word.to_string(),
        reason,
    };

    let mut buf = String::with_capacity(word.len());
    let mut rest = word;

    while let Some(idx) = rest.find('$') {
        buf.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let mut chars = after.chars();
        match chars.next() {
            None => return Err(malformed("unexpected expansion at end of word")),
            Some('$') => {
                buf.push('$');
                rest = chars.as_str();
            }
            Some('{') => {
                let body = chars.as_str();
                let end = body
                    .find('}')
                    .ok_or_else(|| malformed("unterminated parameter expansion"))?;
                let name = &body[..end];
                match name.strip_prefix("p:") {
                    Some(prop) => buf.push_str(&props.property(prop).unwrap_or_default()),
                    None => buf.push_str(env.parameter(name).unwrap_or("")),
                }
                rest = &body[end + 1..];
            }
            Some(_) => return Err(malformed("unknown expansion")),
        }
    }
    buf.push_str(rest);

    Ok(buf)
}
