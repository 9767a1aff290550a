//! Shell-style variable expansion for query templates.
//!
//! Supports exactly the two forms a POSIX shell gives `${VAR}` and
//! `${VAR:-default}`: an unset variable expands to the empty string (or the
//! default, when one is given); a variable set to the empty string expands
//! to that empty string, not the default. Expansion happens at resolution
//! time against whatever lookup the caller supplies, so the same template
//! can produce different SQL as the environment changes.

/// Expand `${VAR}` / `${VAR:-default}` tokens using `lookup`.
///
/// Tokens with no closing brace, and tokens with an empty variable name,
/// are left in the output verbatim.
pub fn expand<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let token_start = &rest[start..];
        match token_start.find('}') {
            None => {
                // Unterminated token: emit the tail untouched.
                out.push_str(token_start);
                rest = "";
                break;
            }
            Some(end) => {
                let token = &token_start[2..end];
                match expand_token(token, &lookup) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&token_start[..end + 1]),
                }
                rest = &token_start[end + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Expand against the process environment.
pub fn expand_env(template: &str) -> String {
    expand(template, |name| std::env::var(name).ok())
}

fn expand_token<F>(token: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let (name, default) = match token.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (token, None),
    };
    if name.is_empty() {
        return None;
    }
    match lookup(name) {
        Some(value) => Some(value),
        None => Some(default.unwrap_or("").to_string()),
    }
}
