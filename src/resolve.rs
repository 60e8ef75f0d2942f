use std::collections::BTreeMap;

/// Expands `$NAME` / `${NAME}` against `vars` and a leading `~`, then
/// normalizes the result lexically.
pub fn resolve_path(raw: &str, vars: &BTreeMap<String, String>) -> String {
    let expanded = expand_env(raw, vars);
    let expanded = expand_tilde(&expanded, vars);
    clean_path(&expanded)
}

/// Unset variables expand to the empty string. A `$` that does not start a
/// valid reference is kept as is.
pub fn expand_env(input: &str, vars: &BTreeMap<String, String>) -> String {
    // Fast path
    if !input.contains('$') {
        return input.to_string();
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut literal_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        let reference = if bytes.get(i + 1) == Some(&b'{') {
            braced_name(input, i + 2).map(|(name, end)| (name, end + 1))
        } else {
            bare_name(input, i + 1)
        };

        match reference {
            Some((name, next)) => {
                out.push_str(&input[literal_start..i]);
                if let Some(value) = vars.get(name) {
                    out.push_str(value);
                }
                i = next;
                literal_start = next;
            }
            None => i += 1,
        }
    }

    out.push_str(&input[literal_start..]);
    out
}

fn braced_name(input: &str, start: usize) -> Option<(&str, usize)> {
    let end = start + input[start..].find('}')?;
    let name = &input[start..end];
    is_valid_name(name).then_some((name, end))
}

fn bare_name(input: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    let name = &input[start..end];
    is_valid_name(name).then_some((name, end))
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_valid_name(s: &str) -> bool {
    let mut it = s.bytes();
    match it.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    it.all(is_ident_char)
}

fn expand_tilde(input: &str, vars: &BTreeMap<String, String>) -> String {
    let rest = match input.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return input.to_string(),
    };

    let home = vars
        .get("HOME")
        .filter(|h| !h.is_empty())
        .cloned()
        .or_else(|| dirs::home_dir().map(|h| h.to_string_lossy().into_owned()));

    match home {
        Some(home) => format!("{home}{rest}"),
        None => input.to_string(),
    }
}

/// Lexical cleanup: collapses repeated separators, drops `.` segments,
/// resolves `..` against preceding segments and strips trailing separators.
/// An empty input stays empty.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `/..` is `/`
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(seg),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
