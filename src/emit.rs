use crate::{config::Shell, scope::PATH_SEPARATOR};

#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    shell: Shell,
}

impl Emitter {
    pub fn new(shell: Shell) -> Self {
        Self { shell }
    }

    /// One line assigning `paths` to PATH. With `defer_env` the runtime PATH
    /// is referenced at the end instead of being spelled out.
    pub fn path_export(&self, paths: &[String], defer_env: bool) -> String {
        let mut out = String::new();

        match self.shell {
            Shell::Bash | Shell::Zsh | Shell::Sh => {
                let mut parts: Vec<String> = paths.iter().map(|p| escape_posix(p)).collect();
                if defer_env {
                    parts.push("${PATH}".to_string());
                }
                out.push_str("export PATH=\"");
                out.push_str(&parts.join(&PATH_SEPARATOR.to_string()));
                out.push('"');
            }
            Shell::Fish => {
                out.push_str("set -gx PATH");
                for p in paths {
                    out.push(' ');
                    out.push_str(&quote_fish(p));
                }
                if defer_env {
                    out.push_str(" $PATH");
                }
            }
            Shell::Pwsh => {
                let mut parts: Vec<String> = paths.iter().map(|p| escape_pwsh(p)).collect();
                if defer_env {
                    parts.push("$env:PATH".to_string());
                }
                out.push_str("$env:PATH = \"");
                out.push_str(&parts.join(&PATH_SEPARATOR.to_string()));
                out.push('"');
            }
        }

        out
    }
}

// -------------------- quoting helpers --------------------

/// Body of a POSIX double-quoted string.
fn escape_posix(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn quote_fish(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if matches!(ch, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Body of a PowerShell double-quoted string.
fn escape_pwsh(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '`' => out.push_str("``"),
            '"' => out.push_str("`\""),
            '$' => out.push_str("`$"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn posix_shells_share_export_syntax() {
        let p = paths(&["/opt/homebrew/bin", "/usr/bin"]);
        for shell in [Shell::Bash, Shell::Zsh, Shell::Sh] {
            assert_eq!(
                Emitter::new(shell).path_export(&p, false),
                r#"export PATH="/opt/homebrew/bin:/usr/bin""#
            );
        }
    }

    #[test]
    fn deferred_references_runtime_path() {
        let p = paths(&["/a", "/b"]);
        assert_eq!(
            Emitter::new(Shell::Zsh).path_export(&p, true),
            r#"export PATH="/a:/b:${PATH}""#
        );
        assert_eq!(
            Emitter::new(Shell::Fish).path_export(&p, true),
            r#"set -gx PATH "/a" "/b" $PATH"#
        );
        assert_eq!(
            Emitter::new(Shell::Pwsh).path_export(&p, true),
            r#"$env:PATH = "/a:/b:$env:PATH""#
        );
        assert_eq!(
            Emitter::new(Shell::Bash).path_export(&[], true),
            r#"export PATH="${PATH}""#
        );
    }

    #[test]
    fn fish_quotes_each_element() {
        let p = paths(&["/Applications/My Tools/bin", "/usr/bin"]);
        assert_eq!(
            Emitter::new(Shell::Fish).path_export(&p, false),
            r#"set -gx PATH "/Applications/My Tools/bin" "/usr/bin""#
        );
    }

    #[test]
    fn pwsh_assignment() {
        let p = paths(&["/usr/local/bin", "/usr/bin"]);
        assert_eq!(
            Emitter::new(Shell::Pwsh).path_export(&p, false),
            r#"$env:PATH = "/usr/local/bin:/usr/bin""#
        );
    }

    #[test]
    fn special_characters_are_escaped() {
        let p = paths(&[r#"/odd/$dir/"q""#]);
        assert_eq!(
            Emitter::new(Shell::Bash).path_export(&p, false),
            r#"export PATH="/odd/\$dir/\"q\"""#
        );
        assert_eq!(
            Emitter::new(Shell::Fish).path_export(&p, false),
            r#"set -gx PATH "/odd/\$dir/\"q\"""#
        );
        assert_eq!(
            Emitter::new(Shell::Pwsh).path_export(&p, false),
            r#"$env:PATH = "/odd/`$dir/`"q`"""#
        );
    }
}
