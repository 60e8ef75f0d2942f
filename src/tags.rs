//! Tag grammar, filter expressions and matching.
//!
//! A filter expression is an OR-of-AND list: `"dev+work,audio"` reads as
//! `(dev AND work) OR audio`. Tags in a filter may be glob patterns (`work_*`,
//! `?ame`, `[dg]ev`, `[^x]yz`); tags on paths are always compared literally.
//! All comparisons ignore ASCII case.

use std::{fmt, sync::OnceLock};

use glob::{MatchOptions, Pattern};
use regex::Regex;

use crate::error::{Error, Result, TagError};

const WILDCARD_CHARS: &[char] = &['*', '?', '[', ']'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

fn literal_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{2,19}$").expect("literal tag regex"))
}

pub fn is_wildcard_tag(tag: &str) -> bool {
    tag.contains(WILDCARD_CHARS)
}

/// A validated tag. Wildcard tags carry their compiled glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    text: String,
    pattern: Option<Pattern>,
}

impl Tag {
    pub fn parse(text: &str) -> std::result::Result<Self, TagError> {
        if is_wildcard_tag(text) {
            let pattern = compile_pattern(text)?;
            return Ok(Self {
                text: text.to_string(),
                pattern: Some(pattern),
            });
        }

        if !literal_tag_regex().is_match(text) {
            return Err(TagError::InvalidLiteral(text.to_string()));
        }

        Ok(Self {
            text: text.to_string(),
            pattern: None,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_wildcard(&self) -> bool {
        self.pattern.is_some()
    }

    /// Does this (filter-side) tag accept the literal `path_tag`?
    pub fn matches(&self, path_tag: &str) -> bool {
        match &self.pattern {
            Some(p) => p.matches_with(path_tag, MATCH_OPTIONS),
            None => self.text.eq_ignore_ascii_case(path_tag),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn validate_tag(tag: &str) -> std::result::Result<(), TagError> {
    Tag::parse(tag).map(|_| ())
}

// `[^...]` is accepted as a negated class; the glob crate spells it `[!...]`.
// Runs of `*` collapse to one so `**` behaves like `*`.
fn compile_pattern(tag: &str) -> std::result::Result<Pattern, TagError> {
    let mut glob = String::with_capacity(tag.len());
    let mut chars = tag.chars().peekable();
    let mut prev_star = false;

    while let Some(ch) = chars.next() {
        match ch {
            '*' if prev_star => continue,
            '[' if chars.peek() == Some(&'^') => {
                chars.next();
                glob.push_str("[!");
            }
            _ => glob.push(ch),
        }
        prev_star = ch == '*';
    }

    Pattern::new(&glob).map_err(|e| TagError::InvalidPattern {
        tag: tag.to_string(),
        message: e.to_string(),
    })
}

/// OR-of-AND tag conditions. Outer groups are OR'd, inner tags AND'd.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagConditions(Vec<Vec<Tag>>);

impl TagConditions {
    pub fn new(groups: Vec<Vec<Tag>>) -> Self {
        Self(groups.into_iter().filter(|g| !g.is_empty()).collect())
    }

    /// Parse `"home,work+server"` into `[[home], [work, server]]`.
    ///
    /// Empty OR segments (`"a,,b"`) are skipped; an empty AND member
    /// (`"a+"`) is an error.
    pub fn parse(expr: &str) -> std::result::Result<Self, TagError> {
        let mut groups = Vec::new();

        for group in expr.split(',') {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }

            let mut and_group = Vec::new();
            for raw in group.split('+') {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(TagError::EmptyTag(expr.to_string()));
                }
                let tag = Tag::parse(raw).map_err(|e| TagError::InFilter {
                    expr: expr.to_string(),
                    source: Box::new(e),
                })?;
                and_group.push(tag);
            }

            groups.push(and_group);
        }

        Ok(Self(groups))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn groups(&self) -> &[Vec<Tag>] {
        &self.0
    }

    /// True iff some group has every tag satisfied by `path_tags`.
    /// No conditions never match.
    pub fn matches<S: AsRef<str>>(&self, path_tags: &[S]) -> bool {
        self.first_matching_group(path_tags).is_some()
    }

    fn first_matching_group<S: AsRef<str>>(&self, path_tags: &[S]) -> Option<&[Tag]> {
        self.0
            .iter()
            .find(|group| {
                group
                    .iter()
                    .all(|t| path_tags.iter().any(|p| t.matches(p.as_ref())))
            })
            .map(Vec::as_slice)
    }
}

impl fmt::Display for TagConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            for (j, tag) in group.iter().enumerate() {
                if j > 0 {
                    f.write_str("+")?;
                }
                f.write_str(tag.as_str())?;
            }
        }
        Ok(())
    }
}

/// Parsed `--tags-include` / `--tags-exclude` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub include: TagConditions,
    pub exclude: TagConditions,
}

impl TagFilter {
    pub fn parse(include: &str, exclude: &str) -> Result<Self> {
        let include = TagConditions::parse(include).map_err(|source| Error::Filter {
            side: "include",
            source,
        })?;
        let exclude = TagConditions::parse(exclude).map_err(|source| Error::Filter {
            side: "exclude",
            source,
        })?;
        Ok(Self { include, exclude })
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Untagged paths (no tags field and nothing inherited) are immune to
    /// filtering. Otherwise exclude wins over include.
    pub fn should_include<S: AsRef<str>>(&self, tags: &[S], explicitly_tagged: bool) -> bool {
        if tags.is_empty() && !explicitly_tagged {
            return true;
        }
        if !self.exclude.is_empty() && self.exclude.matches(tags) {
            return false;
        }
        if !self.include.is_empty() {
            return self.include.matches(tags);
        }
        true
    }

    /// Human-readable reason for a filtered path, `None` when it passes.
    ///
    /// Exclusions read `"<path tag> = <filter tag>"`; unmet includes read
    /// `"<tag summary> != <include expression>"`.
    pub fn skip_reason<S: AsRef<str>>(&self, tags: &[S], explicitly_tagged: bool) -> Option<String> {
        if tags.is_empty() && !explicitly_tagged {
            return None;
        }

        if let Some(group) = self.exclude.first_matching_group(tags) {
            for path_tag in tags {
                let path_tag = path_tag.as_ref();
                if let Some(hit) = group.iter().find(|t| t.matches(path_tag)) {
                    return Some(format!("{path_tag} = {hit}"));
                }
            }
        }

        if !self.include.is_empty() && !self.include.matches(tags) {
            return Some(format!("{} != {}", summarize_tags(tags), self.include));
        }

        None
    }
}

/// At most two tags, then ` (+N)`: `"mac"`, `"mac,gaming"`, `"mac,gaming (+2)"`.
pub fn summarize_tags<S: AsRef<str>>(tags: &[S]) -> String {
    match tags {
        [] => "no tags".to_string(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{},{}", a.as_ref(), b.as_ref()),
        [a, b, rest @ ..] => format!("{},{} (+{})", a.as_ref(), b.as_ref(), rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &str, exclude: &str) -> TagFilter {
        TagFilter::parse(include, exclude).unwrap()
    }

    #[test]
    fn literal_tags_follow_the_grammar() {
        for ok in ["dev", "home", "a12", "work_laptop", "ABC", "abcdefghijklmnopqrst"] {
            assert!(validate_tag(ok).is_ok(), "{ok} should be valid");
        }
        for bad in ["ab", "2invalid", "_dev", "work@home", "has space", "abcdefghijklmnopqrstu", ""] {
            assert!(validate_tag(bad).is_err(), "{bad} should be invalid");
        }
    }

    #[test]
    fn wildcard_tags_only_need_valid_glob_syntax() {
        for ok in ["*", "w*", "?ev", "[dg]ev", "[^x]yz", "[!x]yz", "work_**", "abc]"] {
            assert!(validate_tag(ok).is_ok(), "{ok} should be valid");
        }
        let err = validate_tag("work[").unwrap_err();
        assert!(matches!(err, TagError::InvalidPattern { ref tag, .. } if tag == "work["));
    }

    #[test]
    fn parse_splits_or_then_and() {
        let c = TagConditions::parse("home, work + server ,,").unwrap();
        assert_eq!(c.groups().len(), 2);
        assert_eq!(c.groups()[0].len(), 1);
        assert_eq!(c.groups()[1].len(), 2);
        assert_eq!(c.to_string(), "home,work+server");

        assert!(TagConditions::parse("").unwrap().is_empty());
        assert!(TagConditions::parse(" , ").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_empty_and_member() {
        assert_eq!(
            TagConditions::parse("dev+").unwrap_err(),
            TagError::EmptyTag("dev+".to_string())
        );
        assert!(TagConditions::parse("+dev").is_err());
    }

    #[test]
    fn parse_errors_name_tag_and_expression() {
        let err = TagFilter::parse("home,2invalid", "").unwrap_err().to_string();
        assert!(err.contains("--tags-include"), "{err}");
        assert!(err.contains("'2invalid'"), "{err}");
        assert!(err.contains("'home,2invalid'"), "{err}");

        let err = TagFilter::parse("", "work@home").unwrap_err().to_string();
        assert!(err.contains("--tags-exclude"), "{err}");
    }

    #[test]
    fn matching_is_or_of_and() {
        let c = TagConditions::parse("dev+work,audio").unwrap();
        assert!(c.matches(&["dev", "work"]));
        assert!(c.matches(&["audio"]));
        assert!(c.matches(&["DEV", "Work", "x_y"]));
        assert!(!c.matches(&["dev"]));
        assert!(!c.matches::<&str>(&[]));
        assert!(!TagConditions::default().matches(&["dev"]));
    }

    #[test]
    fn wildcards_match_case_insensitively() {
        let c = TagConditions::parse("work_*").unwrap();
        assert!(c.matches(&["WORK_PROD"]));
        assert!(c.matches(&["Work_Dev"]));
        assert!(!c.matches(&["home_dev"]));

        let c = TagConditions::parse("[^h]ome").unwrap();
        assert!(c.matches(&["dome"]));
        assert!(!c.matches(&["home"]));
        assert!(!c.matches(&["HOME"]));

        let c = TagConditions::parse("?ev").unwrap();
        assert!(c.matches(&["Dev"]));
        assert!(!c.matches(&["devs"]));
    }

    #[test]
    fn untagged_paths_are_immune() {
        let f = filter("dev", "*");
        assert!(f.should_include::<&str>(&[], false));
        assert_eq!(f.skip_reason::<&str>(&[], false), None);

        // explicit empty tags are filtered like any other tag set
        assert!(!f.should_include::<&str>(&[], true));
        assert_eq!(
            f.skip_reason::<&str>(&[], true).as_deref(),
            Some("no tags != dev")
        );
    }

    #[test]
    fn exclude_wins_over_include() {
        let f = filter("essential", "essential");
        assert!(!f.should_include(&["essential"], true));
        assert_eq!(
            f.skip_reason(&["essential"], true).as_deref(),
            Some("essential = essential")
        );
    }

    #[test]
    fn combined_scenario() {
        let f = filter("dev+work,audio", "gaming,video");

        assert!(f.should_include(&["dev", "work", "audio"], true));
        assert_eq!(f.skip_reason(&["dev", "work", "audio"], true), None);

        assert!(!f.should_include(&["gaming"], true));
        assert_eq!(f.skip_reason(&["gaming"], true).as_deref(), Some("gaming = gaming"));

        assert_eq!(
            f.skip_reason(&["dev", "work", "gaming"], true).as_deref(),
            Some("gaming = gaming")
        );
        assert_eq!(
            f.skip_reason(&["dev"], true).as_deref(),
            Some("dev != dev+work,audio")
        );
        assert_eq!(
            f.skip_reason(&["personal", "home", "mac", "desktop"], true).as_deref(),
            Some("personal,home (+2) != dev+work,audio")
        );
    }

    #[test]
    fn exclude_reason_names_the_path_tag_that_matched_a_wildcard() {
        let f = filter("", "gam*");
        assert_eq!(
            f.skip_reason(&["home", "Gaming"], true).as_deref(),
            Some("Gaming = gam*")
        );
    }

    #[test]
    fn summaries_show_two_tags_then_a_count() {
        assert_eq!(summarize_tags::<&str>(&[]), "no tags");
        assert_eq!(summarize_tags(&["mac"]), "mac");
        assert_eq!(summarize_tags(&["mac", "gaming"]), "mac,gaming");
        assert_eq!(summarize_tags(&["mac", "gaming", "dev"]), "mac,gaming (+1)");
    }
}
