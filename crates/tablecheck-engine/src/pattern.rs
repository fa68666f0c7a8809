//! Regex compilation for `match` patterns and substitutions

use regex::{Regex, RegexBuilder};

fn builder(pattern: &str, flags: &str) -> Result<(RegexBuilder, bool), String> {
    let mut builder = RegexBuilder::new(pattern);
    let mut global = false;
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'g' => global = true,
            other => return Err(format!("unsupported regex flag '{}'", other)),
        }
    }
    Ok((builder, global))
}

/// Compile a datatype `match` pattern, anchored at the start of the value
pub fn compile_match(pattern: &str, flags: &str) -> Result<Regex, String> {
    let anchored = format!("^(?:{})", pattern);
    let (builder, _) = builder(&anchored, flags)?;
    builder
        .build()
        .map_err(|e| format!("invalid regex '/{}/': {}", pattern, e))
}

/// Rewrite `\1` style back-references to `${1}`
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some(d) if d.is_ascii_digit() => {
                let mut group = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    group.push(d);
                    chars.next();
                }
                out.push_str(&format!("${{{}}}", group));
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// A compiled `s/pattern/replacement/flags`
#[derive(Debug, Clone)]
pub struct Substitution {
    regex: Regex,
    replacement: String,
    global: bool,
}

impl Substitution {
    /// Compile; `g` replaces every match, otherwise only the first
    pub fn compile(pattern: &str, replacement: &str, flags: &str) -> Result<Self, String> {
        let (builder, global) = builder(pattern, flags)?;
        let regex = builder
            .build()
            .map_err(|e| format!("invalid regex 's/{}/{}/': {}", pattern, replacement, e))?;
        Ok(Self {
            regex,
            replacement: translate_replacement(replacement),
            global,
        })
    }

    /// Apply the substitution to a value
    pub fn apply(&self, value: &str) -> String {
        let limit = if self.global { 0 } else { 1 };
        self.regex
            .replacen(value, limit, self.replacement.as_str())
            .into_owned()
    }
}

/// Cache key for a substitution
pub fn substitution_key(pattern: &str, replacement: &str, flags: &str) -> String {
    format!("s/{}/{}/{}", pattern, replacement, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_is_anchored_at_start() {
        let re = compile_match("[a-z]+", "").unwrap();
        assert!(re.is_match("abc1"));
        assert!(!re.is_match("1abc"));
    }

    #[test]
    fn match_flags() {
        let re = compile_match("abc$", "i").unwrap();
        assert!(re.is_match("ABC"));
        assert!(compile_match("a", "q").is_err());
    }

    #[test]
    fn substitution_first_or_all() {
        let first = Substitution::compile(" ", "_", "").unwrap();
        let all = Substitution::compile(" ", "_", "g").unwrap();
        assert_eq!(first.apply("a b c"), "a_b c");
        assert_eq!(all.apply("a b c"), "a_b_c");
    }

    #[test]
    fn substitution_backreferences() {
        let sub = Substitution::compile(r"^(\w+)-(\w+)$", r"\2:\1", "").unwrap();
        assert_eq!(sub.apply("left-right"), "right:left");

        let dollar = Substitution::compile(r"^(\w+)$", "<$1>", "").unwrap();
        assert_eq!(dollar.apply("x"), "<x>");
    }

    #[test]
    fn substitution_case_insensitive() {
        let sub = Substitution::compile("obo", "OBO", "gi").unwrap();
        assert_eq!(sub.apply("obo Obo"), "OBO OBO");
    }
}
