//! Lexical classification of a single command-line token.

/// A raw token classified by its shape alone.
///
/// Classification never looks at the command tree: whether `--port` is a
/// known option, or `serve` a subcommand, is decided by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// The literal `--`.
    Separator,
    /// `--name`, `--name=value` or `--name:value`.
    Long { name: &'a str, value: Option<&'a str> },
    /// `-x...`. `body` is everything after the dash; `name` and `value` are
    /// `body` split at the first `=` or `:`.
    Short {
        body: &'a str,
        name: &'a str,
        value: Option<&'a str>,
    },
    /// Anything else, including `-`, `-5` and `-1.5`.
    Positional(&'a str),
}

impl<'a> Token<'a> {
    pub(crate) fn classify(raw: &'a str) -> Self {
        if raw == "--" {
            return Self::Separator;
        }
        if let Some(rest) = raw.strip_prefix("--") {
            let (name, value) = split_value(rest);
            return Self::Long { name, value };
        }
        if let Some(body) = raw.strip_prefix('-') {
            match body.chars().next() {
                Some(c) if !c.is_ascii_digit() => {
                    let (name, value) = split_value(body);
                    return Self::Short { body, name, value };
                }
                _ => {}
            }
        }
        Self::Positional(raw)
    }

    pub(crate) fn is_option(&self) -> bool {
        matches!(self, Self::Long { .. } | Self::Short { .. })
    }
}

fn split_value(text: &str) -> (&str, Option<&str>) {
    match text.find(['=', ':']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    }
}
