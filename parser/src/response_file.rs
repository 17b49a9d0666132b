//! Response-file expansion.
//!
//! A token such as `@args.rsp` stands for the tokens stored in `args.rsp`.
//! Relative paths are resolved against the parser's working directory.
//! Expansion is never recursive: an `@` token read from a response file is
//! kept as an ordinary token.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use argtree_core::ResponseFileHandling;
use tracing::debug;

use crate::error::ParseError;

/// Returns the path named by a response-file token, if `token` is one.
///
/// A lone `@` is an ordinary token.
pub fn response_file_path(token: &str) -> Option<&str> {
    token.strip_prefix('@').filter(|rest| !rest.is_empty())
}

/// Expands every `@file` token in `tokens`.
///
/// With [`ResponseFileHandling::Disabled`] the tokens are returned
/// unchanged.
///
/// # Errors
///
/// Returns [`ParseError::ResponseFile`] if a referenced file is missing or
/// unreadable.
///
/// # Examples
///
/// ```
/// use argtree_core::ResponseFileHandling;
/// use argtree_parser::expand_response_files;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("args.rsp"), "--name \"hello world\"\n-v").unwrap();
///
/// let expanded = expand_response_files(
///     ["run", "@args.rsp", "tail"],
///     dir.path(),
///     ResponseFileHandling::SpaceSeparated,
/// )
/// .unwrap();
/// assert_eq!(expanded, ["run", "--name", "hello world", "-v", "tail"]);
/// ```
pub fn expand_response_files<I, S>(
    tokens: I,
    working_dir: &Path,
    handling: ResponseFileHandling,
) -> Result<Vec<String>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut stream = TokenStream::new(tokens);
    let mut out = Vec::new();
    while let Some(token) = stream.next(handling, working_dir)? {
        out.push(token);
    }
    Ok(out)
}

/// Reads and splits one response file.
pub fn read_response_file(
    path: &Path,
    handling: ResponseFileHandling,
) -> Result<Vec<String>, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::ResponseFile {
        path: path.to_path_buf(),
        source,
    })?;
    let tokens = split_response_text(&text, handling);
    debug!(path = %path.display(), tokens = tokens.len(), "Expanded response file");
    Ok(tokens)
}

/// Splits response-file text into tokens.
///
/// `SpaceSeparated` splits on any whitespace and keeps double-quoted spans
/// together (the quotes are dropped, `\"` inside quotes is a literal quote).
/// `LineSeparated` yields every non-blank line, trimmed. `Disabled` yields
/// nothing.
pub fn split_response_text(text: &str, handling: ResponseFileHandling) -> Vec<String> {
    match handling {
        ResponseFileHandling::Disabled => Vec::new(),
        ResponseFileHandling::LineSeparated => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        ResponseFileHandling::SpaceSeparated => split_space_separated(text),
    }
}

fn split_space_separated(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty token) from no token at all.
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Queue of raw tokens that expands response files as tokens are pulled.
///
/// Tokens spliced in from a response file are marked so they are never
/// expanded again.
#[derive(Debug, Default)]
pub(crate) struct TokenStream {
    pending: VecDeque<(String, bool)>,
}

impl TokenStream {
    pub(crate) fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: tokens.into_iter().map(|t| (t.into(), false)).collect(),
        }
    }

    /// Pulls the next token, expanding it first if it names a response file
    /// and `handling` allows it.
    pub(crate) fn next(
        &mut self,
        handling: ResponseFileHandling,
        working_dir: &Path,
    ) -> Result<Option<String>, ParseError> {
        while let Some((token, expanded)) = self.pending.pop_front() {
            let path = match response_file_path(&token) {
                Some(path) if !expanded && handling.is_enabled() => resolve(working_dir, path),
                _ => return Ok(Some(token)),
            };
            let tokens = read_response_file(&path, handling)?;
            for t in tokens.into_iter().rev() {
                self.pending.push_front((t, true));
            }
        }
        Ok(None)
    }

    /// Takes every remaining token verbatim, without expansion.
    pub(crate) fn drain(&mut self) -> Vec<String> {
        self.pending.drain(..).map(|(t, _)| t).collect()
    }
}

fn resolve(working_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_separated_quotes() {
        let tokens = split_response_text(
            "--name \"hello world\"\n  -x\t\"\" a\"b c\"d \"say \\\"hi\\\"\"",
            ResponseFileHandling::SpaceSeparated,
        );
        assert_eq!(
            tokens,
            vec!["--name", "hello world", "-x", "", "ab cd", "say \"hi\""]
        );
    }

    #[test]
    fn test_line_separated_keeps_spaces() {
        let tokens = split_response_text(
            "--name\nhello world\n\n   \n  -x  \n",
            ResponseFileHandling::LineSeparated,
        );
        assert_eq!(tokens, vec!["--name", "hello world", "-x"]);
    }

    #[test]
    fn test_response_file_path_detection() {
        assert_eq!(response_file_path("@args.rsp"), Some("args.rsp"));
        assert_eq!(response_file_path("@"), None);
        assert_eq!(response_file_path("args.rsp"), None);
    }

    #[test]
    fn test_disabled_leaves_tokens_untouched() {
        let out = expand_response_files(
            ["@missing.rsp", "x"],
            Path::new("/nonexistent"),
            ResponseFileHandling::Disabled,
        )
        .unwrap();
        assert_eq!(out, vec!["@missing.rsp", "x"]);
    }

    #[test]
    fn test_missing_file_fails() {
        let err = expand_response_files(
            ["@missing.rsp"],
            Path::new("/nonexistent/argtree"),
            ResponseFileHandling::SpaceSeparated,
        )
        .unwrap_err();
        match err {
            ParseError::ResponseFile { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/argtree/missing.rsp"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_expansion_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("outer.rsp"), "a @inner.rsp b").unwrap();
        std::fs::write(dir.path().join("inner.rsp"), "never").unwrap();

        let out = expand_response_files(
            ["@outer.rsp", "c"],
            dir.path(),
            ResponseFileHandling::SpaceSeparated,
        )
        .unwrap();
        assert_eq!(out, vec!["a", "@inner.rsp", "b", "c"]);
    }

    #[test]
    fn test_absolute_path_ignores_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abs.rsp");
        std::fs::write(&file, "x y").unwrap();

        let token = format!("@{}", file.display());
        let out = expand_response_files(
            [token],
            Path::new("/nonexistent"),
            ResponseFileHandling::SpaceSeparated,
        )
        .unwrap();
        assert_eq!(out, vec!["x", "y"]);
    }
}
