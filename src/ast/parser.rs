use thiserror::Error;

use crate::ast::node::{DeclKind, DeclTree, Node};
use crate::ast::normalize::{NormalizeError, normalize, source_path};

/// A structural failure while parsing dump text. Fatal by design: a tree
/// that failed its consistency checks is not trustworthy, so no best-effort
/// tree is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("dump text contains no root line")]
    Empty,
    #[error("line {line}: unexpected second root line (no connector prefix)")]
    UnexpectedRoot { line: usize },
    #[error("line {line}: prefix {found:?} does not align with the tree built so far ({nearest:?})")]
    PrefixMismatch {
        line: usize,
        nearest: String,
        found: String,
    },
    #[error("line {line}: {source}")]
    Normalize { line: usize, source: NormalizeError },
}

/// Parse clang AST dump output into a declaration tree.
///
/// Each line splits at its first `-` into a connector prefix and the rest;
/// the prefix length encodes nesting depth. The first line (no prefix)
/// becomes the root, a longer prefix opens a child, and an equal or shorter
/// prefix unwinds to the matching ancestor and attaches a sibling there.
pub fn parse_dump(text: &str) -> Result<DeclTree, ParseError> {
    let mut lines = text.lines().enumerate();

    let (_, first) = lines.next().ok_or(ParseError::Empty)?;
    let (prefix, rest) = split_line(first);
    if !prefix.is_empty() {
        return Err(ParseError::Empty);
    }
    let (token, value) = split_kind(rest);
    let root = make_node(prefix, token, value)
        .map_err(|source| ParseError::Normalize { line: 1, source })?;
    let mut tree = DeclTree::with_root(root);
    let mut current = DeclTree::ROOT;

    for (idx, line) in lines {
        let line_no = idx + 1;
        let (prefix, rest) = split_line(line);
        if prefix.is_empty() {
            return Err(ParseError::UnexpectedRoot { line: line_no });
        }
        let (token, value) = split_kind(rest);
        let node = make_node(prefix, token, value)
            .map_err(|source| ParseError::Normalize { line: line_no, source })?;

        if tree.node(current).prefix.len() < prefix.len() {
            current = tree.attach(current, node);
        } else {
            // Unwind to the sibling level, then verify the two prefixes
            // agree apart from their final connector.
            let mut anchor = current;
            while tree.node(anchor).prefix.len() > prefix.len() {
                match tree.node(anchor).parent {
                    Some(parent) => anchor = parent,
                    None => break,
                }
            }
            let aligned =
                drop_last_char(&tree.node(anchor).prefix) == drop_last_char(prefix);
            match (aligned, tree.node(anchor).parent) {
                (true, Some(parent)) => current = tree.attach(parent, node),
                _ => {
                    return Err(ParseError::PrefixMismatch {
                        line: line_no,
                        nearest: tree.node(anchor).prefix.clone(),
                        found: prefix.to_string(),
                    });
                }
            }
        }
    }

    Ok(tree)
}

/// Split a dump line at its first `-` into connector prefix and rest; a
/// line without one is a root line.
fn split_line(line: &str) -> (&str, &str) {
    match line.split_once('-') {
        Some((prefix, rest)) => (prefix, rest),
        None => ("", line),
    }
}

/// Split a line's post-prefix text into the kind token and the remainder.
fn split_kind(rest: &str) -> (&str, &str) {
    let rest = rest.trim_start();
    match rest.split_once(char::is_whitespace) {
        Some((token, tail)) => (token, tail.trim_start()),
        None => (rest, ""),
    }
}

fn make_node(prefix: &str, token: &str, value: &str) -> Result<Node, NormalizeError> {
    let kind = DeclKind::from_token(token);
    let payload = normalize(&kind, value)?;
    Ok(Node {
        kind,
        raw: value.to_string(),
        payload,
        loc: source_path(value),
        prefix: prefix.to_string(),
        parent: None,
        children: Vec::new(),
    })
}

fn drop_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}
