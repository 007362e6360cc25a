use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::ast::node::{DeclKind, Payload};

static RECORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\b(struct|class)\b\s+(.*)\s+definition").unwrap());

static HEADER_LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*<([^\s]*\.(?:hpp|hxx|h)):\d+:\d+").unwrap());

/// A normalization failure. All variants are fatal: later stages assume
/// every node carries a well-formed payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("{kind} carries no quoted signature: {raw:?}")]
    MissingSignature { kind: String, raw: String },
    #[error("{kind} has no name before its signature: {raw:?}")]
    MissingName { kind: String, raw: String },
    #[error("unhandled kind {kind} unexpectedly carries a quote: {raw:?}")]
    UnexpectedSignature { kind: String, raw: String },
}

/// Extract the kind-dependent payload from a dump line's remainder text.
///
/// Unrecognized declaration kinds are reported on stderr and carried along
/// verbatim so new clang releases surface as diagnostics, not failures.
pub fn normalize(kind: &DeclKind, raw: &str) -> Result<Payload, NormalizeError> {
    match kind {
        DeclKind::TranslationUnit => Ok(Payload::Empty),

        DeclKind::Namespace | DeclKind::AccessSpec | DeclKind::LinkageSpec => Ok(Payload::Token(
            raw.split_whitespace().next_back().unwrap_or("").to_string(),
        )),

        DeclKind::Typedef
        | DeclKind::Method
        | DeclKind::Constructor
        | DeclKind::Destructor
        | DeclKind::Param
        | DeclKind::TypeAlias
        | DeclKind::EnumConstant
        | DeclKind::Function
        | DeclKind::Var
        | DeclKind::Field
        | DeclKind::IndirectField
        | DeclKind::UsingValue => split_symbol(kind, raw),

        DeclKind::Record => Ok(match RECORD_RE.captures(raw) {
            Some(caps) => Payload::Record {
                keyword: caps[1].to_string(),
                name: caps[2].to_string(),
            },
            // No "<keyword> <name> definition" marker: forward declaration.
            None => Payload::Opaque,
        }),

        DeclKind::UsingShadow
        | DeclKind::Conversion
        | DeclKind::NonTypeTemplateParm
        | DeclKind::UsingDirective
        | DeclKind::Friend
        | DeclKind::Enum
        | DeclKind::ClassTemplate
        | DeclKind::TemplateTypeParm
        | DeclKind::ClassTemplateSpecialization
        | DeclKind::TypeAliasTemplate
        | DeclKind::FunctionTemplate
        | DeclKind::Using
        | DeclKind::ClassTemplatePartialSpecialization
        | DeclKind::TemplateTemplateParm
        | DeclKind::StaticAssert
        | DeclKind::VarTemplate
        | DeclKind::Anonymous => Ok(Payload::Opaque),

        DeclKind::Other(token) => {
            if token.ends_with("Decl") {
                eprintln!("warning: unhandled declaration kind {token}: {raw}");
                // A quote means this is really a name+signature kind that the
                // dispatch above should have routed.
                if raw.contains('\'') {
                    return Err(NormalizeError::UnexpectedSignature {
                        kind: token.clone(),
                        raw: raw.to_string(),
                    });
                }
            }
            Ok(Payload::Raw)
        }
    }
}

/// Split `... name 'signature' modifier` into its three parts.
fn split_symbol(kind: &DeclKind, raw: &str) -> Result<Payload, NormalizeError> {
    let open = raw.find('\'');
    let close = raw.rfind('\'');
    let (open, close) = match (open, close) {
        (Some(i), Some(j)) if i < j => (i, j),
        _ => {
            return Err(NormalizeError::MissingSignature {
                kind: kind.token().to_string(),
                raw: raw.to_string(),
            });
        }
    };

    let name = raw[..open]
        .trim_end()
        .split_whitespace()
        .next_back()
        .ok_or_else(|| NormalizeError::MissingName {
            kind: kind.token().to_string(),
            raw: raw.to_string(),
        })?;

    // Unnamed parameters have a source position (`col:5`) where the name
    // would be.
    let name = if *kind == DeclKind::Param && name.contains(':') {
        ""
    } else {
        name
    };

    Ok(Payload::Symbol {
        name: name.to_string(),
        signature: raw[open + 1..close].to_string(),
        modifier: raw[close + 1..].trim().to_string(),
    })
}

/// Header path from the line's `<path:line:col>` location marker, if the
/// path ends in a header extension.
pub fn source_path(raw: &str) -> Option<String> {
    HEADER_LOC_RE
        .captures(raw)
        .map(|caps| caps[1].to_string())
}
