//! Declaration tree built from clang's AST dump output: parsing,
//! per-kind value normalization, and pruning down to the declarations
//! worth binding.

pub mod node;
pub mod normalize;
pub mod parser;
pub mod prune;

pub use node::{DeclKind, DeclTree, Node, NodeId, Payload};
pub use parser::{ParseError, parse_dump};
pub use prune::{PrunePolicy, prune};
