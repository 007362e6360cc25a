use std::fmt;

/// Declaration kinds the tool understands, one variant per clang dump token.
///
/// `Other` carries the original token for kinds outside the closed set so
/// new clang releases degrade to a diagnostic instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    TranslationUnit,
    Namespace,
    AccessSpec,
    LinkageSpec,
    Typedef,
    Method,
    Constructor,
    Destructor,
    Param,
    TypeAlias,
    EnumConstant,
    Function,
    Var,
    Field,
    IndirectField,
    UsingValue,
    Record,
    UsingShadow,
    Conversion,
    NonTypeTemplateParm,
    UsingDirective,
    Friend,
    Enum,
    ClassTemplate,
    TemplateTypeParm,
    ClassTemplateSpecialization,
    TypeAliasTemplate,
    FunctionTemplate,
    Using,
    ClassTemplatePartialSpecialization,
    TemplateTemplateParm,
    StaticAssert,
    VarTemplate,
    /// A line with no kind token at all.
    Anonymous,
    Other(String),
}

impl DeclKind {
    pub fn from_token(token: &str) -> DeclKind {
        match token {
            "TranslationUnitDecl" => DeclKind::TranslationUnit,
            "NamespaceDecl" => DeclKind::Namespace,
            "AccessSpecDecl" => DeclKind::AccessSpec,
            "LinkageSpecDecl" => DeclKind::LinkageSpec,
            "TypedefDecl" => DeclKind::Typedef,
            "CXXMethodDecl" => DeclKind::Method,
            "CXXConstructorDecl" => DeclKind::Constructor,
            "CXXDestructorDecl" => DeclKind::Destructor,
            "ParmVarDecl" => DeclKind::Param,
            "TypeAliasDecl" => DeclKind::TypeAlias,
            "EnumConstantDecl" => DeclKind::EnumConstant,
            "FunctionDecl" => DeclKind::Function,
            "VarDecl" => DeclKind::Var,
            "FieldDecl" => DeclKind::Field,
            "IndirectFieldDecl" => DeclKind::IndirectField,
            "UnresolvedUsingValueDecl" => DeclKind::UsingValue,
            "CXXRecordDecl" => DeclKind::Record,
            "UsingShadowDecl" => DeclKind::UsingShadow,
            "CXXConversionDecl" => DeclKind::Conversion,
            "NonTypeTemplateParmDecl" => DeclKind::NonTypeTemplateParm,
            "UsingDirectiveDecl" => DeclKind::UsingDirective,
            "FriendDecl" => DeclKind::Friend,
            "EnumDecl" => DeclKind::Enum,
            "ClassTemplateDecl" => DeclKind::ClassTemplate,
            "TemplateTypeParmDecl" => DeclKind::TemplateTypeParm,
            "ClassTemplateSpecializationDecl" => DeclKind::ClassTemplateSpecialization,
            "TypeAliasTemplateDecl" => DeclKind::TypeAliasTemplate,
            "FunctionTemplateDecl" => DeclKind::FunctionTemplate,
            "UsingDecl" => DeclKind::Using,
            "ClassTemplatePartialSpecializationDecl" => {
                DeclKind::ClassTemplatePartialSpecialization
            }
            "TemplateTemplateParmDecl" => DeclKind::TemplateTemplateParm,
            "StaticAssertDecl" => DeclKind::StaticAssert,
            "VarTemplateDecl" => DeclKind::VarTemplate,
            "" => DeclKind::Anonymous,
            other => DeclKind::Other(other.to_string()),
        }
    }

    /// The clang dump token this kind was parsed from.
    pub fn token(&self) -> &str {
        match self {
            DeclKind::TranslationUnit => "TranslationUnitDecl",
            DeclKind::Namespace => "NamespaceDecl",
            DeclKind::AccessSpec => "AccessSpecDecl",
            DeclKind::LinkageSpec => "LinkageSpecDecl",
            DeclKind::Typedef => "TypedefDecl",
            DeclKind::Method => "CXXMethodDecl",
            DeclKind::Constructor => "CXXConstructorDecl",
            DeclKind::Destructor => "CXXDestructorDecl",
            DeclKind::Param => "ParmVarDecl",
            DeclKind::TypeAlias => "TypeAliasDecl",
            DeclKind::EnumConstant => "EnumConstantDecl",
            DeclKind::Function => "FunctionDecl",
            DeclKind::Var => "VarDecl",
            DeclKind::Field => "FieldDecl",
            DeclKind::IndirectField => "IndirectFieldDecl",
            DeclKind::UsingValue => "UnresolvedUsingValueDecl",
            DeclKind::Record => "CXXRecordDecl",
            DeclKind::UsingShadow => "UsingShadowDecl",
            DeclKind::Conversion => "CXXConversionDecl",
            DeclKind::NonTypeTemplateParm => "NonTypeTemplateParmDecl",
            DeclKind::UsingDirective => "UsingDirectiveDecl",
            DeclKind::Friend => "FriendDecl",
            DeclKind::Enum => "EnumDecl",
            DeclKind::ClassTemplate => "ClassTemplateDecl",
            DeclKind::TemplateTypeParm => "TemplateTypeParmDecl",
            DeclKind::ClassTemplateSpecialization => "ClassTemplateSpecializationDecl",
            DeclKind::TypeAliasTemplate => "TypeAliasTemplateDecl",
            DeclKind::FunctionTemplate => "FunctionTemplateDecl",
            DeclKind::Using => "UsingDecl",
            DeclKind::ClassTemplatePartialSpecialization => {
                "ClassTemplatePartialSpecializationDecl"
            }
            DeclKind::TemplateTemplateParm => "TemplateTemplateParmDecl",
            DeclKind::StaticAssert => "StaticAssertDecl",
            DeclKind::VarTemplate => "VarTemplateDecl",
            DeclKind::Anonymous => "",
            DeclKind::Other(token) => token,
        }
    }

    /// Whether this node describes a declaration (as opposed to statements,
    /// types, comments and other dump nodes carried along verbatim).
    pub fn is_decl(&self) -> bool {
        match self {
            DeclKind::Anonymous => false,
            DeclKind::Other(token) => token.ends_with("Decl"),
            _ => true,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Kind-dependent normalized value, produced once at node construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Translation-unit sentinel: no value.
    Empty,
    /// Namespace name, access keyword, or linkage string.
    Token(String),
    /// Name + quoted signature + trailing modifier (e.g. `static`).
    Symbol {
        name: String,
        signature: String,
        modifier: String,
    },
    /// A struct/class definition: `keyword` is `struct` or `class`.
    Record { keyword: String, name: String },
    /// Forward declarations and the fixed set of irrelevant kinds.
    Opaque,
    /// Non-declaration nodes: the payload is the raw text itself.
    Raw,
}

/// Index of a node within its [`DeclTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single dump line turned into a declaration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: DeclKind,
    /// Untouched remainder text from the dump line (provenance).
    pub raw: String,
    pub payload: Payload,
    /// Header path from a `<path:line:col>` marker, when present.
    pub loc: Option<String>,
    /// Raw connector string; only drives parsing.
    pub prefix: String,
    pub parent: Option<NodeId>,
    /// Dump order = declaration order within the enclosing scope.
    pub children: Vec<NodeId>,
}

impl Node {
    /// The normalized value rendered as display text.
    pub fn value_text(&self) -> String {
        match &self.payload {
            Payload::Empty => String::new(),
            Payload::Token(token) => token.clone(),
            Payload::Symbol {
                name,
                signature,
                modifier,
            } => {
                if modifier.is_empty() {
                    format!("{name} '{signature}'")
                } else {
                    format!("{name} '{signature}' {modifier}")
                }
            }
            Payload::Record { keyword, name } => format!("{keyword} {name}"),
            Payload::Opaque => "...".to_string(),
            Payload::Raw => self.raw.clone(),
        }
    }
}

/// Arena-backed declaration tree. The root is always the translation unit;
/// parents own their children exclusively, and the `parent` back-reference
/// is a plain index used only for upward queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclTree {
    nodes: Vec<Node>,
}

impl DeclTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn with_root(mut root: Node) -> DeclTree {
        root.parent = None;
        root.children.clear();
        DeclTree { nodes: vec![root] }
    }

    /// Append `node` as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order traversal: parent before children, children in
    /// dump order. This ordering is what makes generation deterministic.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![DeclTree::ROOT],
        }
    }

    /// Walk from `id`'s parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }

    /// Enclosing namespace names, outermost first.
    pub fn namespace_path(&self, id: NodeId) -> Vec<&str> {
        let mut path: Vec<&str> = self
            .ancestors(id)
            .filter_map(|anc| {
                let node = self.node(anc);
                match (&node.kind, &node.payload) {
                    (DeclKind::Namespace, Payload::Token(name)) => Some(name.as_str()),
                    _ => None,
                }
            })
            .collect();
        path.reverse();
        path
    }

    /// Indented `kind:value` listing of the tree, filtered to declaration
    /// kinds. Used by `--dump-ast` and verbose output.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_node(DeclTree::ROOT, "", &mut lines);
        lines.join("\n")
    }

    fn render_node(&self, id: NodeId, indent: &str, lines: &mut Vec<String>) {
        let node = self.node(id);
        lines.push(format!("{indent}{}:{}", node.kind, node.value_text()));
        let child_indent = format!("{indent}  ");
        for &child in &node.children {
            if self.node(child).kind.is_decl() {
                self.render_node(child, &child_indent, lines);
            }
        }
    }
}

pub struct Preorder<'a> {
    tree: &'a DeclTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(id)
    }
}

pub struct Ancestors<'a> {
    tree: &'a DeclTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.node(id).parent;
        Some(id)
    }
}
