use anyhow::{Result, bail};
use serde::Serialize;

use crate::ast::node::{DeclKind, DeclTree, NodeId, Payload};

/// A declaration selected for binding.
#[derive(Debug, Clone, Serialize)]
pub struct BoundSymbol {
    /// The declaration's own name.
    pub name: String,
    /// Namespace/record-qualified C++ name, e.g. `ns::BarCls::fun`.
    pub qualified: String,
    /// Cross-boundary-safe flattened identifier, e.g. `ns__BarCls__fun`.
    pub symbol: String,
    /// Signature string as stated by the dump.
    pub signature: String,
}

/// A named text blob; writing it to disk is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub contents: String,
}

/// Everything the generator produces for one module.
#[derive(Debug, Clone)]
pub struct Bindings {
    pub symbols: Vec<BoundSymbol>,
    /// C++ shim exposing one address accessor per bound symbol.
    pub shim: Artifact,
    /// Python module binding each address to a typed callable.
    pub manifest: Artifact,
    /// Library name the manifest loads, without the `lib` prefix or the
    /// platform extension.
    pub shared_library_name: String,
}

impl Bindings {
    pub fn shared_library_filename(&self) -> String {
        format!("lib{}.so", self.shared_library_name)
    }
}

/// Collect the bindable declarations of a pruned tree and render both
/// artifacts. Selection and output follow traversal order alone, so
/// identical trees always produce byte-identical artifacts.
pub fn generate(tree: &DeclTree, modulename: &str, headers: &[String]) -> Result<Bindings> {
    let mut symbols = Vec::new();

    // Free functions first, then static member functions, each in dump
    // order.
    for id in tree.preorder() {
        let node = tree.node(id);
        if node.kind != DeclKind::Function {
            continue;
        }
        if let Payload::Symbol {
            name, signature, ..
        } = &node.payload
        {
            symbols.push(bound_symbol(tree, id, &[], name, signature));
        }
    }

    for id in tree.preorder() {
        let node = tree.node(id);
        if node.kind != DeclKind::Method {
            continue;
        }
        let Payload::Symbol {
            name,
            signature,
            modifier,
        } = &node.payload
        else {
            continue;
        };
        if !modifier.ends_with("static") {
            continue;
        }
        let class_name = enclosing_record_name(tree, id, name)?;
        symbols.push(bound_symbol(tree, id, &[class_name], name, signature));
    }

    let shim = render_shim(modulename, headers, &symbols);
    let manifest = render_manifest(modulename, &symbols);
    Ok(Bindings {
        symbols,
        shim,
        manifest,
        shared_library_name: format!("cxx2py_{modulename}"),
    })
}

/// A static method only makes sense directly inside a class definition.
fn enclosing_record_name<'t>(
    tree: &'t DeclTree,
    id: NodeId,
    method: &str,
) -> Result<&'t str> {
    let parent = match tree.node(id).parent {
        Some(parent) => tree.node(parent),
        None => bail!("static method {method} has no enclosing declaration"),
    };
    match (&parent.kind, &parent.payload) {
        (DeclKind::Record, Payload::Record { name, .. }) => Ok(name),
        _ => bail!(
            "static method {method} is not enclosed by a class definition (found {})",
            parent.kind
        ),
    }
}

fn bound_symbol(
    tree: &DeclTree,
    id: NodeId,
    inner: &[&str],
    name: &str,
    signature: &str,
) -> BoundSymbol {
    let mut segments = tree.namespace_path(id);
    segments.extend(inner);
    segments.push(name);
    BoundSymbol {
        name: name.to_string(),
        qualified: segments.join("::"),
        symbol: segments.join("__"),
        signature: signature.to_string(),
    }
}

fn render_shim(modulename: &str, headers: &[String], symbols: &[BoundSymbol]) -> Artifact {
    let mut blocks = vec![
        "#include <memory>".to_string(),
        "#include <cstdint>".to_string(),
    ];
    for header in headers {
        blocks.push(format!("#include \"{header}\""));
    }
    for sym in symbols {
        blocks.push(format!(
            "\nextern \"C\" intptr_t get_{symbol}_address() {{\n  \
             /* {signature} */\n  \
             return reinterpret_cast<intptr_t>(std::addressof({qualified}));\n}}\n",
            symbol = sym.symbol,
            signature = sym.signature,
            qualified = sym.qualified,
        ));
    }
    Artifact {
        filename: format!("cxx2py_{modulename}.cpp"),
        contents: blocks.join("\n"),
    }
}

fn render_manifest(modulename: &str, symbols: &[BoundSymbol]) -> Artifact {
    let mut blocks = vec![format!(
        "\n# This Python module `{modulename}` is auto-generated using cxx2py tool!\n\
         __all__ = []\n\
         import ctypes\n\
         import rbc\n\
         \n\
         def _load_library(name):\n    \
             # FIXME: win\n    \
             return ctypes.cdll.LoadLibrary(f'lib{{name}}.so')\n\
         \n\
         _lib = _load_library(\"cxx2py_{modulename}\")\n\
         \n\
         _target_info = rbc.targetinfo.TargetInfo('cpu')\n"
    )];
    for sym in symbols {
        blocks.push(format!(
            "\n_lib.get_{symbol}_address.argtypes = ()\n\
             _lib.get_{symbol}_address.restype = ctypes.c_void_p\n\
             with _target_info:\n    \
                 _{symbol}_signature = rbc.typesystem.Type.fromstring(\"{signature}\")\n\
             {symbol} = _{symbol}_signature.toctypes()(_lib.get_{symbol}_address())\n\
             __all__.append(\"{symbol}\")\n",
            symbol = sym.symbol,
            signature = sym.signature,
        ));
    }
    Artifact {
        filename: format!("{modulename}.py"),
        contents: blocks.join("\n"),
    }
}
