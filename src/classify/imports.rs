//! Import-statement extraction.
//!
//! Each supported language gets a small extractor that returns the set of
//! module names a source file imports. Languages without an extractor yield
//! an empty set.

use rustpython_parser::{ast, Parse};
use std::collections::BTreeSet;
use tree_sitter::{Node, Parser};

use crate::domain::Language;

#[derive(Debug, thiserror::Error)]
pub enum ImportParseError {
    #[error("python syntax error: {0}")]
    Python(String),

    #[error("failed to load {language} grammar")]
    Grammar { language: Language },

    #[error("{language} source did not parse cleanly")]
    Syntax { language: Language },
}

/// Module names imported by `content`.
pub fn extract_imports(
    language: Language,
    content: &str,
) -> Result<BTreeSet<String>, ImportParseError> {
    match language {
        Language::Python => python_imports(content),
        Language::Go => go_imports(content),
        Language::Rust => Ok(BTreeSet::new()),
    }
}

fn python_imports(content: &str) -> Result<BTreeSet<String>, ImportParseError> {
    let suite = ast::Suite::parse(content, "<archive>")
        .map_err(|err| ImportParseError::Python(err.to_string()))?;
    let mut modules = BTreeSet::new();
    collect_python_imports(&suite, &mut modules);
    Ok(modules)
}

// Imports can sit inside any block, so every statement body is visited.
fn collect_python_imports(body: &[ast::Stmt], modules: &mut BTreeSet<String>) {
    for stmt in body {
        match stmt {
            ast::Stmt::Import(import) => {
                modules.extend(import.names.iter().map(|alias| alias.name.as_str().to_string()));
            }
            ast::Stmt::ImportFrom(import) => {
                if let Some(module) = &import.module {
                    modules.insert(module.as_str().to_string());
                }
            }
            ast::Stmt::FunctionDef(def) => collect_python_imports(&def.body, modules),
            ast::Stmt::AsyncFunctionDef(def) => collect_python_imports(&def.body, modules),
            ast::Stmt::ClassDef(def) => collect_python_imports(&def.body, modules),
            ast::Stmt::For(node) => {
                collect_python_imports(&node.body, modules);
                collect_python_imports(&node.orelse, modules);
            }
            ast::Stmt::AsyncFor(node) => {
                collect_python_imports(&node.body, modules);
                collect_python_imports(&node.orelse, modules);
            }
            ast::Stmt::While(node) => {
                collect_python_imports(&node.body, modules);
                collect_python_imports(&node.orelse, modules);
            }
            ast::Stmt::If(node) => {
                collect_python_imports(&node.body, modules);
                collect_python_imports(&node.orelse, modules);
            }
            ast::Stmt::With(node) => collect_python_imports(&node.body, modules),
            ast::Stmt::AsyncWith(node) => collect_python_imports(&node.body, modules),
            ast::Stmt::Match(node) => {
                for case in &node.cases {
                    collect_python_imports(&case.body, modules);
                }
            }
            ast::Stmt::Try(node) => {
                collect_python_imports(&node.body, modules);
                collect_handler_imports(&node.handlers, modules);
                collect_python_imports(&node.orelse, modules);
                collect_python_imports(&node.finalbody, modules);
            }
            ast::Stmt::TryStar(node) => {
                collect_python_imports(&node.body, modules);
                collect_handler_imports(&node.handlers, modules);
                collect_python_imports(&node.orelse, modules);
                collect_python_imports(&node.finalbody, modules);
            }
            _ => {}
        }
    }
}

fn collect_handler_imports(handlers: &[ast::ExceptHandler], modules: &mut BTreeSet<String>) {
    for handler in handlers {
        if let ast::ExceptHandler::ExceptHandler(handler) = handler {
            collect_python_imports(&handler.body, modules);
        }
    }
}

fn go_imports(content: &str) -> Result<BTreeSet<String>, ImportParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|_| ImportParseError::Grammar { language: Language::Go })?;

    let tree =
        parser.parse(content, None).ok_or(ImportParseError::Syntax { language: Language::Go })?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(ImportParseError::Syntax { language: Language::Go });
    }

    let mut modules = BTreeSet::new();
    collect_go_imports(root, content.as_bytes(), &mut modules);
    Ok(modules)
}

fn collect_go_imports(node: Node<'_>, source: &[u8], modules: &mut BTreeSet<String>) {
    if node.kind() == "import_spec" {
        if let Some(path) = node.child_by_field_name("path") {
            if let Ok(text) = path.utf8_text(source) {
                modules.insert(text.trim_matches(|c| c == '"' || c == '`').to_string());
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        // Go only allows imports before the first declaration.
        if matches!(child.kind(), "function_declaration" | "method_declaration") {
            continue;
        }
        collect_go_imports(child, source, modules);
    }
}
