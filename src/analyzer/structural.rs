//! Structural analysis over the syntax tree
//!
//! A depth-first walk that reports calls to catalog functions and
//! attributes each one to the function definition that encloses it.

use crate::analyzer::catalog::catalog;
use crate::analyzer::finding::{Category, Finding};
use crate::parser::ast::{NodeKind, SyntaxNode};

/// Tree walker holding the enclosing-function scope stack
pub struct StructuralWalker<'a> {
    scopes: Vec<Option<String>>,
    findings: &'a mut Vec<Finding>,
}

impl<'a> StructuralWalker<'a> {
    pub fn new(findings: &'a mut Vec<Finding>) -> Self {
        Self {
            scopes: Vec::new(),
            findings,
        }
    }

    /// Walk `node` and everything below it in pre-order.
    pub fn walk(&mut self, node: &SyntaxNode) {
        match node.kind {
            NodeKind::FunctionDefinition => {
                let name = function_name(node).map(str::to_string);
                log::trace!("entering function {:?}", name);
                self.scopes.push(name);
                self.walk_children(node);
                self.scopes.pop();
            }
            NodeKind::FunctionCall => {
                self.check_call(node);
                self.walk_children(node);
            }
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: &SyntaxNode) {
        for child in &node.children {
            self.walk(child);
        }
    }

    fn check_call(&mut self, call: &SyntaxNode) {
        let Some(callee) = call.child(0) else {
            log::debug!("skipping function call without callee at {:?}", call.location);
            return;
        };

        if callee.kind != NodeKind::Identifier {
            return;
        }
        let Some(entry) = callee.value().and_then(|name| catalog().get(name)) else {
            return;
        };

        let finding = Finding::new(
            Category::DangerousFunction,
            call.line().unwrap_or(0),
            entry.severity,
            entry.message.clone(),
            entry.suggestion.clone(),
        )
        .in_function(self.enclosing_function());

        self.findings.push(finding);
    }

    fn enclosing_function(&self) -> Option<String> {
        self.scopes.last().cloned().flatten()
    }
}

/// Name declared by a function definition's declarator.
pub fn function_name(definition: &SyntaxNode) -> Option<&str> {
    definition
        .find_child(NodeKind::Declarator)
        .and_then(declared_name)
}

/// First identifier found by descending through declarators.
fn declared_name(node: &SyntaxNode) -> Option<&str> {
    match node.kind {
        NodeKind::Declarator => node
            .find_child(NodeKind::DirectDeclarator)
            .and_then(declared_name),
        NodeKind::DirectDeclarator => match node.value() {
            Some(name) => Some(name),
            None => node.child(0).and_then(declared_name),
        },
        _ => None,
    }
}

/// Run the structural checks over `tree`, appending to `findings`.
pub fn analyze_tree(tree: &SyntaxNode, findings: &mut Vec<Finding>) {
    let before = findings.len();
    StructuralWalker::new(findings).walk(tree);
    log::debug!("structural pass produced {} findings", findings.len() - before);
}
