//! Arena-indexed constituency trees and a Penn Treebank bracket parser

use super::DocumentError;
use serde::{Deserialize, Serialize};

/// Index of a node inside a [`ConstituencyTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    label: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Set for leaves: 0-indexed position of the token the leaf spells
    token: Option<usize>,
}

/// Rooted, ordered phrase-structure tree. Node 0 is always the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConstituencyTree {
    nodes: Vec<Node>,
}

impl Default for ConstituencyTree {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                label: "ROOT".to_string(),
                children: Vec::new(),
                parent: None,
                token: None,
            }],
        }
    }
}

/// Category label with any functional suffix removed ("NP-SBJ" -> "NP")
pub fn base_label(label: &str) -> &str {
    label.split('-').next().unwrap_or(label)
}

enum Lexeme<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn lex(input: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in input.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push(Lexeme::Atom(&input[s..i]));
            }
            match c {
                '(' => out.push(Lexeme::Open),
                ')' => out.push(Lexeme::Close),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(Lexeme::Atom(&input[s..]));
    }
    out
}

impl ConstituencyTree {
    /// Parse a bracketed tree such as `(ROOT (S (NP (NNP Joan)) (VP (VBD left))))`.
    ///
    /// Leaves are numbered left to right and linked to token positions in
    /// that order. An unlabeled outermost bracket (`( (S ...))`) becomes ROOT.
    pub fn parse(input: &str) -> Result<Self, DocumentError> {
        let lexemes = lex(input);
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut leaves = 0usize;
        let mut i = 0usize;

        while i < lexemes.len() {
            match lexemes[i] {
                Lexeme::Open => {
                    let label = match lexemes.get(i + 1) {
                        Some(Lexeme::Atom(label)) => {
                            i += 1;
                            label.to_string()
                        }
                        _ if stack.is_empty() => "ROOT".to_string(),
                        _ => String::new(),
                    };
                    let parent = stack.last().copied();
                    if parent.is_none() && !nodes.is_empty() {
                        return Err(DocumentError::MultipleRoots);
                    }
                    let id = NodeId(nodes.len());
                    nodes.push(Node {
                        label,
                        children: Vec::new(),
                        parent,
                        token: None,
                    });
                    if let Some(p) = parent {
                        nodes[p.0].children.push(id);
                    }
                    stack.push(id);
                }
                Lexeme::Close => {
                    if stack.pop().is_none() {
                        return Err(DocumentError::UnbalancedTree(i));
                    }
                }
                Lexeme::Atom(word) => {
                    let parent = stack
                        .last()
                        .copied()
                        .ok_or_else(|| DocumentError::StrayLeaf(word.to_string()))?;
                    let id = NodeId(nodes.len());
                    nodes.push(Node {
                        label: word.to_string(),
                        children: Vec::new(),
                        parent: Some(parent),
                        token: Some(leaves),
                    });
                    nodes[parent.0].children.push(id);
                    leaves += 1;
                }
            }
            i += 1;
        }

        if !stack.is_empty() {
            return Err(DocumentError::UnbalancedTree(lexemes.len()));
        }
        if nodes.is_empty() {
            return Err(DocumentError::EmptyTree);
        }
        Ok(Self { nodes })
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1 && self.nodes[0].children.is_empty()
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].children.is_empty() && self.nodes[id.0].token.is_some()
    }

    /// Token position spelled by a leaf
    pub fn token_position(&self, id: NodeId) -> Option<usize> {
        self.nodes[id.0].token
    }

    /// All nodes in pre-order (parent before children, children left to right)
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root())
    }

    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Leaves under `id`, left to right
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.preorder_from(id)
            .into_iter()
            .filter(|&n| self.is_leaf(n))
            .collect()
    }

    /// Label of the node directly above a leaf (its POS tag)
    pub fn preterminal_label(&self, leaf: NodeId) -> Option<&str> {
        self.parent(leaf).map(|p| self.label(p))
    }

    /// Render back to single-line bracket notation
    pub fn to_bracketed(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root(), &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        if self.is_leaf(id) {
            out.push_str(self.label(id));
            return;
        }
        out.push('(');
        out.push_str(self.label(id));
        for &child in self.children(id) {
            out.push(' ');
            self.write_node(child, out);
        }
        out.push(')');
    }
}

impl TryFrom<String> for ConstituencyTree {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::parse(&value)
    }
}

impl From<ConstituencyTree> for String {
    fn from(tree: ConstituencyTree) -> Self {
        tree.to_bracketed()
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn bracket_soup() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec!["(", ")", "NP", "VP", "S", "dog", " ", "\n", "(NN cat)"]),
            0..40,
        )
        .prop_map(|parts| parts.join(""))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn parser_never_panics(ref input in bracket_soup()) {
            if let Ok(tree) = ConstituencyTree::parse(input) {
                let _ = tree.preorder();
                let _ = tree.to_bracketed();
            }
        }

        #[test]
        fn leaf_count_matches_words(words in prop::collection::vec("[a-z]{1,6}", 1..12)) {
            let body: Vec<String> = words.iter().map(|w| format!("(NN {})", w)).collect();
            let input = format!("(ROOT (NP {}))", body.join(" "));
            let tree = ConstituencyTree::parse(&input).unwrap();
            prop_assert_eq!(tree.leaves(tree.root()).len(), words.len());
        }
    }
}
