//! Prefix Trie
//!
//! Deduplicates the prefixes of a word set. Nodes are stored in a flat table
//! with parent links; a node's parent always sits one level closer to the
//! root, so processing [`PrefixTrie::levels`] in order guarantees parents are
//! computed before their children.

use ahash::AHashMap;
use word_alphabet::{ExtendedLetter, Word};

/// One distinct prefix
#[derive(Debug, Clone)]
pub struct TrieNode {
    /// The prefix this node stands for, gap weights included
    pub prefix: Word,
    /// Node of the prefix one letter shorter (`None` at depth 1)
    pub parent: Option<usize>,
    /// Indices of the nodes extending this prefix by one letter
    pub children: Vec<usize>,
}

impl TrieNode {
    /// Number of letters in the prefix
    pub fn depth(&self) -> usize {
        self.prefix.len()
    }

    /// The letter that extends the parent prefix into this one
    pub fn letter(&self) -> Option<&ExtendedLetter> {
        self.prefix.letters().last()
    }

    /// Gap weight in front of the last letter
    pub fn alpha(&self) -> f64 {
        self.prefix.gap_before(self.prefix.len().saturating_sub(1))
    }
}

/// Trie over the prefixes of a word set
#[derive(Debug, Clone, Default)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    paths: Vec<Vec<usize>>,
}

impl PrefixTrie {
    /// Build the trie; empty words get an empty path
    pub fn build(words: &[Word]) -> Self {
        let mut nodes: Vec<TrieNode> = Vec::new();
        let mut index: AHashMap<Word, usize> = AHashMap::new();
        let mut paths = Vec::with_capacity(words.len());

        for word in words {
            let mut path = Vec::with_capacity(word.len());
            let mut parent = None;
            for k in 1..=word.len() {
                let prefix = word.prefix(k);
                let node = match index.get(&prefix) {
                    Some(&node) => node,
                    None => {
                        let node = nodes.len();
                        nodes.push(TrieNode {
                            prefix: prefix.clone(),
                            parent,
                            children: Vec::new(),
                        });
                        if let Some(p) = parent {
                            nodes[p].children.push(node);
                        }
                        index.insert(prefix, node);
                        node
                    }
                };
                path.push(node);
                parent = Some(node);
            }
            paths.push(path);
        }

        Self { nodes, paths }
    }

    /// Number of distinct non-empty prefixes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &TrieNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[TrieNode] {
        &self.nodes
    }

    /// Nodes of the prefixes `1..=len` of word `word`
    pub fn path(&self, word: usize) -> &[usize] {
        &self.paths[word]
    }

    /// Node of the full word `word`
    pub fn terminal(&self, word: usize) -> Option<usize> {
        self.paths[word].last().copied()
    }

    /// Node indices grouped by depth, shallowest first
    pub fn levels(&self) -> Vec<Vec<usize>> {
        let depth = self.nodes.iter().map(TrieNode::depth).max().unwrap_or(0);
        let mut levels = vec![Vec::new(); depth];
        for (i, node) in self.nodes.iter().enumerate() {
            levels[node.depth() - 1].push(i);
        }
        levels
    }
}
