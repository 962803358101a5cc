//! Ternary search trie over road names
//!
//! One node per character with three children: `left`/`right` order sibling
//! characters, `mid` descends into the next character of the key. Keys are
//! iterated as `char`s, not bytes, since road names carry non-ASCII
//! characters. Values live on the node of a key's final character.
//!
//! Like the spatial index, the trie is built once and then queried through
//! `&self` without locks.

use crate::progress::ProgressHandle;
use crate::{AtlasError, Result};
use std::collections::HashMap;

struct Node<V> {
    ch: char,
    left: Option<Box<Node<V>>>,
    mid: Option<Box<Node<V>>>,
    right: Option<Box<Node<V>>>,
    value: Option<V>,
}

impl<V> Node<V> {
    fn new(ch: char) -> Box<Self> {
        Box::new(Self {
            ch,
            left: None,
            mid: None,
            right: None,
            value: None,
        })
    }
}

/// Ternary search trie mapping string keys to values.
pub struct TernaryTrie<V> {
    root: Option<Box<Node<V>>>,
    len: usize,
    progress: ProgressHandle,
}

impl<V> Default for TernaryTrie<V> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            progress: ProgressHandle::new(),
        }
    }
}

impl<V> TernaryTrie<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the trie.
    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle on the progress of the current/most recent `build`.
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Replace the trie with the entries of `map`. Empty keys are skipped
    /// rather than rejected, so a build over raw data never aborts.
    pub fn build(&mut self, map: HashMap<String, V>) {
        self.progress.reset();
        self.root = None;
        self.len = 0;

        let total = map.len();
        if total == 0 {
            self.progress.report(1.0);
            return;
        }

        for (inserted, (key, value)) in map.into_iter().enumerate() {
            let chars: Vec<char> = key.chars().collect();
            if !chars.is_empty() {
                self.put_chars(&chars, value);
            }
            self.progress.report((inserted + 1) as f64 / total as f64);
        }
        self.progress.report(1.0);
    }

    /// Insert one key, replacing any previous value.
    pub fn put(&mut self, key: &str, value: V) -> Result<()> {
        let chars: Vec<char> = key.chars().collect();
        if chars.is_empty() {
            return Err(AtlasError::EmptyKey);
        }
        self.put_chars(&chars, value);
        Ok(())
    }

    fn put_chars(&mut self, chars: &[char], value: V) {
        let root = self.root.take();
        let mut added = false;
        self.root = Some(Self::put_node(root, chars, 0, value, &mut added));
        if added {
            self.len += 1;
        }
    }

    fn put_node(
        node: Option<Box<Node<V>>>,
        chars: &[char],
        index: usize,
        value: V,
        added: &mut bool,
    ) -> Box<Node<V>> {
        let c = chars[index];
        let mut h = node.unwrap_or_else(|| Node::new(c));

        if c < h.ch {
            h.left = Some(Self::put_node(h.left.take(), chars, index, value, added));
        } else if c > h.ch {
            h.right = Some(Self::put_node(h.right.take(), chars, index, value, added));
        } else if index < chars.len() - 1 {
            h.mid = Some(Self::put_node(h.mid.take(), chars, index + 1, value, added));
        } else {
            *added = h.value.is_none();
            h.value = Some(value);
        }
        h
    }

    /// Look up one key exactly.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        let chars: Vec<char> = key.chars().collect();
        if chars.is_empty() {
            return Err(AtlasError::EmptyKey);
        }
        Ok(Self::get_node(self.root.as_deref(), &chars, 0).and_then(|n| n.value.as_ref()))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn get_node<'a>(
        node: Option<&'a Node<V>>,
        chars: &[char],
        index: usize,
    ) -> Option<&'a Node<V>> {
        let h = node?;
        let c = chars[index];
        if c < h.ch {
            Self::get_node(h.left.as_deref(), chars, index)
        } else if c > h.ch {
            Self::get_node(h.right.as_deref(), chars, index)
        } else if index < chars.len() - 1 {
            Self::get_node(h.mid.as_deref(), chars, index + 1)
        } else {
            Some(h)
        }
    }

    /// Every key in the trie, in character order.
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len);
        let mut prefix = String::new();
        Self::collect(self.root.as_deref(), &mut prefix, &mut out);
        out
    }

    /// Every key starting with `prefix`. An empty prefix matches every key.
    pub fn prefix_match(&self, prefix: &str) -> Vec<String> {
        let chars: Vec<char> = prefix.chars().collect();
        if chars.is_empty() {
            return self.keys();
        }

        let mut out = Vec::new();
        let Some(node) = Self::get_node(self.root.as_deref(), &chars, 0) else {
            return out;
        };
        // The prefix itself may be a complete key.
        if node.value.is_some() {
            out.push(prefix.to_string());
        }
        let mut buf = prefix.to_string();
        Self::collect(node.mid.as_deref(), &mut buf, &mut out);
        out
    }

    /// Every key matching `pattern`, where `.` matches any single character
    /// and the match is length-exact.
    pub fn wildcard_match(&self, pattern: &str) -> Vec<String> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut out = Vec::new();
        if chars.is_empty() {
            return out;
        }
        let mut prefix = String::new();
        Self::collect_matching(self.root.as_deref(), &mut prefix, &chars, 0, &mut out);
        out
    }

    /// The longest key that is a prefix of `query`, as a slice of `query`.
    pub fn longest_prefix_of<'a>(&self, query: &'a str) -> Option<&'a str> {
        let mut best_end = None;
        let mut node = self.root.as_deref();
        let mut iter = query.char_indices();
        let mut current = iter.next();

        while let (Some(h), Some((offset, c))) = (node, current) {
            if c < h.ch {
                node = h.left.as_deref();
            } else if c > h.ch {
                node = h.right.as_deref();
            } else {
                if h.value.is_some() {
                    best_end = Some(offset + c.len_utf8());
                }
                node = h.mid.as_deref();
                current = iter.next();
            }
        }

        best_end.map(|end| &query[..end])
    }

    // In-order traversal: left siblings, this node, descendants, right
    // siblings. Keeps output in character order.
    fn collect(node: Option<&Node<V>>, prefix: &mut String, out: &mut Vec<String>) {
        let Some(h) = node else {
            return;
        };
        Self::collect(h.left.as_deref(), prefix, out);
        prefix.push(h.ch);
        if h.value.is_some() {
            out.push(prefix.clone());
        }
        Self::collect(h.mid.as_deref(), prefix, out);
        prefix.pop();
        Self::collect(h.right.as_deref(), prefix, out);
    }

    fn collect_matching(
        node: Option<&Node<V>>,
        prefix: &mut String,
        pattern: &[char],
        index: usize,
        out: &mut Vec<String>,
    ) {
        let Some(h) = node else {
            return;
        };
        let c = pattern[index];

        if c == '.' || c < h.ch {
            Self::collect_matching(h.left.as_deref(), prefix, pattern, index, out);
        }
        if c == '.' || c == h.ch {
            if index == pattern.len() - 1 {
                if h.value.is_some() {
                    prefix.push(h.ch);
                    out.push(prefix.clone());
                    prefix.pop();
                }
            } else {
                prefix.push(h.ch);
                Self::collect_matching(h.mid.as_deref(), prefix, pattern, index + 1, out);
                prefix.pop();
            }
        }
        if c == '.' || c > h.ch {
            Self::collect_matching(h.right.as_deref(), prefix, pattern, index, out);
        }
    }
}
