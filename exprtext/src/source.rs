//! Source positions recorded by the parser.
use delegate::delegate;
use rustc_hash::FxHashMap;

use crate::ast::ExprId;

/// Character offsets of expression nodes and line breaks in the source text
/// an expression tree was parsed from.
///
/// Offsets count characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    positions: FxHashMap<ExprId, usize>,
    line_offsets: Vec<usize>,
}

impl SourceInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the offset of the node with the given id.
    pub fn set_position(&mut self, id: ExprId, offset: usize) {
        self.positions.insert(id, offset);
    }

    pub fn with_position(mut self, id: ExprId, offset: usize) -> Self {
        self.set_position(id, offset);
        self
    }

    /// The recorded offset of a node, if any.
    pub fn position(&self, id: ExprId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Records the offset of a line break in the source.
    pub fn add_line_break(&mut self, offset: usize) {
        self.line_offsets.push(offset);
    }

    pub fn with_line_break(mut self, offset: usize) -> Self {
        self.add_line_break(offset);
        self
    }

    /// Line break offsets in ascending order.
    pub fn line_offsets(&self) -> Vec<usize> {
        let mut offsets = self.line_offsets.clone();
        offsets.sort_unstable();
        offsets
    }

    /// Collects positions and line breaks from the source text of an
    /// expression, given the offset of each node.
    pub fn from_source(source: &str, positions: impl IntoIterator<Item = (ExprId, usize)>) -> Self {
        let line_offsets = source
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == '\n')
            .map(|(offset, _)| offset)
            .collect();

        Self {
            positions: positions.into_iter().collect(),
            line_offsets,
        }
    }

    delegate! {
        to self.positions {
            /// Number of nodes with a recorded position.
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
        }
    }
}

#[cfg(test)]
mod test {
    use super::SourceInfo;

    #[test]
    fn line_breaks_from_source() {
        let info = SourceInfo::from_source("a &&\nb ||\n c", [(1, 0), (3, 5)]);
        assert_eq!(info.line_offsets(), vec![4, 9]);
        assert_eq!(info.position(3), Some(5));
        assert_eq!(info.position(2), None);
        assert_eq!(info.len(), 2);
    }

    #[test]
    fn line_offsets_are_sorted() {
        let info = SourceInfo::new().with_line_break(9).with_line_break(2);
        assert_eq!(info.line_offsets(), vec![2, 9]);
        assert!(info.is_empty());
    }
}
