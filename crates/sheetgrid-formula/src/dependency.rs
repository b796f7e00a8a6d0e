//! Dependency tracking for reactive recalculation

use ahash::{AHashMap, AHashSet};
use sheetgrid_core::{CellAddress, CellRange};

/// Grid position of a formula cell or one of its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: u32,
    pub col: u16,
}

impl CellKey {
    /// Create a new cell key
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Create from a cell address (absolute markers are dropped)
    pub fn from_address(addr: &CellAddress) -> Self {
        Self::new(addr.row, addr.col)
    }
}

/// Dependency graph for formula cells
///
/// Edges run from a precedent (a cell that is read) to its dependents
/// (formula cells that read it).
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → cells that depend on it
    dependents: AHashMap<CellKey, AHashSet<CellKey>>,
    /// Cell → cells it depends on
    precedents: AHashMap<CellKey, AHashSet<CellKey>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: `dependent` reads `precedent`
    pub fn add_dependency(&mut self, precedent: CellKey, dependent: CellKey) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Forget everything `cell` reads
    ///
    /// Cells that read `cell` keep their edges; they still depend on it
    /// whatever it now holds.
    pub fn clear_dependencies(&mut self, cell: CellKey) {
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }
    }

    /// Replace the inputs of `cell` with every cell of `ranges`
    pub fn set_precedents(&mut self, cell: CellKey, ranges: &[CellRange]) {
        self.clear_dependencies(cell);
        for range in ranges {
            for addr in range.cells() {
                self.add_dependency(CellKey::from_address(&addr), cell);
            }
        }
    }

    /// Get cells that depend on the given cell
    pub fn get_dependents(&self, cell: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn get_precedents(&self, cell: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Transitive dependents of `changed`, ordered so every cell comes
    /// after all of its precedents
    ///
    /// The changed cells themselves are not included. Cells on a cycle are
    /// still returned once; callers detect cycles with
    /// [`has_circular_reference`](Self::has_circular_reference).
    pub fn get_recalc_order(&self, changed: &[CellKey]) -> Vec<CellKey> {
        let mut result = Vec::new();
        let mut visited = AHashSet::new();
        let mut in_stack = AHashSet::new();

        for &cell in changed {
            self.topological_sort(cell, &mut result, &mut visited, &mut in_stack);
        }

        // DFS emits dependents before the cells they read
        result.reverse();
        result.retain(|cell| !changed.contains(cell));
        result
    }

    fn topological_sort(
        &self,
        cell: CellKey,
        result: &mut Vec<CellKey>,
        visited: &mut AHashSet<CellKey>,
        in_stack: &mut AHashSet<CellKey>,
    ) {
        if visited.contains(&cell) || in_stack.contains(&cell) {
            return;
        }

        in_stack.insert(cell);

        if let Some(dependents) = self.dependents.get(&cell) {
            // Sorted for a deterministic order
            let mut next: Vec<CellKey> = dependents.iter().copied().collect();
            next.sort_unstable();
            for dependent in next {
                self.topological_sort(dependent, result, visited, in_stack);
            }
        }

        in_stack.remove(&cell);
        visited.insert(cell);
        result.push(cell);
    }

    /// Whether `cell` can reach itself through its precedents
    pub fn has_circular_reference(&self, cell: CellKey) -> bool {
        let mut visited = AHashSet::new();
        let mut stack: Vec<CellKey> = self.get_precedents(cell).collect();

        while let Some(current) = stack.pop() {
            if current == cell {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.get_precedents(current));
            }
        }
        false
    }

    /// Number of cells with at least one precedent
    pub fn formula_count(&self) -> usize {
        self.precedents.len()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();

        let a1 = CellKey::new(0, 0);
        let b1 = CellKey::new(0, 1);

        graph.add_dependency(a1, b1);

        assert!(graph.get_dependents(a1).any(|c| c == b1));
        assert!(graph.get_precedents(b1).any(|c| c == a1));
    }

    #[test]
    fn test_set_precedents_expands_ranges() {
        let mut graph = DependencyGraph::new();
        let c1 = CellKey::new(0, 2);

        graph.set_precedents(c1, &[CellRange::from_indices(0, 0, 1, 1)]);
        assert_eq!(graph.get_precedents(c1).count(), 4);

        graph.set_precedents(c1, &[CellRange::from_indices(5, 0, 5, 0)]);
        let precedents: Vec<_> = graph.get_precedents(c1).collect();
        assert_eq!(precedents, vec![CellKey::new(5, 0)]);
        assert_eq!(graph.get_dependents(CellKey::new(0, 0)).count(), 0);
    }

    #[test]
    fn test_recalc_order_is_topological() {
        let mut graph = DependencyGraph::new();

        let a1 = CellKey::new(0, 0);
        let b1 = CellKey::new(0, 1);
        let c1 = CellKey::new(0, 2);
        let d1 = CellKey::new(0, 3);

        // B1 = A1, C1 = A1 + B1, D1 = C1
        graph.add_dependency(a1, b1);
        graph.add_dependency(a1, c1);
        graph.add_dependency(b1, c1);
        graph.add_dependency(c1, d1);

        let order = graph.get_recalc_order(&[a1]);
        assert_eq!(order, vec![b1, c1, d1]);
    }

    #[test]
    fn test_circular_reference() {
        let mut graph = DependencyGraph::new();

        let a1 = CellKey::new(0, 0);
        let b1 = CellKey::new(0, 1);
        let c1 = CellKey::new(0, 2);

        // A1 -> B1 -> C1 -> A1
        graph.add_dependency(a1, b1);
        graph.add_dependency(b1, c1);
        graph.add_dependency(c1, a1);

        assert!(graph.has_circular_reference(a1));
        assert!(graph.has_circular_reference(b1));
    }

    #[test]
    fn test_no_circular_reference() {
        let mut graph = DependencyGraph::new();

        let a1 = CellKey::new(0, 0);
        let b1 = CellKey::new(0, 1);
        let c1 = CellKey::new(0, 2);

        graph.add_dependency(a1, b1);
        graph.add_dependency(b1, c1);

        assert!(!graph.has_circular_reference(a1));
        assert!(!graph.has_circular_reference(c1));
    }

    #[test]
    fn test_self_reference() {
        let mut graph = DependencyGraph::new();
        let a1 = CellKey::new(0, 0);
        graph.set_precedents(a1, &[CellRange::single(CellAddress::new(0, 0))]);
        assert!(graph.has_circular_reference(a1));
    }
}
