/// One column of the partial derivative matrix: the derivative of the basis
/// function with the given order with respect to one nonlinear parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativeColumn {
    /// order of the basis function that was differentiated
    pub order: usize,
    /// column of the partial derivative matrix that holds the derivative
    pub column: usize,
}

/// Maps every nonlinear parameter to the partial derivative columns that
/// differentiate the basis with respect to it.
///
/// For parameter `$\alpha_i$` the entries are `(order, column)` pairs, so that
/// the column of the partial derivative matrix holds `$\partial \phi_{order} / \partial \alpha_i$`.
/// An empty index (no entries at all) signals that the function system provides
/// no analytic derivatives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialDerivativeIndex {
    entries: Vec<Vec<DerivativeColumn>>,
}

impl PartialDerivativeIndex {
    /// an index for the given number of nonlinear parameters without any entries
    pub fn new(parameter_count: usize) -> Self {
        Self {
            entries: vec![Vec::new(); parameter_count],
        }
    }

    /// record that `column` holds the derivative of the basis function of the given `order`
    /// with respect to the nonlinear parameter `parameter`.
    /// # Panics
    /// if the parameter index is out of range
    pub fn push(&mut self, parameter: usize, order: usize, column: usize) {
        assert!(
            parameter < self.entries.len(),
            "Parameter index {} out of range for {} nonlinear parameters",
            parameter,
            self.entries.len()
        );
        self.entries[parameter].push(DerivativeColumn { order, column });
    }

    /// number of nonlinear parameters covered by this index
    pub fn parameter_count(&self) -> usize {
        self.entries.len()
    }

    /// total number of partial derivative columns
    pub fn column_count(&self) -> usize {
        self.entries.iter().map(Vec::len).sum()
    }

    /// true if no derivative columns are registered at all
    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }

    /// the derivative columns belonging to the given nonlinear parameter
    pub fn columns_for(&self, parameter: usize) -> &[DerivativeColumn] {
        self.entries
            .get(parameter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// true if, for every nonlinear parameter, every basis order `0..degree`
    /// appears exactly once
    pub fn is_complete_for_degree(&self, degree: usize) -> bool {
        self.entries.iter().all(|columns| {
            let mut seen = vec![false; degree];
            columns.len() == degree
                && columns.iter().all(|entry| {
                    entry.order < degree && !std::mem::replace(&mut seen[entry.order], true)
                })
        })
    }
}
