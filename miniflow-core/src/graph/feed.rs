//! Feed bindings: the caller-supplied values the scheduler seeds input nodes with.

use crate::error::MiniflowError;
use crate::matrix::Matrix;
use crate::node::NodeId;
use num_traits::AsPrimitive;

/// The raw forms a fed value may take before it becomes a [`Matrix`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(f64),
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
    Matrix(Matrix),
}

impl RawValue {
    /// Converts to a matrix. A scalar becomes 1x1, a flat sequence a single
    /// row (a single column when `transpose` is set), an empty sequence an
    /// empty matrix. Nested rows and matrices are taken as they are.
    ///
    /// # Errors
    /// `InvalidValue` for ragged nested rows.
    pub fn into_matrix(self, transpose: bool) -> Result<Matrix, MiniflowError> {
        match self {
            RawValue::Scalar(v) => Ok(Matrix::scalar(v)),
            RawValue::Flat(values) if values.is_empty() => Ok(Matrix::zeros(0, 0)),
            RawValue::Flat(values) if transpose => Ok(Matrix::column_vector(values)),
            RawValue::Flat(values) => Ok(Matrix::row_vector(values)),
            RawValue::Nested(rows) => Matrix::from_rows(rows),
            RawValue::Matrix(m) => Ok(m),
        }
    }
}

macro_rules! impl_scalar_raw_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RawValue {
                fn from(v: $t) -> Self {
                    RawValue::Scalar(v.as_())
                }
            }
        )*
    };
}

impl_scalar_raw_value!(f64, f32, i32, i64, u32, u64, usize);

impl From<Vec<f64>> for RawValue {
    fn from(v: Vec<f64>) -> Self {
        RawValue::Flat(v)
    }
}

impl From<&[f64]> for RawValue {
    fn from(v: &[f64]) -> Self {
        RawValue::Flat(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for RawValue {
    fn from(v: [f64; N]) -> Self {
        RawValue::Flat(v.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for RawValue {
    fn from(v: Vec<Vec<f64>>) -> Self {
        RawValue::Nested(v)
    }
}

impl<const R: usize, const C: usize> From<[[f64; C]; R]> for RawValue {
    fn from(v: [[f64; C]; R]) -> Self {
        RawValue::Nested(v.iter().map(|row| row.to_vec()).collect())
    }
}

impl From<Matrix> for RawValue {
    fn from(m: Matrix) -> Self {
        RawValue::Matrix(m)
    }
}

impl From<&Matrix> for RawValue {
    fn from(m: &Matrix) -> Self {
        RawValue::Matrix(m.clone())
    }
}

/// An input node paired with the value it should start from.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub node: NodeId,
    pub value: Matrix,
}

impl Binding {
    pub fn new(
        node: NodeId,
        raw: impl Into<RawValue>,
        transpose: bool,
    ) -> Result<Self, MiniflowError> {
        Ok(Binding {
            node,
            value: raw.into().into_matrix(transpose)?,
        })
    }
}

/// Named bindings in insertion order. Rebinding a name replaces its entry in place.
#[derive(Debug, Clone, Default)]
pub struct FeedDict {
    entries: Vec<(String, Binding)>,
}

impl FeedDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) -> &mut Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = binding,
            None => self.entries.push((name, binding)),
        }
        self
    }

    pub fn bind(
        &mut self,
        name: impl Into<String>,
        node: NodeId,
        raw: impl Into<RawValue>,
    ) -> Result<&mut Self, MiniflowError> {
        let binding = Binding::new(node, raw, false)?;
        Ok(self.insert(name, binding))
    }

    /// Like [`FeedDict::bind`], but a flat sequence becomes a column.
    pub fn bind_transposed(
        &mut self,
        name: impl Into<String>,
        node: NodeId,
        raw: impl Into<RawValue>,
    ) -> Result<&mut Self, MiniflowError> {
        let binding = Binding::new(node, raw, true)?;
        Ok(self.insert(name, binding))
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    /// The value fed to `node`; the first binding wins if several target it.
    pub fn value_for(&self, node: NodeId) -> Option<&Matrix> {
        self.entries
            .iter()
            .find(|(_, b)| b.node == node)
            .map(|(_, b)| &b.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b))
    }

    /// Bound nodes in insertion order, without repeats.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.entries.len());
        for (_, binding) in &self.entries {
            if !nodes.contains(&binding.node) {
                nodes.push(binding.node);
            }
        }
        nodes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_binding() {
        let b = Binding::new(NodeId(0), 10, false).unwrap();
        assert_eq!(b.value, Matrix::scalar(10.0));
        let b = Binding::new(NodeId(0), 2.5f32, true).unwrap();
        assert_eq!(b.value, Matrix::scalar(2.5));
    }

    #[test]
    fn test_flat_binding_row_or_column() {
        let row = Binding::new(NodeId(0), vec![1.0, 2.0, 3.0], false).unwrap();
        assert_eq!(row.value.shape(), (1, 3));
        let col = Binding::new(NodeId(0), [1.0, 2.0, 3.0], true).unwrap();
        assert_eq!(col.value.shape(), (3, 1));
    }

    #[test]
    fn test_empty_and_nested_bindings() {
        let empty = Binding::new(NodeId(0), Vec::<f64>::new(), false).unwrap();
        assert!(empty.value.is_empty());

        let nested = Binding::new(NodeId(0), [[1.0, 2.0], [3.0, 4.0]], false).unwrap();
        assert_eq!(nested.value.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        let m = Matrix::ones(2, 3);
        let from_matrix = Binding::new(NodeId(0), &m, false).unwrap();
        assert_eq!(from_matrix.value, m);
    }

    #[test]
    fn test_ragged_rows_are_invalid() {
        let result = Binding::new(NodeId(0), vec![vec![1.0], vec![2.0, 3.0]], false);
        assert!(matches!(result, Err(MiniflowError::InvalidValue(_))));
    }

    #[test]
    fn test_feed_dict_rebinding_replaces_in_place() {
        let mut feed = FeedDict::new();
        feed.bind("x", NodeId(0), 1.0).unwrap();
        feed.bind("y", NodeId(1), 2.0).unwrap();
        feed.bind("x", NodeId(0), 3.0).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.get("x").unwrap().value, Matrix::scalar(3.0));
        assert_eq!(feed.value_for(NodeId(1)), Some(&Matrix::scalar(2.0)));
        assert_eq!(feed.nodes(), vec![NodeId(0), NodeId(1)]);
        let names: Vec<&str> = feed.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
