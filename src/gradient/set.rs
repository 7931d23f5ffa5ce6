//! Named gradient collections.

use crate::core::{Error, Result};
use crate::gradient::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// An ordered mapping from parameter name to gradient tensor.
///
/// Names are unique within a set. Insertion order is preserved so statistics
/// and serialization are deterministic; it carries no other meaning. A set
/// with zero parameters is never a valid training output, only a transient
/// state, and the operations that would be ill-defined on it fail with
/// [`Error::EmptyInput`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientSet {
    entries: Vec<(String, Tensor)>,
}

impl GradientSet {
    /// Create an empty gradient set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a named tensor. Fails if the name is already present.
    pub fn insert(&mut self, name: &str, tensor: Tensor) -> Result<()> {
        if self.get(name).is_some() {
            return Err(Error::InvalidParameter(format!(
                "duplicate parameter name '{}'",
                name
            )));
        }
        self.entries.push((name.to_string(), tensor));
        Ok(())
    }

    /// Look up a tensor by parameter name.
    ///
    /// Linear scan; parameter counts are small (one entry per model layer).
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, tensor) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Iterate over parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Sum of element counts over all tensors.
    pub fn total_elements(&self) -> usize {
        self.entries.iter().map(|(_, t)| t.element_count()).sum()
    }

    /// Apply a per-tensor transform, preserving names and order.
    pub fn map_tensors<F: FnMut(&Tensor) -> Tensor>(&self, mut f: F) -> GradientSet {
        GradientSet {
            entries: self
                .entries
                .iter()
                .map(|(n, t)| (n.clone(), f(t)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> GradientSet {
        let mut set = GradientSet::new();
        set.insert("fc1.weight", Tensor::from_vec(vec![1.0, 2.0]).unwrap())
            .unwrap();
        set.insert("fc1.bias", Tensor::from_vec(vec![3.0]).unwrap())
            .unwrap();
        set
    }

    #[test]
    fn test_insert_and_get() {
        let set = sample_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("fc1.bias").unwrap().data(), &[3.0]);
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut set = sample_set();
        let result = set.insert("fc1.weight", Tensor::from_vec(vec![9.0]).unwrap());
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set = sample_set();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["fc1.weight", "fc1.bias"]);
    }

    #[test]
    fn test_total_elements() {
        let set = sample_set();
        assert_eq!(set.total_elements(), 3);
    }

    #[test]
    fn test_map_tensors() {
        let set = sample_set();
        let negated = set.map_tensors(|t| t.map(|x| -x));
        assert_eq!(negated.get("fc1.weight").unwrap().data(), &[-1.0, -2.0]);
        assert_eq!(
            negated.names().collect::<Vec<_>>(),
            set.names().collect::<Vec<_>>()
        );
        // input untouched
        assert_eq!(set.get("fc1.weight").unwrap().data(), &[1.0, 2.0]);
    }
}
