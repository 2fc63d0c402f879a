//! The per-vertex feature table: one row per surface vertex, holding the vertex's region label and its
//! morphometric feature values.

use ndarray::{Array2, ArrayView1, Axis};

use std::collections::HashSet;
use std::fmt;

use crate::error::{MindError, Result};


/// A table of per-vertex measurements. Row `i` of `values` belongs to the vertex with region label `labels[i]`,
/// column `j` holds the feature named `feature_names[j]`. All values are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexTable {
    labels: Vec<String>,
    feature_names: Vec<String>,
    values: Array2<f64>,
}

impl VertexTable {

    /// Create a table from region labels, feature names and a vertices x features value matrix.
    pub fn new(labels: Vec<String>, feature_names: Vec<String>, values: Array2<f64>) -> Result<VertexTable> {
        if labels.len() != values.nrows() {
            return Err(MindError::ShapeMismatch {
                what: String::from("vertex labels"),
                expected: values.nrows(),
                found: labels.len(),
            });
        }
        if feature_names.len() != values.ncols() {
            return Err(MindError::ShapeMismatch {
                what: String::from("feature names"),
                expected: values.ncols(),
                found: feature_names.len(),
            });
        }

        let mut seen = HashSet::with_capacity(feature_names.len());
        for name in feature_names.iter() {
            if !seen.insert(name.as_str()) {
                return Err(MindError::DuplicateFeature { name: name.clone() });
            }
        }

        for (col_idx, column) in values.axis_iter(Axis(1)).enumerate() {
            if let Some(vertex) = column.iter().position(|v| !v.is_finite()) {
                return Err(MindError::NonFiniteValue {
                    feature: feature_names[col_idx].clone(),
                    vertex,
                });
            }
        }

        Ok(VertexTable { labels, feature_names, values })
    }


    /// Create a table from region labels and named feature columns, each with one value per vertex.
    ///
    /// # Examples
    ///
    /// ```
    /// let table = mindnet::VertexTable::from_columns(
    ///     vec![String::from("lh_insula"), String::from("lh_insula")],
    ///     vec![(String::from("CT"), vec![2.5, 2.7])],
    /// ).unwrap();
    /// assert_eq!(2, table.num_vertices());
    /// ```
    pub fn from_columns(labels: Vec<String>, columns: Vec<(String, Vec<f64>)>) -> Result<VertexTable> {
        let num_vertices = labels.len();
        let mut values = Array2::zeros((num_vertices, columns.len()));
        let mut feature_names = Vec::with_capacity(columns.len());

        for (col_idx, (name, column)) in columns.into_iter().enumerate() {
            if column.len() != num_vertices {
                return Err(MindError::ShapeMismatch {
                    what: format!("feature column '{}'", name),
                    expected: num_vertices,
                    found: column.len(),
                });
            }
            for (row_idx, value) in column.into_iter().enumerate() {
                values[[row_idx, col_idx]] = value;
            }
            feature_names.push(name);
        }

        VertexTable::new(labels, feature_names, values)
    }

    pub fn num_vertices(&self) -> usize {
        self.labels.len()
    }

    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The vertices x features value matrix.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Get the column index of the named feature, if present.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|f| f == name)
    }

    /// Get the values of the named feature for all vertices, if present.
    pub fn column(&self, name: &str) -> Option<ArrayView1<f64>> {
        self.feature_index(name).map(|idx| self.values.column(idx))
    }


    /// Restrict the table to the requested features, in request order.
    ///
    /// The column order of the result is exactly the order of `names`, independent of the column order of this table.
    ///
    /// # Errors
    ///
    /// [`MindError::UnknownFeature`] naming the first requested feature that is not a column of this table,
    /// [`MindError::NoFeatures`] for an empty request and [`MindError::DuplicateFeature`] if a name is requested twice.
    pub fn select_features<S: AsRef<str>>(&self, names: &[S]) -> Result<VertexTable> {
        if names.is_empty() {
            return Err(MindError::NoFeatures);
        }

        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match self.feature_index(name) {
                Some(idx) => indices.push(idx),
                None => return Err(MindError::UnknownFeature { name: name.to_string() }),
            }
        }

        let feature_names = names.iter().map(|n| n.as_ref().to_string()).collect();
        let values = self.values.select(Axis(1), &indices);
        VertexTable::new(self.labels.clone(), feature_names, values)
    }


    /// Keep only the vertices for which `keep` is `true`.
    ///
    /// # Panics
    ///
    /// If `keep` does not have one entry per vertex.
    pub fn filter_rows(&self, keep: &[bool]) -> VertexTable {
        assert_eq!(keep.len(), self.num_vertices(), "Row mask must have one entry per vertex.");

        let rows: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(idx, &k)| if k { Some(idx) } else { None })
            .collect();
        let labels = rows.iter().map(|&idx| self.labels[idx].clone()).collect();

        VertexTable {
            labels,
            feature_names: self.feature_names.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }


    /// Replace the values of the table, keeping labels and feature names.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Result<VertexTable> {
        VertexTable::new(self.labels.clone(), self.feature_names.clone(), values)
    }
}


impl fmt::Display for VertexTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Vertex table with {} vertices and {} features ({}).", self.num_vertices(), self.num_features(), self.feature_names.join(", "))
    }
}
