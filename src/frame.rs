//! Tabular results keyed by a float row index.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::EphysError;

/// An ordered table of numeric columns sharing a common float row index.
///
/// Rows are keyed by floats (frequencies or time lags), columns by an ordered
/// sequence of keys (channel, unit, or unit-pair identifiers). Columns can be
/// accessed by key or by position, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame<K, V> {
    index: Vec<f64>,
    keys: Vec<K>,
    columns: Vec<Vec<V>>,
}

impl<K, V> Frame<K, V> {
    /// Create a new frame from a row index, column keys, and column values.
    pub fn new(index: Vec<f64>, keys: Vec<K>, columns: Vec<Vec<V>>) -> Result<Self, EphysError> {
        if keys.len() != columns.len() {
            return Err(EphysError::InvalidParameter(format!(
                "mismatched frame columns: {} keys and {} columns",
                keys.len(),
                columns.len()
            )));
        }
        if let Some(column) = columns.iter().find(|column| column.len() != index.len()) {
            return Err(EphysError::InvalidParameter(format!(
                "mismatched frame column length: expected {} rows, got {}",
                index.len(),
                column.len()
            )));
        }
        Ok(Frame {
            index,
            keys,
            columns,
        })
    }

    /// The row index.
    pub fn index(&self) -> &[f64] {
        &self.index
    }

    /// The column keys, in column order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.index.is_empty()
    }

    /// Column at the given position, if any.
    pub fn column_at(&self, position: usize) -> Option<&[V]> {
        self.columns.get(position).map(|column| column.as_slice())
    }

    /// Iterate over (key, column) pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.keys
            .iter()
            .zip(self.columns.iter().map(|column| column.as_slice()))
    }
}

impl<K: PartialEq, V> Frame<K, V> {
    /// Column associated with the given key, if any.
    pub fn column(&self, key: &K) -> Option<&[V]> {
        self.keys
            .iter()
            .position(|candidate| candidate == key)
            .map(|position| self.columns[position].as_slice())
    }
}

impl<K: Serialize + DeserializeOwned, V: Serialize + DeserializeOwned> Frame<K, V> {
    /// Save the frame to a JSON file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), EphysError> {
        let file = File::create(path).map_err(|e| EphysError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| EphysError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| EphysError::IOError(e.to_string()))
    }

    /// Load a frame from a JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, EphysError> {
        let file = File::open(path).map_err(|e| EphysError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| EphysError::IOError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_accessors() {
        let frame = Frame::new(
            vec![-1.0, 0.0, 1.0],
            vec![0_usize, 2, 7],
            vec![
                vec![1.0, 2.0, 3.0],
                vec![4.0, 5.0, 6.0],
                vec![7.0, 8.0, 9.0],
            ],
        )
        .unwrap();

        assert_eq!(frame.num_rows(), 3);
        assert_eq!(frame.num_columns(), 3);
        assert_eq!(frame.keys(), &[0, 2, 7]);
        assert_eq!(frame.index(), &[-1.0, 0.0, 1.0]);
        assert_eq!(frame.column(&2), Some([4.0, 5.0, 6.0].as_slice()));
        assert_eq!(frame.column(&1), None);
        assert_eq!(frame.column_at(2), Some([7.0, 8.0, 9.0].as_slice()));
        assert_eq!(frame.column_at(3), None);

        let keys = frame.iter().map(|(key, _)| *key).collect::<Vec<usize>>();
        assert_eq!(keys, vec![0, 2, 7]);
    }

    #[test]
    fn test_frame_rejects_mismatched_shapes() {
        let result = Frame::<usize, f64>::new(vec![0.0, 1.0], vec![0_usize], vec![]);
        assert!(result.is_err());

        let result = Frame::new(vec![0.0, 1.0], vec![0_usize], vec![vec![1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_frame_save_load() {
        let frame = Frame::new(
            vec![0.0, 0.5, 1.0],
            vec![(0_usize, 1_usize), (0, 2)],
            vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.json");
        frame.save_to(&path).unwrap();

        let loaded = Frame::<(usize, usize), f64>::load_from(&path).unwrap();
        assert_eq!(loaded, frame);
    }

    #[test]
    fn test_frame_load_missing_file() {
        let result = Frame::<usize, f64>::load_from("/nonexistent/frame.json");
        assert!(matches!(result, Err(EphysError::IOError(_))));
    }
}
