use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{ArrayBase, Data, Dimension};
use ndarray_npy::WritableElement;

/// Write an array in NumPy `.npy` format.
pub(crate) fn write_npy<S, D>(path: &Path, array: &ArrayBase<S, D>) -> Result<()>
where
    S: Data,
    S::Elem: WritableElement,
    D: Dimension,
{
    ndarray_npy::write_npy(path, array)
        .with_context(|| format!("Failed to write npy file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use ndarray_npy::read_npy;

    use super::*;

    #[test]
    fn trace_round_trips_through_npy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.npy");

        write_npy(&path, &array![1.0, 2.0, 2.0, 3.5]).unwrap();

        let back: ndarray::Array1<f64> = read_npy(&path).unwrap();
        assert_eq!(back, array![1.0, 2.0, 2.0, 3.5]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_npy(&dir.path().join("missing/trace.npy"), &array![1.0]).is_err());
    }
}
