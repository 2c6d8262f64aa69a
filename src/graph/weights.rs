use ahash::AHashMap;
use ndarray::{Array2, Axis};

/// Dense numeric node series, one row per node and one column per named series.
#[derive(Clone, Debug, Default)]
pub(crate) struct WeightMatrix {
    series: AHashMap<String, usize>, // name -> column index
    names: Vec<String>,              // column index -> name
    values: Array2<f64>,             // (rows, series)
}

impl WeightMatrix {
    /// Construct a matrix from named columns, all of length `num_rows`.
    pub(crate) fn new(num_rows: usize, columns: Vec<(String, Vec<f64>)>) -> Self {
        let mut values = Array2::zeros((num_rows, columns.len()));
        let mut series = AHashMap::with_capacity(columns.len());
        let mut names = Vec::with_capacity(columns.len());

        for (j, (name, column)) in columns.into_iter().enumerate() {
            assert!(column.len() == num_rows, "series '{name}' has {} rows, expected {num_rows}", column.len());
            assert!(!series.contains_key(&name), "duplicate series '{name}'");
            values.column_mut(j).iter_mut().zip(column).for_each(|(dst, v)| *dst = v);
            series.insert(name.clone(), j);
            names.push(name);
        }

        Self { series, names, values }
    }

    /// A zeroed matrix with the same series and `num_rows` rows.
    pub(crate) fn copy_of_size(&self, num_rows: usize) -> Self {
        Self {
            series: self.series.clone(),
            names: self.names.clone(),
            values: Array2::zeros((num_rows, self.names.len())),
        }
    }

    #[inline] pub(crate) fn num_rows(&self) -> usize { self.values.nrows() }

    #[inline] pub(crate) fn contains(&self, name: &str) -> bool { self.series.contains_key(name) }

    /// Value of a series for a given row, or None if the series is unknown.
    #[inline]
    pub(crate) fn get(&self, name: &str, row: usize) -> Option<f64> {
        self.series.get(name).map(|&j| self.values[[row, j]])
    }

    /// Zero every row.
    pub(crate) fn clear_all_rows(&mut self) { self.values.fill(0.0) }

    /// Set `row` to the column sums of `other`.
    pub(crate) fn set_row_to_sum_of(&mut self, row: usize, other: &WeightMatrix) {
        debug_assert!(self.names == other.names, "series mismatch");
        self.values.row_mut(row).assign(&other.values.sum_axis(Axis(0)));
    }

    /// Add `other[src]` into `self[row]`.
    #[inline]
    pub(crate) fn add_row_from(&mut self, row: usize, other: &WeightMatrix, src: usize) {
        debug_assert!(self.names == other.names, "series mismatch");
        let mut dst = self.values.row_mut(row);
        dst += &other.values.row(src);
    }

    /// Subtract `other[src]` from `self[row]`.
    #[inline]
    pub(crate) fn subtract_row_from(&mut self, row: usize, other: &WeightMatrix, src: usize) {
        debug_assert!(self.names == other.names, "series mismatch");
        let mut dst = self.values.row_mut(row);
        dst -= &other.values.row(src);
    }
}
