//! Georeferenced raster: a grid with an origin, a cell size and
//! 'no data' tracking

use crate::error::{CellSizeError, IndexError};
use crate::grid::Grid;
use std::collections::HashSet;

/// A [`Grid`] with georeferencing and 'no data' tracking
///
/// The georeferencing pertains to the origin of the grid: the real-world
/// coordinate of the bottom-left corner of the cell in the bottom row,
/// leftmost column. Cells are square with side `cell_size`.
///
/// A cell reads as having no data when any of the following hold: it is
/// empty, it equals the configured no-data value, or it has been marked
/// explicitly via [`Self::mark_no_data`]. Writing the no-data value routes
/// through the marking path, so the stored cell and the mark never
/// disagree; writing a real value clears a stale mark first.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    grid: Grid<T>,
    origin_x: f64,
    origin_y: f64,
    cell_size: f64,
    no_data_value: Option<T>,
    /// Cells explicitly marked as holding no data, as (x, y from bottom)
    no_data: HashSet<(usize, usize)>,
}

impl<T: PartialEq> Raster<T> {
    /// Creates an empty raster of the given size
    ///
    /// # Errors
    /// Fails if `cell_size` is not strictly positive.
    pub fn new(
        rows: usize,
        cols: usize,
        origin_x: f64,
        origin_y: f64,
        cell_size: f64,
    ) -> Result<Self, CellSizeError> {
        Self::from_grid(Grid::new(rows, cols), origin_x, origin_y, cell_size, None)
    }

    /// Wraps an existing grid, optionally with a no-data value
    ///
    /// # Errors
    /// Fails if `cell_size` is not strictly positive.
    pub fn from_grid(
        grid: Grid<T>,
        origin_x: f64,
        origin_y: f64,
        cell_size: f64,
        no_data_value: Option<T>,
    ) -> Result<Self, CellSizeError> {
        if cell_size <= 0.0 || cell_size.is_nan() {
            return Err(CellSizeError(cell_size));
        }
        Ok(Self {
            grid,
            origin_x,
            origin_y,
            cell_size,
            no_data_value,
            no_data: HashSet::new(),
        })
    }

    /// Number of rows
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Number of columns
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Eastings of the origin (left edge of the leftmost column)
    #[must_use]
    pub const fn origin_x(&self) -> f64 {
        self.origin_x
    }

    /// Northings of the origin (bottom edge of the bottom row)
    #[must_use]
    pub const fn origin_y(&self) -> f64 {
        self.origin_y
    }

    /// Length of one side of the square cells
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Area of one cell
    #[must_use]
    pub fn cell_area(&self) -> f64 {
        self.cell_size * self.cell_size
    }

    /// The configured no-data value, if any
    #[must_use]
    pub const fn no_data_value(&self) -> Option<&T> {
        self.no_data_value.as_ref()
    }

    /// The wrapped grid
    #[must_use]
    pub const fn grid(&self) -> &Grid<T> {
        &self.grid
    }

    // Coordinate conversion

    /// Converts eastings into a column number
    ///
    /// The result is not guaranteed to be a column of the raster; it is
    /// negative or too large for coordinates outside it.
    #[must_use]
    pub fn column_of(&self, x: f64) -> i64 {
        ((x - self.origin_x) / self.cell_size).floor() as i64
    }

    /// Converts northings into a cell number counted from the bottom
    ///
    /// Like [`Self::column_of`], the result may lie outside the raster.
    #[must_use]
    pub fn y_cell_of(&self, y: f64) -> i64 {
        ((y - self.origin_y) / self.cell_size).floor() as i64
    }

    /// Eastings of the centre of a column
    #[must_use]
    pub fn x_of_column(&self, col: usize) -> f64 {
        col as f64 * self.cell_size + self.origin_x + self.cell_size / 2.0
    }

    /// Northings of the centre of a cell counted from the bottom
    #[must_use]
    pub fn y_of_y_cell(&self, y: usize) -> f64 {
        y as f64 * self.cell_size + self.origin_y + self.cell_size / 2.0
    }

    /// Northings of the centre of a row, row 0 at the top
    #[must_use]
    pub fn y_of_row(&self, row: usize) -> f64 {
        self.y_of_y_cell(self.rows() - row - 1)
    }

    /// Whether eastings lies inside the raster
    #[must_use]
    pub fn contains_x(&self, x: f64) -> bool {
        let col = self.column_of(x);
        col >= 0 && (col as u64) < self.cols() as u64
    }

    /// Whether northings lies inside the raster
    #[must_use]
    pub fn contains_y(&self, y: f64) -> bool {
        let cell = self.y_cell_of(y);
        cell >= 0 && (cell as u64) < self.rows() as u64
    }

    /// Whether a coordinate lies inside the raster
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }

    /// The column under the eastings, or [`None`] outside the raster
    #[must_use]
    pub fn column_under(&self, x: f64) -> Option<usize> {
        self.contains_x(x).then(|| self.column_of(x) as usize)
    }

    /// The row (0 at the top) under the northings, or [`None`] outside
    #[must_use]
    pub fn row_under(&self, y: f64) -> Option<usize> {
        self.contains_y(y)
            .then(|| self.rows() - 1 - self.y_cell_of(y) as usize)
    }

    // Reading

    fn is_marked(&self, x: usize, y: usize) -> bool {
        self.no_data.contains(&(x, y))
    }

    fn apply_no_data<'a>(&self, x: usize, y: usize, cell: Option<&'a T>) -> Option<&'a T> {
        if self.is_marked(x, y) {
            return None;
        }
        match (cell, self.no_data_value.as_ref()) {
            (Some(value), Some(sentinel)) if value == sentinel => None,
            _ => cell,
        }
    }

    /// The value at (row, column), or [`None`] for a no-data cell
    ///
    /// # Errors
    /// Fails if the indices are out of bounds.
    pub fn at_rc(&self, row: usize, col: usize) -> Result<Option<&T>, IndexError> {
        let cell = self.grid.at_rc(row, col)?;
        Ok(self.apply_no_data(col, self.rows() - row - 1, cell))
    }

    /// The value at (x, y) with y counted from the bottom
    ///
    /// # Errors
    /// Fails if the coordinates are out of bounds.
    pub fn at_xy(&self, x: usize, y: usize) -> Result<Option<&T>, IndexError> {
        let cell = self.grid.at_xy(x, y)?;
        Ok(self.apply_no_data(x, y, cell))
    }

    /// The value at (x, y) with y equal to the row number
    ///
    /// # Errors
    /// Fails if the coordinates are out of bounds.
    pub fn at_x_flip_y(&self, x: usize, y: usize) -> Result<Option<&T>, IndexError> {
        self.at_rc(y, x)
    }

    /// The value under a real-world coordinate
    ///
    /// Every point outside the raster reads as no data rather than being
    /// an error.
    #[must_use]
    pub fn value_at(&self, x: f64, y: f64) -> Option<&T> {
        if !self.contains(x, y) {
            return None;
        }
        let col = self.column_of(x) as usize;
        let cell = self.y_cell_of(y) as usize;
        self.at_xy(col, cell).ok().flatten()
    }

    /// Whether the cell at (row, column) holds no data
    ///
    /// # Errors
    /// Fails if the indices are out of bounds.
    pub fn is_no_data_rc(&self, row: usize, col: usize) -> Result<bool, IndexError> {
        Ok(self.at_rc(row, col)?.is_none())
    }

    /// Whether there is no data under a real-world coordinate
    ///
    /// Points outside the raster count as having no data.
    #[must_use]
    pub fn is_no_data_at(&self, x: f64, y: f64) -> bool {
        self.value_at(x, y).is_none()
    }

    // Writing

    fn is_no_data_entry(&self, value: Option<&T>) -> bool {
        match (value, self.no_data_value.as_ref()) {
            (None, _) => true,
            (Some(v), Some(sentinel)) => v == sentinel,
            (Some(_), None) => false,
        }
    }

    /// Sets the value at (x, y) with y counted from the bottom
    ///
    /// Writing [`None`] or the no-data value marks the cell as holding no
    /// data; writing a real value clears any such mark.
    ///
    /// # Errors
    /// Fails if the coordinates are out of bounds.
    pub fn set_xy(&mut self, x: usize, y: usize, value: Option<T>) -> Result<(), IndexError> {
        if self.is_no_data_entry(value.as_ref()) {
            return self.mark_no_data(x, y);
        }
        self.grid.set_xy(x, y, value)?;
        self.no_data.remove(&(x, y));
        Ok(())
    }

    /// Sets the value at (row, column)
    ///
    /// # Errors
    /// Fails if the indices are out of bounds.
    pub fn set_rc(&mut self, row: usize, col: usize, value: Option<T>) -> Result<(), IndexError> {
        let rows = self.rows();
        if row >= rows {
            return Err(IndexError {
                row,
                col,
                rows,
                cols: self.cols(),
            });
        }
        self.set_xy(col, rows - row - 1, value)
    }

    /// Sets the value at (x, y) with y equal to the row number
    ///
    /// # Errors
    /// Fails if the coordinates are out of bounds.
    pub fn set_x_flip_y(&mut self, x: usize, y: usize, value: Option<T>) -> Result<(), IndexError> {
        self.set_rc(y, x, value)
    }

    /// Sets the value under a real-world coordinate
    ///
    /// Writing no data to a point outside the raster is a no-op; writing a
    /// real value outside the raster is an error.
    ///
    /// # Errors
    /// Fails if the coordinate is outside the raster and the value is not
    /// a no-data entry.
    pub fn set_value_at(&mut self, x: f64, y: f64, value: Option<T>) -> Result<(), IndexError> {
        if !self.contains(x, y) {
            if self.is_no_data_entry(value.as_ref()) {
                return Ok(());
            }
            return Err(IndexError {
                row: self.y_cell_of(y).unsigned_abs() as usize,
                col: self.column_of(x).unsigned_abs() as usize,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        let col = self.column_of(x) as usize;
        let cell = self.y_cell_of(y) as usize;
        self.set_xy(col, cell, value)
    }

    /// Marks the cell at (x, y from bottom) as holding no data
    ///
    /// The stored entry, if any, is removed at the same time.
    ///
    /// # Errors
    /// Fails if the coordinates are out of bounds.
    pub fn mark_no_data(&mut self, x: usize, y: usize) -> Result<(), IndexError> {
        self.grid.set_xy(x, y, None)?;
        self.no_data.insert((x, y));
        Ok(())
    }

    /// Marks the cell under a real-world coordinate as holding no data
    ///
    /// Points outside the raster are ignored.
    pub fn mark_no_data_at(&mut self, x: f64, y: f64) {
        if self.contains(x, y) {
            let col = self.column_of(x) as usize;
            let cell = self.y_cell_of(y) as usize;
            let _ = self.mark_no_data(col, cell);
        }
    }

    /// Iterates over the cells row by row, top row first, with the
    /// no-data rules applied
    pub fn cells(&self) -> impl Iterator<Item = Option<&T>> {
        (0..self.rows()).flat_map(move |row| {
            (0..self.cols()).map(move |col| self.at_rc(row, col).unwrap_or(None))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Raster;
    use crate::grid::Grid;

    fn raster_10() -> Raster<i32> {
        Raster::new(4, 3, 0.0, 0.0, 10.0).unwrap()
    }

    #[test]
    fn cell_size_must_be_positive() {
        assert!(Raster::<i32>::new(2, 2, 0.0, 0.0, 0.0).is_err());
        assert!(Raster::<i32>::new(2, 2, 0.0, 0.0, -1.0).is_err());
    }

    #[test]
    fn coordinates_convert_by_floor() {
        let raster = raster_10();
        assert_eq!(raster.column_of(15.0), 1);
        assert_eq!(raster.y_cell_of(25.0), 2);
        assert_eq!(raster.column_of(-0.1), -1);
        assert_eq!(raster.row_under(25.0), Some(1));
        assert_eq!(raster.column_under(35.0), None);
    }

    #[test]
    fn cell_centres_convert_back() {
        let raster = raster_10();
        assert_eq!(raster.x_of_column(1), 15.0);
        assert_eq!(raster.y_of_y_cell(2), 25.0);
        assert_eq!(raster.y_of_row(3), 5.0);
    }

    #[test]
    fn points_outside_read_as_no_data() {
        let mut raster = raster_10();
        raster.set_xy(0, 0, Some(7)).unwrap();
        assert_eq!(raster.value_at(5.0, 5.0), Some(&7));
        assert_eq!(raster.value_at(-5.0, 5.0), None);
        assert_eq!(raster.value_at(5.0, -5.0), None);
        assert!(raster.is_no_data_at(-1.0, -1.0));
    }

    #[test]
    fn writes_outside_are_no_ops_only_for_no_data() {
        let mut raster = raster_10();
        raster.set_value_at(-5.0, 5.0, None).unwrap();
        assert!(raster.set_value_at(-5.0, 5.0, Some(3)).is_err());
    }

    #[test]
    fn writing_the_sentinel_reads_back_as_no_data() {
        let mut grid = Grid::new(2, 2);
        grid.set_rc(0, 0, Some(1)).unwrap();
        let mut raster = Raster::from_grid(grid, 0.0, 0.0, 1.0, Some(-9999)).unwrap();
        raster.set_rc(1, 1, Some(-9999)).unwrap();
        assert_eq!(raster.at_rc(1, 1).unwrap(), None);
        assert!(raster.is_no_data_rc(1, 1).unwrap());
        // the sentinel is intercepted on the way in, not stored
        assert_eq!(raster.grid().at_rc(1, 1).unwrap(), None);
        // and a stored sentinel still reads as no data
        let mut grid = Grid::new(1, 1);
        grid.set_rc(0, 0, Some(-9999)).unwrap();
        let raster = Raster::from_grid(grid, 0.0, 0.0, 1.0, Some(-9999)).unwrap();
        assert_eq!(raster.at_rc(0, 0).unwrap(), None);
    }

    #[test]
    fn real_values_clear_stale_marks() {
        let mut raster = raster_10();
        raster.mark_no_data(1, 1).unwrap();
        assert_eq!(raster.at_xy(1, 1).unwrap(), None);
        raster.set_xy(1, 1, Some(42)).unwrap();
        assert_eq!(raster.at_xy(1, 1).unwrap(), Some(&42));
    }

    #[test]
    fn marking_by_coordinate_ignores_outside_points() {
        let mut raster = raster_10();
        raster.set_xy(1, 2, Some(9)).unwrap();
        raster.mark_no_data_at(15.0, 25.0);
        assert_eq!(raster.at_xy(1, 2).unwrap(), None);
        // outside points are ignored rather than erroring
        raster.mark_no_data_at(-100.0, -100.0);
        let populated = raster.cells().flatten().count();
        assert_eq!(populated, 0);
    }

    #[test]
    fn marking_removes_the_stored_entry() {
        let mut raster = raster_10();
        raster.set_xy(2, 2, Some(5)).unwrap();
        raster.mark_no_data(2, 2).unwrap();
        assert_eq!(raster.at_xy(2, 2).unwrap(), None);
        assert_eq!(raster.grid().at_xy(2, 2).unwrap(), None);
    }
}
