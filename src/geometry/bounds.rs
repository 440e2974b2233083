use std::borrow::Cow;
use std::fmt;

use crate::geometry::{check_dimensions_match, GeometryError, Tuple};

/// An axis-aligned minimum bounding rectangle in d-dimensional
/// signed-integer space: one closed interval `lo..=hi` per dimension.
///
/// A freshly created node carries the *empty* bounds, with every interval
/// inverted (`i32::MAX..=i32::MIN`). Including the first tuple or child
/// collapses the inverted intervals onto real ones, so the empty bounds
/// never need special-casing in [`Bounds::extend`] or
/// [`Bounds::combine_in_place`]. [`Bounds::area`] must not be queried on
/// empty bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    intervals: Vec<(i32, i32)>,
}

impl Bounds {
    /// Creates a new [`Bounds`] from one `(lo, hi)` interval per dimension.
    pub fn new(intervals: Vec<(i32, i32)>) -> Self {
        Self { intervals }
    }

    /// Creates the empty [`Bounds`] covering no point at all.
    pub fn empty(dimension: usize) -> Self {
        Self::new(vec![(i32::MAX, i32::MIN); dimension])
    }

    /// Creates the degenerate [`Bounds`] covering exactly one tuple.
    pub fn from_tuple(tuple: &Tuple) -> Self {
        Self::new(tuple.coordinate_iter().map(|c| (c, c)).collect())
    }

    /// Constructs bounds from a pair of opposite corners, `low` holding
    /// the smaller coordinate of every dimension.
    pub fn from_corners(low: &Tuple, high: &Tuple) -> Result<Self, GeometryError> {
        check_dimensions_match(low.dimension(), high.dimension())?;

        Ok(Self::new(
            low.coordinate_iter().zip(high.coordinate_iter()).collect(),
        ))
    }

    /// Returns the number of dimensions of these bounds.
    pub fn dimension(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the interval in the given dimension.
    ///
    /// # Panics
    /// This function will panic if `index` is not a valid dimension.
    #[inline(always)]
    pub fn interval(&self, index: usize) -> (i32, i32) {
        self.intervals[index]
    }

    /// Returns an iterator over the `(lo, hi)` intervals of these bounds.
    pub fn interval_iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.intervals.iter().copied()
    }

    /// Returns `true` if these bounds cover no point, i.e. some interval
    /// is still inverted.
    pub fn is_empty(&self) -> bool {
        self.intervals.iter().any(|&(lo, hi)| lo > hi)
    }

    /// Returns the area (d-dimensional volume) of these bounds.
    ///
    /// The product is computed in `i64` so that wide boxes over the full
    /// `i32` coordinate range do not overflow.
    ///
    /// # Panics
    /// This function will panic when called on empty bounds, whose area
    /// is undefined.
    #[inline(always)]
    pub fn area(&self) -> i64 {
        assert!(!self.is_empty(), "area of empty bounds is undefined");

        self.interval_iter()
            .map(|(lo, hi)| i64::from(hi) - i64::from(lo))
            .product()
    }

    /// Returns the smallest bounds covering both `self` and `other`.
    ///
    /// ```rust
    /// use gridindex::Bounds;
    ///
    /// let a = Bounds::new(vec![(0, 2), (0, 2)]);
    /// let b = Bounds::new(vec![(1, 3), (-1, 1)]);
    /// assert_eq!(a.combine(&b), Ok(Bounds::new(vec![(0, 3), (-1, 2)])));
    /// ```
    #[inline(always)]
    pub fn combine(&self, other: &Bounds) -> Result<Bounds, GeometryError> {
        check_dimensions_match(self.dimension(), other.dimension())?;

        Ok(Bounds::new(
            self.interval_iter()
                .zip(other.interval_iter())
                .map(|((s_lo, s_hi), (o_lo, o_hi))| (s_lo.min(o_lo), s_hi.max(o_hi)))
                .collect(),
        ))
    }

    /// Grows these bounds in place to cover `other` as well.
    #[inline(always)]
    pub fn combine_in_place(&mut self, other: &Bounds) {
        debug_assert_eq!(self.dimension(), other.dimension());

        for (interval, (o_lo, o_hi)) in self.intervals.iter_mut().zip(other.interval_iter()) {
            interval.0 = interval.0.min(o_lo);
            interval.1 = interval.1.max(o_hi);
        }
    }

    /// Grows these bounds in place to cover `tuple`.
    #[inline(always)]
    pub fn extend(&mut self, tuple: &Tuple) {
        debug_assert_eq!(self.dimension(), tuple.dimension());

        for (interval, coordinate) in self.intervals.iter_mut().zip(tuple.coordinate_iter()) {
            interval.0 = interval.0.min(coordinate);
            interval.1 = interval.1.max(coordinate);
        }
    }

    /// Determines whether these bounds overlap `other` in every dimension.
    /// Intervals are closed, so bounds that merely touch do intersect.
    pub fn intersects(&self, other: &Bounds) -> Result<bool, GeometryError> {
        check_dimensions_match(self.dimension(), other.dimension())?;

        Ok(!self
            .interval_iter()
            .zip(other.interval_iter())
            .any(|((s_lo, s_hi), (o_lo, o_hi))| s_lo > o_hi || s_hi < o_lo))
    }

    /// The legacy intersects-or-enlarge metric: `None` when the bounds are
    /// disjoint, otherwise the area by which boxing `self` together with
    /// `other` exceeds the area of `other`.
    pub fn intersection_enlargement(&self, other: &Bounds) -> Result<Option<i64>, GeometryError> {
        if !self.intersects(other)? {
            return Ok(None);
        }

        Ok(Some(self.combine(other)?.area() - other.area()))
    }

    /// Returns the area by which these bounds would grow to cover `other`.
    pub fn enlargement(&self, other: &Bounds) -> Result<i64, GeometryError> {
        Ok(self.combine(other)?.area() - self.area())
    }

    /// Returns the area by which these bounds would grow to cover `tuple`,
    /// which is zero exactly when the tuple already lies inside.
    pub fn enlargement_for(&self, tuple: &Tuple) -> Result<i64, GeometryError> {
        check_dimensions_match(self.dimension(), tuple.dimension())?;

        let mut grown: i64 = 1;
        for ((lo, hi), coordinate) in self.interval_iter().zip(tuple.coordinate_iter()) {
            grown *= if coordinate < lo {
                i64::from(hi) - i64::from(coordinate)
            } else if coordinate > hi {
                i64::from(coordinate) - i64::from(lo)
            } else {
                i64::from(hi) - i64::from(lo)
            };
        }

        Ok(grown - self.area())
    }

    /// Determines whether `tuple` lies inside these bounds. Intervals are
    /// closed, so a tuple on the boundary is contained.
    pub fn contains(&self, tuple: &Tuple) -> Result<bool, GeometryError> {
        check_dimensions_match(self.dimension(), tuple.dimension())?;

        Ok(!tuple
            .coordinate_iter()
            .zip(self.interval_iter())
            .any(|(coordinate, (lo, hi))| coordinate < lo || coordinate > hi))
    }
}

impl fmt::Display for Bounds {
    /// Formats the bounds as the low corner followed by the high corner,
    /// e.g. `(0, 0) (10, 10)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corner = |f: &mut fmt::Formatter<'_>, pick: fn((i32, i32)) -> i32| -> fmt::Result {
            write!(f, "(")?;
            for (index, interval) in self.interval_iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", pick(interval))?;
            }
            write!(f, ")")
        };

        corner(f, |(lo, _)| lo)?;
        write!(f, " ")?;
        corner(f, |(_, hi)| hi)
    }
}

/// We can't implement `Into<Cow<'a, Bounds>>` for types such as
/// `((i32, i32), (i32, i32))`, so we have the [`IntoBounds<'a>`] trait
/// which is essentially identical. This makes the query-facing APIs much
/// nicer to work with.
pub trait IntoBounds<'a> {
    fn into_bounds(self) -> Cow<'a, Bounds>;
}

impl<'a> IntoBounds<'a> for Bounds {
    fn into_bounds(self) -> Cow<'a, Bounds> {
        Cow::Owned(self)
    }
}

impl<'a> IntoBounds<'a> for &'a Bounds {
    fn into_bounds(self) -> Cow<'a, Bounds> {
        Cow::Borrowed(self)
    }
}

impl<'a> IntoBounds<'a> for Cow<'a, Bounds> {
    fn into_bounds(self) -> Cow<'a, Bounds> {
        self
    }
}

impl<'a> IntoBounds<'a> for (i32, i32) {
    /// A 1-dimensional interval.
    fn into_bounds(self) -> Cow<'a, Bounds> {
        Cow::Owned(Bounds::new(vec![(self.0, self.1)]))
    }
}

impl<'a> IntoBounds<'a> for ((i32, i32), (i32, i32)) {
    /// A 2-dimensional box given as its low and high corners.
    fn into_bounds(self) -> Cow<'a, Bounds> {
        let ((x_lo, y_lo), (x_hi, y_hi)) = self;
        Cow::Owned(Bounds::new(vec![(x_lo, x_hi), (y_lo, y_hi)]))
    }
}
