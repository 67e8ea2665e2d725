// Integer positions for the reach-grasp workspace.
//
// All spatial reasoning in the schema layer goes through the Manhattan
// distance predicates below; preconditions compose them with plain
// coordinate comparisons. The metric is the *sum* of per-axis absolute
// differences, never a per-axis AND, so "close" is a diamond around the
// reference point rather than a box.

use core::ops::{Add, Sub};

/// A point in the workspace. `x` is horizontal reach/depth, `y` is height
/// (`y == 0` means on the floor).
///
/// `Pos` is `Copy` on purpose: "food follows paw" effects assign by value,
/// so later paw movement can never silently drag the food along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance: sum of absolute per-axis differences.
    #[inline]
    pub fn manhattan(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Fixed offsets like `mouth + (5, 0)` read better as tuples.
impl Add<(i32, i32)> for Pos {
    type Output = Pos;

    fn add(self, rhs: (i32, i32)) -> Pos {
        Pos::new(self.x + rhs.0, self.y + rhs.1)
    }
}

impl Sub<(i32, i32)> for Pos {
    type Output = Pos;

    fn sub(self, rhs: (i32, i32)) -> Pos {
        Pos::new(self.x - rhs.0, self.y - rhs.1)
    }
}

#[inline]
pub fn abs_diff_l_than(p1: Pos, p2: Pos, val: i32) -> bool {
    p1.manhattan(p2) < val
}

#[inline]
pub fn abs_diff_leq_than(p1: Pos, p2: Pos, val: i32) -> bool {
    p1.manhattan(p2) <= val
}

#[inline]
pub fn abs_diff_g_than(p1: Pos, p2: Pos, val: i32) -> bool {
    p1.manhattan(p2) > val
}

#[inline]
pub fn abs_diff_geq_than(p1: Pos, p2: Pos, val: i32) -> bool {
    p1.manhattan(p2) >= val
}

#[inline]
pub fn abs_diff_eq_to(p1: Pos, p2: Pos, val: i32) -> bool {
    p1.manhattan(p2) == val
}
