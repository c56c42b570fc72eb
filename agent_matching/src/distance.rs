use crate::GridPoint;

/// Squared euclidean distance between two cells, widened to i64 so that
/// coordinate spans up to ~10^5 cannot overflow the multiplication.
pub fn squared_euclidean(a: GridPoint, b: GridPoint) -> i64 {
    let dx = a.x as i64 - b.x as i64;
    let dy = a.y as i64 - b.y as i64;
    dx * dx + dy * dy
}

/// Minimum squared euclidean distance from a point to the axis-aligned
/// rectangle `[x0, x1] x [y0, y1]` (inclusive cell extents). Zero when the
/// point lies inside the rectangle.
pub fn squared_distance_to_rect(p: GridPoint, x0: i64, y0: i64, x1: i64, y1: i64) -> i64 {
    let px = (p.x as i64).clamp(x0, x1);
    let py = (p.y as i64).clamp(y0, y1);
    let dx = p.x as i64 - px;
    let dy = p.y as i64 - py;
    dx * dx + dy * dy
}
