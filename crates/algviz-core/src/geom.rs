pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Box2 = euclid::Box2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// Smallest box holding every point, or `None` for an empty input.
pub fn bounds_of(points: impl IntoIterator<Item = Point>) -> Option<Box2> {
    let mut it = points.into_iter();
    let first = it.next()?;
    let mut b = Box2::new(first, first);
    for p in it {
        b.min.x = b.min.x.min(p.x);
        b.min.y = b.min.y.min(p.y);
        b.max.x = b.max.x.max(p.x);
        b.max.y = b.max.y.max(p.y);
    }
    Some(b)
}

/// Element-wise max extent of two boxes.
pub fn union(a: &Box2, b: &Box2) -> Box2 {
    Box2::new(
        point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
        point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
    )
}

/// Whether two polylines match point for point within `epsilon`.
pub fn same_path(a: &[Point], b: &[Point], epsilon: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| (*q - *p).length() <= epsilon)
}
