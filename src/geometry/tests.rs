use crate::geometry::{Bounds, GeometryError, IntoBounds, IntoTuple, Tuple};

#[test]
fn test_into_tuple_impl() {
    let _t: Tuple = 3.into_tuple();
    let _t: Tuple = (1, 2).into_tuple();
    let _t: Tuple = (1, 2, 3).into_tuple();
    let _t: Tuple = vec![1, 2, 3, 4].into_tuple();
    let _t: Tuple = (&[5, 6][..]).into_tuple();
}

#[test]
fn test_into_bounds_impl() {
    assert_eq!(
        (0, 4).into_bounds().into_owned(),
        Bounds::new(vec![(0, 4)])
    );
    assert_eq!(
        ((0, 0), (2, 3)).into_bounds().into_owned(),
        Bounds::new(vec![(0, 2), (0, 3)])
    );
}

#[test]
fn test_area() {
    let b = Bounds::new(vec![(0, 2), (-1, 3)]);
    assert_eq!(b.area(), 8);

    // a degenerate point box has no area
    let p = Bounds::from_tuple(&(5, 5).into_tuple());
    assert_eq!(p.area(), 0);

    // widths near the full i32 range must not overflow
    let wide = Bounds::new(vec![(-2_000_000_000, 2_000_000_000)]);
    assert_eq!(wide.area(), 4_000_000_000);
}

#[test]
#[should_panic(expected = "area of empty bounds")]
fn test_area_of_empty_bounds_panics() {
    Bounds::empty(2).area();
}

#[test]
fn test_empty_bounds_collapse_on_first_extend() {
    let mut b = Bounds::empty(2);
    assert!(b.is_empty());

    b.extend(&(3, -7).into_tuple());
    assert!(!b.is_empty());
    assert_eq!(b, Bounds::new(vec![(3, 3), (-7, -7)]));

    b.extend(&(-1, 4).into_tuple());
    assert_eq!(b, Bounds::new(vec![(-1, 3), (-7, 4)]));
}

#[test]
fn test_combine() {
    let a = Bounds::new(vec![(0, 2), (0, 2)]);
    let b = Bounds::new(vec![(1, 5), (-3, 1)]);

    let combined = a.combine(&b).expect("failed to combine bounds");
    assert_eq!(combined, Bounds::new(vec![(0, 5), (-3, 2)]));

    let mut c = a.clone();
    c.combine_in_place(&b);
    assert_eq!(c, combined);

    // combining with empty bounds yields the other operand
    let mut e = Bounds::empty(2);
    e.combine_in_place(&a);
    assert_eq!(e, a);
}

#[test]
fn test_combine_dimension_mismatch() {
    let a = Bounds::new(vec![(0, 1)]);
    let b = Bounds::new(vec![(0, 1), (0, 1)]);
    assert_eq!(
        a.combine(&b),
        Err(GeometryError::UnmatchedDimensions(1, 2))
    );
}

#[test]
fn test_intersects() {
    let a = Bounds::new(vec![(0, 4), (0, 4)]);
    let b = Bounds::new(vec![(2, 6), (1, 3)]);
    let c = Bounds::new(vec![(5, 8), (0, 4)]);

    assert_eq!(a.intersects(&b), Ok(true));
    assert_eq!(a.intersects(&c), Ok(false));

    // closed intervals: touching boxes intersect
    let touching = Bounds::new(vec![(4, 9), (4, 9)]);
    assert_eq!(a.intersects(&touching), Ok(true));
}

#[test]
fn test_intersection_enlargement() {
    let a = Bounds::new(vec![(0, 4), (0, 4)]);
    let b = Bounds::new(vec![(2, 6), (0, 4)]);
    let c = Bounds::new(vec![(5, 8), (0, 4)]);

    // union of a and b is (0, 6) x (0, 4) with area 24, b has area 16
    assert_eq!(a.intersection_enlargement(&b), Ok(Some(8)));
    // disjoint operands carry no enlargement at all
    assert_eq!(a.intersection_enlargement(&c), Ok(None));
    // equal operands cost nothing
    assert_eq!(a.intersection_enlargement(&a), Ok(Some(0)));
}

#[test]
fn test_enlargement() {
    let a = Bounds::new(vec![(0, 2), (0, 2)]);
    let b = Bounds::new(vec![(1, 3), (1, 3)]);

    // union is (0, 3) x (0, 3) with area 9, a has area 4
    assert_eq!(a.enlargement(&b), Ok(5));
    assert_eq!(a.enlargement(&a), Ok(0));
}

#[test]
fn test_enlargement_for_tuple() {
    let b = Bounds::new(vec![(0, 4), (0, 4)]);

    // inside and on the boundary: no growth
    assert_eq!(b.enlargement_for(&(2, 2).into_tuple()), Ok(0));
    assert_eq!(b.enlargement_for(&(0, 4).into_tuple()), Ok(0));

    // one dimension out: (0, 6) x (0, 4) has area 24
    assert_eq!(b.enlargement_for(&(6, 2).into_tuple()), Ok(8));
    // both dimensions out, below the low corner
    assert_eq!(b.enlargement_for(&(-2, -2).into_tuple()), Ok(20));
}

#[test]
fn test_contains() {
    let b = Bounds::new(vec![(0, 4), (0, 4)]);

    assert_eq!(b.contains(&(2, 3).into_tuple()), Ok(true));
    assert_eq!(b.contains(&(0, 0).into_tuple()), Ok(true));
    assert_eq!(b.contains(&(4, 4).into_tuple()), Ok(true));
    assert_eq!(b.contains(&(5, 2).into_tuple()), Ok(false));
    assert_eq!(
        b.contains(&(1, 2, 3).into_tuple()),
        Err(GeometryError::UnmatchedDimensions(2, 3))
    );
}

#[test]
fn test_from_corners() {
    let low = (0, -2).into_tuple();
    let high = (3, 5).into_tuple();

    assert_eq!(
        Bounds::from_corners(&low, &high),
        Ok(Bounds::new(vec![(0, 3), (-2, 5)]))
    );
    assert_eq!(
        Bounds::from_corners(&low, &(1, 2, 3).into_tuple()),
        Err(GeometryError::UnmatchedDimensions(2, 3))
    );
}

#[test]
fn test_display() {
    let t = (1, -2).into_tuple();
    assert_eq!(t.to_string(), "(1, -2)");

    let b = Bounds::new(vec![(0, 10), (-5, 5)]);
    assert_eq!(b.to_string(), "(0, -5) (10, 5)");
}
