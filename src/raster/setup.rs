//! Triangle setup: vertex ordering, trapezoid decomposition for the
//! scanline strategy, bounding box and barycentric weights for the
//! bounding-box strategy

use glam::{Vec2, Vec3};

/// One side of a trapezoid: an ordered pair of screen vertices with their
/// depths and borrowed varying blocks.
pub(crate) struct Edge<'a> {
    pub p0: Vec2,
    pub p1: Vec2,
    pub z0: f32,
    pub z1: f32,
    pub v0: &'a [f32],
    pub v1: &'a [f32],
}

/// Screen region bounded by two horizontal lines and two side edges.
/// `top <= bottom`, and the left edge stays left of (or on) the right edge
/// at every scanline in between.
pub(crate) struct Trapezoid<'a> {
    pub top: f32,
    pub bottom: f32,
    pub left: Edge<'a>,
    pub right: Edge<'a>,
}

/// Sort the vertices by y and decompose the triangle into 0, 1 or 2
/// trapezoids. Triangles with all three x equal or all three y equal are
/// rejected. No varying interpolation happens here; edges carry the
/// original endpoint blocks.
pub(crate) fn make_trapezoids<'a>(
    screen: &[Vec2; 3],
    depth: &[f32; 3],
    varyings: &[&'a [f32]; 3],
) -> Vec<Trapezoid<'a>> {
    let mut top = 0usize;
    let mut middle = 1usize;
    let mut bottom = 2usize;

    // Compare chain, not a stable sort: equal-y vertices keep whatever
    // order the swaps leave behind.
    if screen[top].y > screen[middle].y {
        std::mem::swap(&mut top, &mut middle);
    }
    if screen[top].y > screen[bottom].y {
        std::mem::swap(&mut top, &mut bottom);
    }
    if screen[middle].y > screen[bottom].y {
        std::mem::swap(&mut middle, &mut bottom);
    }

    if screen[top].x == screen[middle].x && screen[middle].x == screen[bottom].x {
        log::trace!("degenerate triangle rejected (vertical line)");
        return Vec::new();
    }
    if screen[top].y == screen[middle].y && screen[middle].y == screen[bottom].y {
        log::trace!("degenerate triangle rejected (horizontal line)");
        return Vec::new();
    }

    let edge = |i: usize, j: usize| Edge {
        p0: screen[i],
        p1: screen[j],
        z0: depth[i],
        z1: depth[j],
        v0: varyings[i],
        v1: varyings[j],
    };

    let mut trapezoids = Vec::with_capacity(2);

    //    T
    //  /   \
    // M  -  B
    if screen[top].y != screen[middle].y && screen[middle].y == screen[bottom].y {
        if screen[middle].x > screen[bottom].x {
            std::mem::swap(&mut middle, &mut bottom);
        }
        trapezoids.push(Trapezoid {
            top: screen[top].y,
            bottom: screen[bottom].y,
            left: edge(top, middle),
            right: edge(top, bottom),
        });
        return trapezoids;
    }

    // T  -  M
    //  \   /
    //    B
    if screen[top].y == screen[middle].y && screen[middle].y != screen[bottom].y {
        if screen[top].x > screen[middle].x {
            std::mem::swap(&mut top, &mut middle);
        }
        trapezoids.push(Trapezoid {
            top: screen[top].y,
            bottom: screen[bottom].y,
            left: edge(top, bottom),
            right: edge(middle, bottom),
        });
        return trapezoids;
    }

    // T \      / T
    // |  M or M  |
    // B /      \ B
    //
    // The long edge's x at the middle vertex's y decides which side the
    // middle vertex sits on.
    let t = (screen[middle].y - screen[top].y) / (screen[bottom].y - screen[top].y);
    let x_split = screen[top].x + (screen[bottom].x - screen[top].x) * t;

    if screen[middle].x > x_split {
        // Middle on the right: the long edge is the left side of both halves.
        trapezoids.push(Trapezoid {
            top: screen[top].y,
            bottom: screen[middle].y,
            left: edge(top, bottom),
            right: edge(top, middle),
        });
        trapezoids.push(Trapezoid {
            top: screen[middle].y,
            bottom: screen[bottom].y,
            left: edge(top, bottom),
            right: edge(middle, bottom),
        });
    } else {
        trapezoids.push(Trapezoid {
            top: screen[top].y,
            bottom: screen[middle].y,
            left: edge(top, middle),
            right: edge(top, bottom),
        });
        trapezoids.push(Trapezoid {
            top: screen[middle].y,
            bottom: screen[bottom].y,
            left: edge(middle, bottom),
            right: edge(top, bottom),
        });
    }

    trapezoids
}

/// Integer pixel rectangle clamped to the framebuffer. `min` is inclusive,
/// `max` exclusive; an off-screen triangle yields an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

pub(crate) fn bounding_box(screen: &[Vec2; 3], width: usize, height: usize) -> BoundingBox {
    let min = screen[0].min(screen[1]).min(screen[2]);
    let max = screen[0].max(screen[1]).max(screen[2]);
    BoundingBox {
        min_x: (min.x.floor() as i32).max(0),
        min_y: (min.y.floor() as i32).max(0),
        max_x: (max.x.ceil() as i32).min(width as i32),
        max_y: (max.y.ceil() as i32).min(height as i32),
    }
}

/// Barycentric weights of `point` via the 2D cross-product ratio. The
/// components sum to one; all strictly positive means the point is inside
/// the triangle. A degenerate triangle produces non-finite weights that
/// never pass the inside test.
pub(crate) fn barycentric_weights(screen: &[Vec2; 3], point: Vec2) -> Vec3 {
    let ab = screen[1] - screen[0];
    let ac = screen[2] - screen[0];
    let ap = point - screen[0];
    let factor = 1.0 / (ab.x * ac.y - ab.y * ac.x);
    let s = (ac.y * ap.x - ac.x * ap.y) * factor;
    let t = (ab.x * ap.y - ab.y * ap.x) * factor;
    Vec3::new(1.0 - s - t, s, t)
}
