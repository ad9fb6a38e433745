use std::collections::BTreeMap;

use crate::ir::NodeSize;

use super::types::{Placement, Point};

type Positions<'a> = BTreeMap<&'a str, Point>;

fn size_of(sizes: &BTreeMap<String, NodeSize>, id: &str) -> NodeSize {
    sizes.get(id).copied().unwrap_or(NodeSize::new(0.0, 0.0))
}

/// Rectangle extents `(min_x, min_y, max_x, max_y)` of centered nodes.
fn extents(
    positions: &Positions<'_>,
    sizes: &BTreeMap<String, NodeSize>,
) -> Option<(f32, f32, f32, f32)> {
    let mut bounds: Option<(f32, f32, f32, f32)> = None;
    for (id, center) in positions {
        let size = size_of(sizes, id);
        let half_w = size.width / 2.0;
        let half_h = size.height / 2.0;
        let rect = (
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        );
        bounds = Some(match bounds {
            None => rect,
            Some((min_x, min_y, max_x, max_y)) => (
                min_x.min(rect.0),
                min_y.min(rect.1),
                max_x.max(rect.2),
                max_y.max(rect.3),
            ),
        });
    }
    bounds
}

fn translate(positions: &mut Positions<'_>, offset: Point) {
    for center in positions.values_mut() {
        *center = center.add(offset);
    }
}

/// Moves the rectangle bounding-box center of `positions` to the origin.
pub(crate) fn center_on_origin(positions: &mut Positions<'_>, sizes: &BTreeMap<String, NodeSize>) {
    let Some((min_x, min_y, max_x, max_y)) = extents(positions, sizes) else {
        return;
    };
    let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    translate(positions, center.scale(-1.0));
}

/// Stacks already-centered components top to bottom starting at y = 0.
/// Returns the merged positions and the y where the next block may start.
pub(crate) fn stack_components<'a>(
    components: Vec<Positions<'a>>,
    sizes: &BTreeMap<String, NodeSize>,
    spacing: f32,
) -> (Positions<'a>, f32) {
    let mut merged = Positions::new();
    let mut cursor = 0.0f32;
    for mut component in components {
        let Some((_, min_y, _, max_y)) = extents(&component, sizes) else {
            continue;
        };
        translate(&mut component, Point::new(0.0, cursor - min_y));
        cursor += (max_y - min_y) + spacing;
        merged.extend(component);
    }
    (merged, cursor)
}

/// Grid-packs isolated nodes in `ceil(sqrt(n))` columns from `top` downward,
/// centering the block horizontally on x = 0.
pub(crate) fn pack_isolated<'a>(
    ids: &[&'a str],
    sizes: &BTreeMap<String, NodeSize>,
    top: f32,
    spacing: f32,
) -> Positions<'a> {
    let mut packed = Positions::new();
    if ids.is_empty() {
        return packed;
    }
    let columns = (ids.len() as f64).sqrt().ceil() as usize;

    let mut block_width = 0.0f32;
    let mut y = top;
    for row in ids.chunks(columns) {
        let mut x = 0.0f32;
        let mut row_height = 0.0f32;
        for id in row {
            let size = size_of(sizes, id);
            packed.insert(*id, Point::new(x + size.width / 2.0, y + size.height / 2.0));
            x += size.width + spacing;
            row_height = row_height.max(size.height);
        }
        block_width = block_width.max(x - spacing);
        y += row_height + spacing;
    }

    translate(&mut packed, Point::new(-block_width / 2.0, 0.0));
    packed
}

pub(crate) fn stretch_horizontally(positions: &mut Positions<'_>, factor: f32) {
    for center in positions.values_mut() {
        center.x *= factor;
    }
}

pub(crate) fn to_placements(
    positions: &Positions<'_>,
    sizes: &BTreeMap<String, NodeSize>,
) -> BTreeMap<String, Placement> {
    positions
        .iter()
        .map(|(id, center)| {
            let size = size_of(sizes, id);
            let placement = Placement {
                id: id.to_string(),
                x: center.x - size.width / 2.0,
                y: center.y - size.height / 2.0,
                width: size.width,
                height: size.height,
            };
            (id.to_string(), placement)
        })
        .collect()
}
