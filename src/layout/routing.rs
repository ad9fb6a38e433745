use std::collections::BTreeMap;

use crate::config::RoutingConfig;
use crate::ir::EdgeSpec;

use super::sides::{NodeSides, assign_sides};
use super::types::{
    Placement, Point, Route, RouteKind, Side, interior_samples, polyline_length,
};

// ── Collision sampling ──────────────────────────────────────────────
/// Lower bound on interior samples per collision check.
const MIN_COLLISION_SAMPLES: usize = 20;

// ── Fallback side search scoring ────────────────────────────────────
const ENDPOINT_CROSSING_PENALTY: f32 = -1000.0;
const OTHER_NODE_CROSSING_PENALTY: f32 = -500.0;
const FACING_BONUS: f32 = 50.0;
/// Maximum bonus for a short path; decays as `scale / (scale + length)`.
const PATH_LENGTH_BONUS: f32 = 100.0;
const PATH_LENGTH_SCALE: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
struct Curve {
    start: Point,
    end: Point,
    c1: Point,
    c2: Point,
}

impl Curve {
    fn samples(&self, count: usize) -> Vec<Point> {
        interior_samples(self.start, self.c1, self.c2, self.end, count)
    }
}

/// Builds one cubic bezier per edge whose endpoints are both placed.
///
/// Sides come from [`assign_sides`]; a curve that clips its own endpoint
/// rectangles is widened through `config.retry_factors` and, failing that,
/// replaced by the best of all 16 side combinations for that edge.
pub fn compute_routes(
    edges: &[EdgeSpec],
    placements: &BTreeMap<String, Placement>,
    config: &RoutingConfig,
) -> BTreeMap<String, Route> {
    let _span = tracing::debug_span!(
        "compute_routes",
        edges = edges.len(),
        nodes = placements.len()
    )
    .entered();

    let sides = assign_sides(edges, placements);
    let mut routes = BTreeMap::new();
    for edge in edges {
        let (Some(from), Some(to)) = (placements.get(&edge.source), placements.get(&edge.target))
        else {
            tracing::trace!(edge = %edge.id, "endpoint missing; edge not routed");
            continue;
        };
        let source_side = sides
            .get(&edge.source)
            .map(|s| s.output)
            .unwrap_or(NodeSides::default().output);
        let target_side = sides
            .get(&edge.target)
            .map(|s| s.input)
            .unwrap_or(NodeSides::default().input);
        let route = route_edge(edge, from, to, source_side, target_side, placements, config);
        routes.insert(edge.id.clone(), route);
    }

    tracing::debug!(
        routed = routes.len(),
        fallback = routes
            .values()
            .filter(|route| route.kind == RouteKind::Fallback)
            .count(),
        "edges routed"
    );
    routes
}

fn sample_count(config: &RoutingConfig) -> usize {
    config.collision_samples.max(MIN_COLLISION_SAMPLES)
}

/// Push multipliers in the order they are tried; the first is always 1.0.
fn factor_ladder(config: &RoutingConfig) -> impl Iterator<Item = f32> + '_ {
    std::iter::once(1.0).chain(config.retry_factors.iter().copied())
}

fn build_curve(
    from: &Placement,
    to: &Placement,
    source_side: Side,
    target_side: Side,
    factor: f32,
    config: &RoutingConfig,
) -> Curve {
    let start = source_side.midpoint(from);
    let end = target_side.midpoint(to);
    let control = (start.distance(end) * config.control_ratio)
        .max(config.control_min)
        .min(config.control_max)
        * factor;
    Curve {
        start,
        end,
        c1: start.add(source_side.outward().scale(control)),
        c2: end.add(target_side.outward().scale(control)),
    }
}

fn crosses(samples: &[Point], rect: &Placement, pad: f32) -> bool {
    samples.iter().any(|p| rect.contains_point(*p, pad))
}

fn clips_endpoints(
    curve: &Curve,
    from: &Placement,
    to: &Placement,
    config: &RoutingConfig,
) -> bool {
    let samples = curve.samples(sample_count(config));
    crosses(&samples, from, config.collision_padding)
        || crosses(&samples, to, config.collision_padding)
}

fn make_route(
    edge: &EdgeSpec,
    curve: Curve,
    source_side: Side,
    target_side: Side,
    kind: RouteKind,
) -> Route {
    Route {
        edge_id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        start: curve.start,
        end: curve.end,
        c1: curve.c1,
        c2: curve.c2,
        source_side,
        target_side,
        kind,
    }
}

fn route_edge(
    edge: &EdgeSpec,
    from: &Placement,
    to: &Placement,
    source_side: Side,
    target_side: Side,
    placements: &BTreeMap<String, Placement>,
    config: &RoutingConfig,
) -> Route {
    // Overlapping endpoints cannot be cleared by any curve on the node-level sides.
    let blocked = !edge.is_self_loop() && from.overlaps(to, config.collision_padding);
    if !blocked {
        for (attempt, factor) in factor_ladder(config).enumerate() {
            let curve = build_curve(from, to, source_side, target_side, factor, config);
            if !clips_endpoints(&curve, from, to, config) {
                let kind = if attempt == 0 {
                    RouteKind::Direct
                } else {
                    RouteKind::Widened
                };
                return make_route(edge, curve, source_side, target_side, kind);
            }
            tracing::trace!(edge = %edge.id, factor, "curve clips an endpoint");
        }
    }
    fallback_route(edge, from, to, placements, config)
}

/// First clear curve along the factor ladder, else the widest one.
fn widest_clear_curve(
    from: &Placement,
    to: &Placement,
    source_side: Side,
    target_side: Side,
    config: &RoutingConfig,
) -> Curve {
    let mut curve = build_curve(from, to, source_side, target_side, 1.0, config);
    for &factor in &config.retry_factors {
        if !clips_endpoints(&curve, from, to, config) {
            return curve;
        }
        curve = build_curve(from, to, source_side, target_side, factor, config);
    }
    curve
}

fn score_curve(
    edge: &EdgeSpec,
    curve: &Curve,
    source_side: Side,
    target_side: Side,
    (from, to): (&Placement, &Placement),
    placements: &BTreeMap<String, Placement>,
    config: &RoutingConfig,
) -> f32 {
    let samples = curve.samples(sample_count(config));
    let mut score = 0.0;
    if crosses(&samples, from, config.collision_padding) {
        score += ENDPOINT_CROSSING_PENALTY;
    }
    if crosses(&samples, to, config.collision_padding) {
        score += ENDPOINT_CROSSING_PENALTY;
    }
    for (id, other) in placements {
        if *id == edge.source || *id == edge.target {
            continue;
        }
        if crosses(&samples, other, 0.0) {
            score += OTHER_NODE_CROSSING_PENALTY;
        }
    }

    let toward_target = to.center().sub(from.center());
    if source_side.outward().dot(toward_target) > 0.0 {
        score += FACING_BONUS;
    }
    if target_side.outward().dot(toward_target.scale(-1.0)) > 0.0 {
        score += FACING_BONUS;
    }

    let length = polyline_length(curve.start, &samples, curve.end);
    score + PATH_LENGTH_BONUS * PATH_LENGTH_SCALE / (PATH_LENGTH_SCALE + length)
}

fn fallback_route(
    edge: &EdgeSpec,
    from: &Placement,
    to: &Placement,
    placements: &BTreeMap<String, Placement>,
    config: &RoutingConfig,
) -> Route {
    let evaluate = |source_side: Side, target_side: Side| {
        let curve = widest_clear_curve(from, to, source_side, target_side, config);
        let score = score_curve(
            edge,
            &curve,
            source_side,
            target_side,
            (from, to),
            placements,
            config,
        );
        (score, curve, source_side, target_side)
    };

    let mut best = evaluate(Side::ALL[0], Side::ALL[0]);
    for source_side in Side::ALL {
        for target_side in Side::ALL {
            if (source_side, target_side) == (Side::ALL[0], Side::ALL[0]) {
                continue;
            }
            let candidate = evaluate(source_side, target_side);
            if candidate.0 > best.0 {
                best = candidate;
            }
        }
    }

    let (score, curve, source_side, target_side) = best;
    if score < 0.0 {
        tracing::warn!(edge = %edge.id, score, "no clear route; keeping best-scored fallback");
    } else {
        tracing::trace!(
            edge = %edge.id,
            score,
            ?source_side,
            ?target_side,
            "fallback sides chosen"
        );
    }
    make_route(edge, curve, source_side, target_side, RouteKind::Fallback)
}
