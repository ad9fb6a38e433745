//! Property-based invariant tests for the layout and routing pipeline.
//!
//! For any small diagram of stocks and flows (including flows that name
//! stocks which do not exist, self-loops and parallel flows):
//!
//! 1. Layout and routing are deterministic.
//! 2. Every input stock is placed exactly once with its size unchanged.
//! 3. All coordinates are finite.
//! 4. Route endpoints sit on side midpoints of their stocks.
//! 5. A stock with both inflows and outflows gets two distinct sides.
//! 6. Non-fallback routes use the node-level sides.
//! 7. Flows touching a missing stock produce no route.
//! 8. Non-fallback routes never enter their own endpoint rectangles.

use proptest::prelude::*;
use stockflow_layout::{Config, Diagram, RouteKind, assign_sides, layout_diagram};

/// Interior points checked per route, matching the router's own sampling.
const ROUTE_SAMPLES: usize = 20;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Node sizes plus flows given as index pairs; an index equal to the node
/// count refers to a stock that is never declared.
fn diagram_strategy() -> impl Strategy<Value = Diagram> {
    (1usize..=8).prop_flat_map(|count| {
        (
            prop::collection::vec((20u16..=160, 20u16..=90), count),
            prop::collection::vec((0..=count, 0..=count), 0..=12),
        )
            .prop_map(|(sizes, flows)| {
                let mut diagram = Diagram::new();
                for (i, (width, height)) in sizes.iter().enumerate() {
                    diagram.ensure_node(&format!("S{i}"), f32::from(*width), f32::from(*height));
                }
                for (k, (from, to)) in flows.iter().enumerate() {
                    diagram.add_edge(&format!("F{k}"), &format!("S{from}"), &format!("S{to}"));
                }
                diagram
            })
    })
}

fn declared(diagram: &Diagram, id: &str) -> bool {
    diagram.nodes.iter().any(|node| node.id == id)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn layout_is_deterministic(diagram in diagram_strategy()) {
        let config = Config::default();
        let first = layout_diagram(&diagram, &config).unwrap();
        let second = layout_diagram(&diagram, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Placements preserve ids and sizes, coordinates stay finite
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placements_preserve_ids_and_sizes(diagram in diagram_strategy()) {
        let layout = layout_diagram(&diagram, &Config::default()).unwrap();
        prop_assert_eq!(layout.placements.len(), diagram.nodes.len());
        for node in &diagram.nodes {
            let placement = layout.placements.get(&node.id);
            prop_assert!(placement.is_some(), "missing placement for {}", node.id);
            let placement = placement.unwrap();
            prop_assert_eq!(&placement.id, &node.id);
            prop_assert_eq!(placement.width, node.width);
            prop_assert_eq!(placement.height, node.height);
            prop_assert!(placement.x.is_finite() && placement.y.is_finite(), "{:?}", placement);
        }
        for route in layout.routes.values() {
            for point in [route.start, route.c1, route.c2, route.end] {
                prop_assert!(point.x.is_finite() && point.y.is_finite(), "{:?}", route);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Midpoint law
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn routes_attach_at_side_midpoints(diagram in diagram_strategy()) {
        let layout = layout_diagram(&diagram, &Config::default()).unwrap();
        for route in layout.routes.values() {
            let from = &layout.placements[&route.source];
            let to = &layout.placements[&route.target];
            prop_assert_eq!(route.start, route.source_side.midpoint(from), "{}", route.edge_id);
            prop_assert_eq!(route.end, route.target_side.midpoint(to), "{}", route.edge_id);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-6. Side separation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn inflow_and_outflow_sides_differ(diagram in diagram_strategy()) {
        let layout = layout_diagram(&diagram, &Config::default()).unwrap();
        let sides = assign_sides(&diagram.edges, &layout.placements);
        prop_assert_eq!(sides.len(), layout.placements.len());
        for node_sides in sides.values() {
            prop_assert_ne!(node_sides.input, node_sides.output);
        }
        for route in layout.routes.values() {
            if route.kind == RouteKind::Fallback {
                continue;
            }
            prop_assert_eq!(route.source_side, sides[&route.source].output, "{}", route.edge_id);
            prop_assert_eq!(route.target_side, sides[&route.target].input, "{}", route.edge_id);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Missing references are skipped
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn flows_to_missing_stocks_are_not_routed(diagram in diagram_strategy()) {
        let layout = layout_diagram(&diagram, &Config::default()).unwrap();
        for edge in &diagram.edges {
            let resolvable = declared(&diagram, &edge.source) && declared(&diagram, &edge.target);
            prop_assert_eq!(
                layout.routes.contains_key(&edge.id),
                resolvable,
                "flow {} ({} -> {})",
                edge.id,
                edge.source,
                edge.target
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Containment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn settled_routes_stay_outside_endpoints(diagram in diagram_strategy()) {
        let layout = layout_diagram(&diagram, &Config::default()).unwrap();
        for route in layout.routes.values() {
            if route.kind == RouteKind::Fallback {
                continue;
            }
            let endpoints = [&layout.placements[&route.source], &layout.placements[&route.target]];
            for point in route.interior_samples(ROUTE_SAMPLES) {
                for rect in endpoints {
                    prop_assert!(
                        !rect.contains_point(point, 0.0),
                        "route {} ({:?}) enters {} at {:?}",
                        route.edge_id,
                        route.kind,
                        rect.id,
                        point
                    );
                }
            }
        }
    }
}
