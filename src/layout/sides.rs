use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ir::EdgeSpec;

use super::types::{Placement, Point, Side};

/// Order in which equally good facing sides are preferred.
const FACING_ORDER: [Side; 4] = [Side::Right, Side::Bottom, Side::Left, Side::Top];

/// Opposite `(input, output)` pairs scored when both natural sides collide.
const OPPOSITE_PAIRS: [(Side, Side); 4] = [
    (Side::Left, Side::Right),
    (Side::Right, Side::Left),
    (Side::Top, Side::Bottom),
    (Side::Bottom, Side::Top),
];

const FACING_REWARD: i32 = 30;
const AWAY_PENALTY: i32 = -10;
const AXIS_BONUS: i32 = 20;
/// A majority-optimal pair may trail the best pair by at most this much.
const MAJORITY_SLACK: i32 = 20;

/// The side serving all incoming edges of a node and the one serving all
/// outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSides {
    pub input: Side,
    pub output: Side,
}

impl Default for NodeSides {
    fn default() -> Self {
        Self {
            input: Side::Left,
            output: Side::Right,
        }
    }
}

#[derive(Debug, Default)]
struct Incidence {
    /// Source centers of incoming edges.
    sources: Vec<Point>,
    /// Target centers of outgoing edges.
    targets: Vec<Point>,
}

#[derive(Debug, Clone, Copy)]
struct PairScore {
    input: Side,
    output: Side,
    incoming: i32,
    outgoing: i32,
    axis: i32,
}

impl PairScore {
    fn total(&self) -> i32 {
        self.incoming + self.outgoing + self.axis
    }
}

/// Picks one input side and one distinct output side for every placed node.
pub fn assign_sides(
    edges: &[EdgeSpec],
    placements: &BTreeMap<String, Placement>,
) -> BTreeMap<String, NodeSides> {
    let mut incidence: BTreeMap<&str, Incidence> = placements
        .keys()
        .map(|id| (id.as_str(), Incidence::default()))
        .collect();
    for edge in edges {
        let (Some(from), Some(to)) = (placements.get(&edge.source), placements.get(&edge.target))
        else {
            continue;
        };
        if let Some(entry) = incidence.get_mut(edge.source.as_str()) {
            entry.targets.push(to.center());
        }
        if let Some(entry) = incidence.get_mut(edge.target.as_str()) {
            entry.sources.push(from.center());
        }
    }

    incidence
        .into_iter()
        .filter_map(|(id, incident)| {
            let placement = placements.get(id)?;
            Some((id.to_string(), sides_for_node(placement.center(), &incident)))
        })
        .collect()
}

fn sides_for_node(center: Point, incident: &Incidence) -> NodeSides {
    let defaults = NodeSides::default();
    match (incident.sources.is_empty(), incident.targets.is_empty()) {
        (true, true) => defaults,
        (false, true) => {
            let input = facing_side(center, &incident.sources).unwrap_or(defaults.input);
            NodeSides {
                input,
                output: input.opposite(),
            }
        }
        (true, false) => {
            let output = facing_side(center, &incident.targets).unwrap_or(defaults.output);
            NodeSides {
                input: output.opposite(),
                output,
            }
        }
        (false, false) => {
            let input = facing_side(center, &incident.sources).unwrap_or(defaults.input);
            let output = facing_side(center, &incident.targets).unwrap_or(defaults.output);
            if input != output {
                return NodeSides { input, output };
            }
            resolve_collision(center, incident)
        }
    }
}

/// Side whose outward vector best faces the mean of `neighbors`.
fn facing_side(center: Point, neighbors: &[Point]) -> Option<Side> {
    if neighbors.is_empty() {
        return None;
    }
    let sum = neighbors.iter().fold(Point::ZERO, |acc, p| acc.add(*p));
    let direction = sum.scale(1.0 / neighbors.len() as f32).sub(center);
    if direction.length() <= f32::EPSILON {
        return None;
    }
    let mut best = FACING_ORDER[0];
    let mut best_dot = f32::NEG_INFINITY;
    for side in FACING_ORDER {
        let dot = side.outward().dot(direction);
        if dot > best_dot {
            best = side;
            best_dot = dot;
        }
    }
    Some(best)
}

fn half_plane_score(side: Side, center: Point, neighbors: &[Point]) -> i32 {
    neighbors
        .iter()
        .map(|p| {
            if side.outward().dot(p.sub(center)) > 0.0 {
                FACING_REWARD
            } else {
                AWAY_PENALTY
            }
        })
        .sum()
}

fn resolve_collision(center: Point, incident: &Incidence) -> NodeSides {
    let (spread_x, spread_y) = incident
        .sources
        .iter()
        .chain(&incident.targets)
        .fold((0.0f32, 0.0f32), |(sx, sy), p| {
            let delta = p.sub(center);
            (sx + delta.x.abs(), sy + delta.y.abs())
        });
    let horizontal_spread = spread_x >= spread_y;

    let scores: Vec<PairScore> = OPPOSITE_PAIRS
        .iter()
        .map(|&(input, output)| PairScore {
            input,
            output,
            incoming: half_plane_score(input, center, &incident.sources),
            outgoing: half_plane_score(output, center, &incident.targets),
            axis: if input.is_horizontal() == horizontal_spread {
                AXIS_BONUS
            } else {
                0
            },
        })
        .collect();

    let best = first_max_by(&scores, |score| (score.total(), 0));
    let incoming_count = incident.sources.len();
    let outgoing_count = incident.targets.len();
    let majority = if incoming_count > outgoing_count {
        Some(first_max_by(&scores, |score| (score.incoming, score.total())))
    } else if outgoing_count > incoming_count {
        Some(first_max_by(&scores, |score| (score.outgoing, score.total())))
    } else {
        None
    };

    let chosen = match majority {
        Some(candidate) if candidate.total() >= best.total() - MAJORITY_SLACK => candidate,
        _ => best,
    };
    NodeSides {
        input: chosen.input,
        output: chosen.output,
    }
}

/// Highest-keyed score, keeping the earliest on ties.
fn first_max_by(scores: &[PairScore], key: impl Fn(&PairScore) -> (i32, i32)) -> PairScore {
    let mut best = scores[0];
    for score in &scores[1..] {
        if key(score) > key(&best) {
            best = *score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: &str, cx: f32, cy: f32) -> (String, Placement) {
        (
            id.to_string(),
            Placement {
                id: id.to_string(),
                x: cx - 50.0,
                y: cy - 25.0,
                width: 100.0,
                height: 50.0,
            },
        )
    }

    fn placements(entries: &[(&str, f32, f32)]) -> BTreeMap<String, Placement> {
        entries.iter().map(|(id, x, y)| rect(id, *x, *y)).collect()
    }

    #[test]
    fn unconnected_node_uses_default_pair() {
        let placed = placements(&[("a", 0.0, 0.0)]);
        let sides = assign_sides(&[], &placed);
        assert_eq!(sides["a"], NodeSides::default());
    }

    #[test]
    fn sink_faces_its_sources() {
        let placed = placements(&[("src", 0.0, -200.0), ("sink", 0.0, 0.0)]);
        let edges = vec![EdgeSpec::new("e1", "src", "sink")];
        let sides = assign_sides(&edges, &placed);
        assert_eq!(sides["sink"].input, Side::Top);
        assert_eq!(sides["sink"].output, Side::Bottom);
        assert_eq!(sides["src"].output, Side::Bottom);
        assert_eq!(sides["src"].input, Side::Top);
    }

    #[test]
    fn distinct_natural_sides_are_kept() {
        let placed = placements(&[("a", -300.0, 0.0), ("b", 0.0, 0.0), ("c", 0.0, 300.0)]);
        let edges = vec![EdgeSpec::new("e1", "a", "b"), EdgeSpec::new("e2", "b", "c")];
        let sides = assign_sides(&edges, &placed);
        assert_eq!(
            sides["b"],
            NodeSides {
                input: Side::Left,
                output: Side::Bottom
            }
        );
    }

    #[test]
    fn colliding_sides_split_onto_opposite_pair() {
        // both neighbors sit to the right, slightly above and below
        let placed = placements(&[("up", 300.0, -40.0), ("b", 0.0, 0.0), ("down", 300.0, 40.0)]);
        let edges = vec![
            EdgeSpec::new("e1", "up", "b"),
            EdgeSpec::new("e2", "b", "down"),
        ];
        let sides = assign_sides(&edges, &placed);
        let b = sides["b"];
        assert_ne!(b.input, b.output);
        assert_eq!(b.input.opposite(), b.output);
    }

    #[test]
    fn majority_direction_keeps_its_facing_side() {
        // three sources and one target all to the right of b
        let placed = placements(&[
            ("s1", 300.0, -100.0),
            ("s2", 300.0, 0.0),
            ("s3", 300.0, 100.0),
            ("b", 0.0, 0.0),
            ("t", 300.0, 10.0),
        ]);
        let edges = vec![
            EdgeSpec::new("e1", "s1", "b"),
            EdgeSpec::new("e2", "s2", "b"),
            EdgeSpec::new("e3", "s3", "b"),
            EdgeSpec::new("e4", "b", "t"),
        ];
        let sides = assign_sides(&edges, &placed);
        assert_eq!(
            sides["b"],
            NodeSides {
                input: Side::Right,
                output: Side::Left
            }
        );
    }

    #[test]
    fn edges_to_unplaced_nodes_are_skipped() {
        let placed = placements(&[("a", 0.0, 0.0)]);
        let edges = vec![EdgeSpec::new("e1", "a", "ghost")];
        let sides = assign_sides(&edges, &placed);
        assert_eq!(sides.len(), 1);
        assert_eq!(sides["a"], NodeSides::default());
    }
}
