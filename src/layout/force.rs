use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;

use super::components::Component;
use super::types::Point;

const SALT_X: &[u8] = b"stockflow:x";
const SALT_Y: &[u8] = b"stockflow:y";

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Pure `(id, salt) -> [0, 1)` hash used to seed start positions.
pub(crate) fn seed_unit(id: &str, salt: &[u8]) -> f32 {
    let mut hash = FNV_OFFSET;
    for byte in salt.iter().chain(id.as_bytes()) {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    // splitmix64 finalizer
    hash ^= hash >> 30;
    hash = hash.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    hash ^= hash >> 27;
    hash = hash.wrapping_mul(0x94d0_49bb_1331_11eb);
    hash ^= hash >> 31;
    (hash >> 40) as f32 / (1u64 << 24) as f32
}

pub(crate) fn seed_position(id: &str, spread: f32) -> Point {
    Point::new(
        (seed_unit(id, SALT_X) - 0.5) * spread,
        (seed_unit(id, SALT_Y) - 0.5) * spread,
    )
}

/// Spring-electrical annealing over one component. Returns simulated centers.
pub(crate) fn simulate_component<'a>(
    component: &Component<'a>,
    config: &LayoutConfig,
) -> BTreeMap<&'a str, Point> {
    let ids = &component.nodes;
    if ids.len() < 2 {
        return ids.iter().map(|id| (*id, Point::ZERO)).collect();
    }

    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut links: Vec<(usize, usize)> = Vec::with_capacity(component.edges.len());
    let mut net_outflow = vec![0.0f32; ids.len()];
    for edge in &component.edges {
        let (Some(&source), Some(&target)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        net_outflow[source] += 1.0;
        net_outflow[target] -= 1.0;
        if source != target {
            links.push((source, target));
        }
    }

    let k = config.optimal_distance.max(f32::EPSILON);
    let k_squared = k * k;
    let min_distance = config.min_distance.max(f32::EPSILON);

    let mut positions: Vec<Point> = ids
        .iter()
        .map(|id| seed_position(id, config.initial_spread))
        .collect();
    let mut forces = vec![Point::ZERO; ids.len()];
    let mut temperature = config.initial_temperature;

    for _ in 0..config.iterations {
        forces.fill(Point::ZERO);

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let delta = positions[i].sub(positions[j]);
                let magnitude =
                    k_squared / delta.length().max(min_distance) * config.repulsion_strength;
                let push = delta.normalized().scale(magnitude);
                forces[i] = forces[i].add(push);
                forces[j] = forces[j].sub(push);
            }
        }

        for &(source, target) in &links {
            let delta = positions[target].sub(positions[source]);
            let distance = delta.length();
            let magnitude = distance * distance / k * config.attraction_strength;
            let pull = delta.normalized().scale(magnitude);
            forces[source] = forces[source].add(pull);
            forces[target] = forces[target].sub(pull);
        }

        for (force, outflow) in forces.iter_mut().zip(&net_outflow) {
            force.y -= outflow * config.flow_bias;
        }

        for (position, force) in positions.iter_mut().zip(&forces) {
            let length = force.length();
            let displacement = if length > temperature && length > 0.0 {
                force.scale(temperature / length)
            } else {
                *force
            };
            *position = position.add(displacement);
        }

        temperature *= config.cooling_rate;
    }

    tracing::trace!(
        nodes = ids.len(),
        links = links.len(),
        final_temperature = temperature,
        "component simulated"
    );

    ids.iter().copied().zip(positions).collect()
}
