use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::ir::{EdgeSpec, NodeSize};

/// Nodes mutually reachable ignoring edge direction, with the edges among them.
#[derive(Debug, Clone)]
pub(crate) struct Component<'a> {
    pub(crate) nodes: Vec<&'a str>,
    pub(crate) edges: Vec<&'a EdgeSpec>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Decomposition<'a> {
    /// Components in discovery order.
    pub(crate) components: Vec<Component<'a>>,
    /// Nodes without any resolvable edge, sorted by id.
    pub(crate) isolated: Vec<&'a str>,
}

pub(crate) fn decompose<'a>(
    nodes: &'a BTreeMap<String, NodeSize>,
    edges: &'a [EdgeSpec],
) -> Decomposition<'a> {
    let mut adjacency: BTreeMap<&'a str, BTreeSet<&'a str>> = BTreeMap::new();
    let mut known_edges = Vec::new();
    for edge in edges {
        let (Some((source, _)), Some((target, _))) = (
            nodes.get_key_value(edge.source.as_str()),
            nodes.get_key_value(edge.target.as_str()),
        ) else {
            tracing::trace!(edge = %edge.id, "edge references an unknown node; ignored for layout");
            continue;
        };
        adjacency
            .entry(source.as_str())
            .or_default()
            .insert(target.as_str());
        adjacency
            .entry(target.as_str())
            .or_default()
            .insert(source.as_str());
        known_edges.push(edge);
    }

    let isolated: Vec<&'a str> = nodes
        .keys()
        .map(String::as_str)
        .filter(|id| !adjacency.contains_key(id))
        .collect();

    let mut component_of: BTreeMap<&'a str, usize> = BTreeMap::new();
    let mut components: Vec<Component<'a>> = Vec::new();
    for &root in adjacency.keys() {
        if component_of.contains_key(root) {
            continue;
        }
        let index = components.len();
        let mut members = Vec::new();
        let mut queue = VecDeque::from([root]);
        component_of.insert(root, index);
        while let Some(current) = queue.pop_front() {
            members.push(current);
            let Some(neighbors) = adjacency.get(current) else {
                continue;
            };
            for &next in neighbors {
                if component_of.contains_key(next) {
                    continue;
                }
                component_of.insert(next, index);
                queue.push_back(next);
            }
        }
        components.push(Component {
            nodes: members,
            edges: Vec::new(),
        });
    }

    for edge in known_edges {
        if let Some(&index) = component_of.get(edge.source.as_str()) {
            components[index].edges.push(edge);
        }
    }

    Decomposition {
        components,
        isolated,
    }
}
