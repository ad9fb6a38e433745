mod components;
mod compose;
mod force;
mod routing;
mod sides;
pub(crate) mod types;
pub use routing::compute_routes;
pub use sides::{NodeSides, assign_sides};
pub use types::*;

use components::decompose;
use compose::{
    center_on_origin, pack_isolated, stack_components, stretch_horizontally, to_placements,
};
use force::simulate_component;

use crate::config::{Config, LayoutConfig};
use crate::ir::{Diagram, DiagramError, EdgeSpec, NodeSize};
use std::collections::BTreeMap;

/// Places every node so connected nodes cluster and unrelated ones separate.
///
/// Output is a pure function of the ids, sizes, edges and `config`; repeated
/// calls on identical input are bit-identical. Edges naming unknown nodes are
/// ignored.
pub fn compute_layout(
    nodes: &BTreeMap<String, NodeSize>,
    edges: &[EdgeSpec],
    config: &LayoutConfig,
) -> BTreeMap<String, Placement> {
    let _span =
        tracing::debug_span!("compute_layout", nodes = nodes.len(), edges = edges.len()).entered();
    if nodes.is_empty() {
        return BTreeMap::new();
    }

    let parts = decompose(nodes, edges);
    tracing::debug!(
        components = parts.components.len(),
        isolated = parts.isolated.len(),
        "decomposed graph"
    );

    let frames = parts
        .components
        .iter()
        .map(|component| {
            let mut positions = simulate_component(component, config);
            center_on_origin(&mut positions, nodes);
            positions
        })
        .collect();

    let (mut positions, cursor) = stack_components(frames, nodes, config.component_spacing);
    positions.extend(pack_isolated(
        &parts.isolated,
        nodes,
        cursor,
        config.isolated_spacing,
    ));

    center_on_origin(&mut positions, nodes);
    stretch_horizontally(&mut positions, config.horizontal_stretch);
    center_on_origin(&mut positions, nodes);

    to_placements(&positions, nodes)
}

/// Validates `diagram` and places its nodes. The returned layout has no routes.
pub fn place_diagram(diagram: &Diagram, config: &Config) -> Result<DiagramLayout, DiagramError> {
    diagram.validate()?;
    let placements = compute_layout(&diagram.node_sizes(), &diagram.edges, &config.layout);
    Ok(DiagramLayout {
        placements,
        routes: BTreeMap::new(),
    })
}

/// Validates `diagram` and runs placement followed by routing.
pub fn layout_diagram(diagram: &Diagram, config: &Config) -> Result<DiagramLayout, DiagramError> {
    let mut layout = place_diagram(diagram, config)?;
    layout.routes = compute_routes(&diagram.edges, &layout.placements, &config.routing);
    Ok(layout)
}
