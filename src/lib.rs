#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RoutingConfig, load_config, merge_inline_config};
pub use ir::{Diagram, DiagramError, EdgeSpec, NodeSize, NodeSpec, parse_diagram};
pub use layout::{
    Bounds, DiagramLayout, NodeSides, Placement, Point, Route, RouteKind, Side, assign_sides,
    compute_layout, compute_routes, layout_bounds, layout_diagram, place_diagram,
};
pub use layout_dump::LayoutDump;
