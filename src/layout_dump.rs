use crate::layout::{DiagramLayout, RouteKind, Side, layout_bounds};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub routes: Vec<RouteDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDump {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub c1: [f32; 2],
    pub c2: [f32; 2],
    pub source_side: Side,
    pub target_side: Side,
    pub kind: RouteKind,
    /// SVG path data, `M start C c1, c2, end`.
    pub path: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &DiagramLayout) -> Self {
        let nodes = layout
            .placements
            .values()
            .map(|rect| NodeDump {
                id: rect.id.clone(),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            })
            .collect();

        let routes = layout
            .routes
            .values()
            .map(|route| RouteDump {
                id: route.edge_id.clone(),
                source_id: route.source.clone(),
                target_id: route.target.clone(),
                start: [route.start.x, route.start.y],
                end: [route.end.x, route.end.y],
                c1: [route.c1.x, route.c1.y],
                c2: [route.c2.x, route.c2.y],
                source_side: route.source_side,
                target_side: route.target_side,
                kind: route.kind,
                path: route.svg_path(),
            })
            .collect();

        let (min_x, min_y, width, height) = match layout_bounds(&layout.placements) {
            Some(bounds) => (bounds.min_x, bounds.min_y, bounds.width(), bounds.height()),
            None => (0.0, 0.0, 0.0, 0.0),
        };

        LayoutDump {
            min_x,
            min_y,
            width,
            height,
            nodes,
            routes,
        }
    }

    pub fn to_json(&self, pretty: bool) -> anyhow::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub fn write_layout_dump(path: &Path, layout: &DiagramLayout, pretty: bool) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    if pretty {
        serde_json::to_writer_pretty(writer, &dump)?;
    } else {
        serde_json::to_writer(writer, &dump)?;
    }
    Ok(())
}
