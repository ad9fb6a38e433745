use serde::Deserialize;
use stockflow_layout::{
    Config, LayoutDump, layout_diagram, merge_inline_config, parse_diagram, place_diagram,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockFlowLayoutOptions {
    /// Same shape as the diagram's inline `config`; applied after it.
    config: Option<serde_json::Value>,
    layout_only: Option<bool>,
    pretty: Option<bool>,
}

fn layout_to_json(diagram_json: &str, options: StockFlowLayoutOptions) -> Result<String, String> {
    let diagram = parse_diagram(diagram_json).map_err(|error| error.to_string())?;
    let mut config = Config::default();
    if let Some(inline) = &diagram.config {
        config = merge_inline_config(config, inline).map_err(|error| error.to_string())?;
    }
    if let Some(overrides) = &options.config {
        config = merge_inline_config(config, overrides).map_err(|error| error.to_string())?;
    }

    let layout = if options.layout_only.unwrap_or(false) {
        place_diagram(&diagram, &config)
    } else {
        layout_diagram(&diagram, &config)
    }
    .map_err(|error| error.to_string())?;
    LayoutDump::from_layout(&layout)
        .to_json(options.pretty.unwrap_or(false))
        .map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_stock_flow(
    diagram_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<StockFlowLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        StockFlowLayoutOptions::default()
    };

    layout_to_json(diagram_json, options).map_err(|error| JsValue::from_str(&error))
}
