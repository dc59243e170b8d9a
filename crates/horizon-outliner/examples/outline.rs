//! Horizon Outliner demo
//!
//! Builds an in-memory scene with a hosted foreign document, walks it the way a
//! tree view would (expanding lazily, one page at a time), edits a few cells and
//! prints the realized tree after each step.
//!
//! Run with: cargo run -p horizon-outliner --example outline [config.toml]
//!
//! Set `RUST_LOG=horizon_outliner::fetch=debug` to watch the fetches.

use std::sync::Arc;

use horizon_outliner::model::{FilterProxyModel, ItemData, ItemModel, ItemRole, ModelIndex};
use horizon_outliner::outliner::{
    Column, MemoryScene, OutlinerModel, PropertyValue, StructuralChange,
};
use horizon_outliner::{OutlinerConfig, TreeFormatOptions};
use tracing_subscriber::EnvFilter;

fn build_scene() -> Arc<MemoryScene> {
    let scene = Arc::new(MemoryScene::new());
    let root = scene.root();

    let props = scene.add_node(&root, "Props", "Dummy");
    for i in 0..120 {
        scene.add_node(&props, &format!("Crate{i:03}"), "Box");
    }

    let teapot = scene.add_node(&root, "Teapot001", "Teapot");
    scene.add_sub_property(&teapot, "radius", PropertyValue::Float(25.0));
    scene.add_sub_property(&teapot, "smooth", PropertyValue::Bool(true));
    let transform = scene.add_sub_property_group(&teapot, "Transform");
    let position = scene.add_controlled_sub_property(
        &transform,
        "Position",
        PropertyValue::Float(0.0),
        "Position_XYZ",
    );
    scene.set_animated(&position, true);

    let doc = scene.add_document("/assets/street.usda");
    let lamp = scene.add_prim(doc, "/Street/Lamp", "Xform");
    scene.add_prim(doc, "/Street/Lamp/Bulb", "Sphere");
    scene.add_prim(doc, "/Street/Marker", "");
    scene.add_prim_reference(&lamp, "/assets/lamp.usd");
    scene.add_document_host(&root, "Street", doc);

    scene
}

/// Fetches every dimension of `parent` and its realized descendants.
fn expand_all(model: &impl ItemModel, parent: &ModelIndex) {
    while model.can_fetch_more(parent) {
        model.fetch_more(parent);
    }
    for row in 0..model.row_count(parent) {
        expand_all(model, &model.index(row, 0, parent));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => OutlinerConfig::load(path)?,
        None => OutlinerConfig::default().with_page_size(50),
    };
    tracing::info!(page_size = config.page_size, "starting outliner demo");

    let scene = build_scene();
    let model = Arc::new(OutlinerModel::with_config(scene.clone(), scene.root(), config));
    model.signals().rows_inserted.connect(|(parent, first, last)| {
        tracing::info!(depth = parent.depth(), first, last, "rows inserted");
    });

    let scene_root = model.index(0, 0, &ModelIndex::invalid());
    model.fetch_more(&scene_root);
    let props = model.index(0, 0, &scene_root);
    model.fetch_more(&props);
    println!("After one page under Props:");
    println!("{}", model.debug_tree(TreeFormatOptions { max_depth: Some(1), ..TreeFormatOptions::detailed() }));

    model.set_include_sub_properties(true);
    let scene_root = model.index(0, 0, &ModelIndex::invalid());
    model.fetch_more(&scene_root);
    for row in 1..model.row_count(&scene_root) {
        expand_all(model.as_ref(), &model.index(row, 0, &scene_root));
    }
    println!("With sub-properties, Teapot and Street expanded:");
    println!("{}", model.debug_tree(TreeFormatOptions::detailed()));

    let street = model.index(2, 0, &scene_root);
    let hidden = model.set_data(
        &street.sibling_at_column(Column::Visibility.index()),
        ItemData::Bool(false),
        ItemRole::CheckState,
    );
    tracing::info!(hidden, "toggled Street visibility");

    let proxy = FilterProxyModel::with_config(model.clone(), &model.config().filter);
    proxy.set_filter_text("lamp");
    let filtered_root = proxy.index(0, 0, &ModelIndex::invalid());
    println!("Filtered by \"lamp\":");
    print_proxy(proxy.as_ref(), &filtered_root, 0);

    model.notify_structure_changed(StructuralChange::SceneReset);
    println!("{}", model.debug_tree(TreeFormatOptions::minimal()));
    Ok(())
}

fn print_proxy(model: &impl ItemModel, index: &ModelIndex, depth: usize) {
    if !index.is_valid() {
        return;
    }
    let name = model.display_text(index).unwrap_or_default();
    let tip = model.data(index, ItemRole::ToolTip).into_string();
    println!("{}{}{}", "  ".repeat(depth), name, tip.map(|t| format!("  ({})", t.replace('\n', "; "))).unwrap_or_default());
    for row in 0..model.row_count(index) {
        print_proxy(model, &model.index(row, 0, index), depth + 1);
    }
}
