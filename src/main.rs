//! VisPipe demo - Main Entry Point
//!
//! Builds a small pipeline (source, pass-through, append, group) and pulls
//! on it a few times so the caching behavior shows up in the log.
//!
//! Usage: `vispipe-rs [config.toml|config.json]`

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vispipe_rs::{
    config::PipelineConfig,
    data::{CompositeDataSet, DataKind, DataObject, DataSet},
    pipeline::{
        nodes::{AppendArrays, DataSetSource, GroupDataSets, PassThrough},
        Pipeline,
    },
};

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => PipelineConfig::default(),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VisPipe demo");

    let mut pipeline = Pipeline::new(config.executive.clone());
    let points = pipeline.add_node(DataSetSource::new(DataKind::PolyData, 8))?;
    let grid = pipeline.add_node(
        DataSetSource::new(DataKind::UnstructuredGrid, 4).with_time_steps(vec![0.0, 0.5, 1.0]),
    )?;
    let pass = pipeline.add_node(PassThrough::new())?;
    let append = pipeline.add_node(AppendArrays::new("Values"))?;
    let group = pipeline.add_node(GroupDataSets::new())?;

    pipeline.connect(points, 0, pass, 0)?;
    pipeline.connect(pass, 0, append, 0)?;
    pipeline.connect(grid, 0, append, 0)?;
    pipeline.connect(append, 0, group, 0)?;
    pipeline.connect(grid, 0, group, 0)?;

    let order: Vec<_> = pipeline
        .execution_order()
        .into_iter()
        .filter_map(|id| pipeline.node(id).ok().map(|e| e.name().to_string()))
        .collect();
    tracing::info!("Upstream-first order: {}", order.join(" -> "));

    for pass_number in 1..=2 {
        pipeline.update(group)?;
        tracing::info!("Update {} done", pass_number);
    }

    if let Some(mut source) = pipeline.algorithm_mut::<DataSetSource>(points) {
        source.set_number_of_points(16);
    }
    pipeline.update(group)?;

    let output = pipeline
        .node(group)?
        .output_data(0)
        .context("group produced no output")?;
    let output = output.borrow();
    if let Some(tree) = output.as_composite() {
        report(tree);
    }
    Ok(())
}

fn report(tree: &CompositeDataSet) {
    let names = GroupDataSets::block_names(tree);
    let mut iter = tree.new_iterator();
    for item in iter.items() {
        let Some(data) = item.data else {
            continue;
        };
        let data = data.borrow();
        let points = data
            .as_any()
            .downcast_ref::<DataSet>()
            .map_or(0, DataSet::number_of_points);
        let name = item
            .index
            .first()
            .and_then(|&i| names.get(i).cloned().flatten())
            .unwrap_or_default();
        tracing::info!(
            "block {} '{}': {} with {} points",
            item.index,
            name,
            data.kind(),
            points
        );
    }
}
