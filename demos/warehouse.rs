//! Warehouse demo: robots, shelves and a charging station, first as a static
//! graph and then as a temporal graph whose state changes every half hour.
//!
//! Run with: cargo run --example warehouse

use std::time::Duration;
use tempograph::{
    Attributes, KnowledgeGraph, Snapshot, StaticGraph, TemporalGraph, TimeWindow, Timestamp,
};

const HALF_HOUR: Duration = Duration::from_secs(30 * 60);

fn create_warehouse_graph(graph: &mut dyn KnowledgeGraph) -> tempograph::Result<()> {
    let nodes = [
        (
            "Robot1",
            Attributes::new()
                .with_kind("robot")
                .with("position", (0.0, 0.0))
                .with("battery", 1.0),
        ),
        (
            "Robot2",
            Attributes::new()
                .with_kind("robot")
                .with("position", (10.0, 10.0))
                .with("battery", 0.9),
        ),
        ("Shelf1", Attributes::new().with_kind("shelf").with("inventory", 50)),
        ("Shelf2", Attributes::new().with_kind("shelf").with("inventory", 30)),
        ("ChargingStation", Attributes::new().with_kind("station")),
    ];
    for (entity, attributes) in nodes {
        graph.write_node(entity, attributes, None)?;
    }

    let edges = [
        ("Robot1", "Shelf1", "can_access"),
        ("Robot1", "Shelf2", "can_access"),
        ("Robot2", "Shelf1", "can_access"),
        ("Robot1", "ChargingStation", "can_charge"),
        ("Robot2", "ChargingStation", "can_charge"),
    ];
    for (from, to, relation) in edges {
        graph.write_edge(from, None, to, None, relation, Attributes::new())?;
    }
    Ok(())
}

fn render(snapshot: &Snapshot) {
    println!("{}", snapshot.title().replace('\n', " | "));
    for label in snapshot.node_labels().values() {
        println!("   [{}]", label.replace('\n', ", "));
    }
    for (from, to, relation) in snapshot.edge_labels() {
        println!("   {} -[{}]-> {}", from, relation, to);
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Static warehouse ===\n");
    let mut static_graph = StaticGraph::new();
    create_warehouse_graph(&mut static_graph)?;
    render(&static_graph.project()?);

    println!("=== Temporal warehouse ===\n");
    let start = Timestamp::now();
    let mut temporal = TemporalGraph::starting_at(start);
    create_warehouse_graph(&mut temporal)?;

    temporal.advance_clock(HALF_HOUR);
    temporal.update_node(
        "Robot1",
        Attributes::new().with("position", (5.0, 5.0)).with("battery", 0.8),
        None,
    )?;
    temporal.update_node("Shelf1", Attributes::new().with("inventory", 45), None)?;

    temporal.advance_clock(HALF_HOUR);
    temporal.update_node(
        "Robot2",
        Attributes::new().with("position", (15.0, 15.0)).with("battery", 0.7),
        None,
    )?;
    temporal.update_node("Shelf2", Attributes::new().with("inventory", 25), None)?;

    println!("Initial state:");
    render(&temporal.project(TimeWindow::at(start))?);

    println!("Whole timeline (latest version per entity):");
    render(&temporal.project(TimeWindow::all())?);

    println!("Robot1 history:");
    print!("{}", temporal.export_history("Robot1")?);

    let stats = temporal.stats();
    println!(
        "\n{} entities, {} versions, {} edges",
        stats.entity_count, stats.version_count, stats.edge_count
    );

    Ok(())
}
