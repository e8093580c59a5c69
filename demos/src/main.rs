// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless platform dashboard: drag a card, survive a host re-render, reload.
//!
//! This demo shows how to combine:
//! - `MemoryDom` standing in for a reactive framework's rendered card grid,
//! - `ReorderEngine` handling the drag gesture and persisting the order,
//! - an `OrderObserver` playing the framework callback that hears about commits.
//!
//! Run:
//! - `cargo run -p understory_demos --bin dashboard_reorder`
//! - `RUST_LOG=understory_reorder=trace cargo run -p understory_demos --bin dashboard_reorder`

use kurbo::Point;
use tracing::info;
use tracing_subscriber::EnvFilter;
use understory_reorder::{
    Dom, DragEvent, DragEventKind, DragResponse, MemoryDom, MemoryStore, NodeHandle, OrderChange,
    ReorderConfig, ReorderEngine, TriggerConfig, item_ids,
};

const PLATFORMS: [&str; 4] = ["edlap", "sapbw", "tableau", "alteryx"];

fn render_dashboard(dom: &mut MemoryDom, container: NodeHandle, attr: &str) {
    // The framework knows nothing about user order; it always renders server order.
    for (card, id) in dom.render_items(container, attr, &PLATFORMS).into_iter().zip(PLATFORMS) {
        dom.create_child(card, &format!("platform-logo {id}"));
    }
}

fn card(dom: &MemoryDom, container: NodeHandle, attr: &str, id: &str) -> Option<NodeHandle> {
    dom.children(container)
        .into_iter()
        .find(|&n| dom.attribute(n, attr).as_deref() == Some(id))
}

fn show(label: &str, dom: &MemoryDom, container: NodeHandle, attr: &str) {
    let order: Vec<String> = item_ids(dom, container, attr)
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    println!("{label:>16}: {}", order.join(" | "));
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ReorderConfig::default().with_trigger(TriggerConfig::new("#card-order-sync"));
    let attr = config.id_attribute.clone();

    let mut dom = MemoryDom::new();
    let container = dom.create_root("platform-cards");
    let trigger = dom.create_root("card-order-sync");
    render_dashboard(&mut dom, container, &attr);

    let mut engine = ReorderEngine::new(config.clone(), MemoryStore::new());
    engine.subscribe(|change: &OrderChange| {
        println!("{:>16}: {} = {}", "observer", change.key, change.new_value);
    });
    let status = engine.try_mount(&mut dom);
    info!(?status, "dashboard mounted");
    show("initial", &dom, container, &attr);

    // Drag Alteryx onto the left half of SAP B/W.
    let listener = dom.listeners_for(container)[0];
    let (Some(alteryx), Some(sapbw)) = (
        card(&dom, container, &attr, "alteryx"),
        card(&dom, container, &attr, "sapbw"),
    ) else {
        eprintln!("dashboard did not render its cards");
        return;
    };
    // Grab the logo inside the card; the engine resolves the wrapper.
    let grip = dom.children(alteryx)[0];
    let left_of_sapbw = Point::new(dom.bounds(sapbw).x0 + 10.0, 50.0);
    for (kind, origin) in [
        (DragEventKind::Start, grip),
        (DragEventKind::Over, sapbw),
        (DragEventKind::Drop, sapbw),
        (DragEventKind::End, grip),
    ] {
        let event = DragEvent::new(kind, listener, origin, left_of_sapbw);
        match engine.handle(&mut dom, event) {
            Ok(DragResponse::Committed(change)) => {
                println!("{:>16}: {}", "committed", change.new_value);
            }
            Ok(response) => println!("{:>16}: {response:?}", format!("{kind:?}")),
            Err(err) => eprintln!("store failed: {err}"),
        }
    }
    show("after drop", &dom, container, &attr);
    println!(
        "{:>16}: {:?} (clicked {}x)",
        "trigger",
        dom.attribute(trigger, "data-order"),
        dom.clicks(trigger)
    );

    // The engine's own reorder is reported back first.
    println!("mutation: {:?}", engine.on_mutation(&mut dom));

    // A periodic refresh re-renders the grid in server order.
    render_dashboard(&mut dom, container, &attr);
    show("host re-render", &dom, container, &attr);
    println!("mutation: {:?}", engine.on_mutation(&mut dom));
    show("reconciled", &dom, container, &attr);
    println!("mutation: {:?}", engine.on_mutation(&mut dom));

    // A reload: fresh document, fresh engine, same store.
    let store = engine.bridge().store().clone();
    let mut reloaded = MemoryDom::new();
    let container = reloaded.create_root("platform-cards");
    render_dashboard(&mut reloaded, container, &attr);
    let mut engine = ReorderEngine::new(config, store);
    let status = engine.try_mount(&mut reloaded);
    info!(?status, "dashboard remounted after reload");
    show("after reload", &reloaded, container, &attr);
}
