//! Walks one view handle through three update cycles.
//!
//! `RUST_LOG=trace cargo run -p ref_fanout` also shows the composer's diff
//! summaries.

use repose_ref::prelude::*;

type ViewId = u64;

fn logging_ref(name: &'static str) -> Slot<ViewId> {
    Slot::callback(move |id: Option<ViewId>| match id {
        Some(id) => log::info!("{name}: attached to view {id}"),
        None => log::info!("{name}: cleared"),
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let composer = create_ref_composer::<ViewId>();
    let parent = view_ref::<ViewId>();
    let focus = logging_ref("focus");
    let tooltip = logging_ref("tooltip");

    log::info!("cycle 1: [parent, focus]");
    let notifier = compose_refs!(composer, &parent, focus.clone())?;
    notifier.set(1)?;

    log::info!("cycle 2: [parent, tooltip]");
    compose_refs!(composer, &parent, tooltip.clone())?;

    log::info!("cycle 3: view remounted as 2");
    notifier.set(2)?;
    log::info!("parent ref now holds {:?}", parent.get());

    if let Err(e) = compose_refs!(composer, &parent) {
        log::warn!("dropping a slot is rejected: {e}");
    }

    log::info!("teardown");
    notifier.clear()?;
    Ok(())
}
