use cel_raster::{Grid, Rgba};
use tracing::{debug, info_span};

use crate::error::{Result, ensure_same_size};
use crate::frame::Frame;
use crate::types::RegionId;

/// Grow `target` by a scribble, pulling in every other region of the same
/// color the scribble touches.
///
/// A touched region is deleted once the grown target covers its first
/// boundary pixel. Returns the ids of the deleted regions.
pub fn combine(frame: &mut Frame, target: RegionId, scribble: &Grid<Rgba>) -> Result<Vec<RegionId>> {
    let _span = info_span!("combine", view = %frame.view(), target).entered();
    ensure_same_size(frame.ids(), scribble)?;
    let region = frame.get(target)?;
    let color = region.color();

    let touched: Vec<RegionId> = frame
        .regions()
        .filter(|r| r.id() != target && r.color() == color)
        .filter(|r| {
            scribble
                .enumerate()
                .any(|(p, px)| px.is_painted() && r.contains(p))
        })
        .map(|r| r.id())
        .collect();

    let mut merged = scribble.clone();
    let fill = color.opaque();
    for id in &touched {
        let other = frame.get(*id)?;
        for (cell, px) in merged.as_mut_slice().iter_mut().zip(other.map().as_slice()) {
            if px.is_painted() {
                *cell = fill;
            }
        }
    }

    let mut grown = region.clone();
    grown.modify(&merged)?;
    let absorbed: Vec<RegionId> = touched
        .into_iter()
        .filter(|id| {
            frame
                .region(*id)
                .and_then(|r| r.boundary().first().copied())
                .is_some_and(|p| grown.contains(p))
        })
        .collect();

    *frame.get_mut(target)? = grown;
    for id in &absorbed {
        frame.remove_region(*id)?;
    }
    frame.refresh_id_map();
    debug!(absorbed = absorbed.len(), "combined regions");
    Ok(absorbed)
}
