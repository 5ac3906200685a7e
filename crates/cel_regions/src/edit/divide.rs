use cel_raster::{Grid, IVec2, Rgba};
use tracing::{debug, info_span};

use crate::algorithms::distance::assign_nearest;
use crate::algorithms::flood_fill::flood_fill;
use crate::error::{RegionError, Result, ensure_same_size};
use crate::frame::Frame;
use crate::types::RegionId;

const UNASSIGNED: u32 = u32::MAX;

/// Split each connected part of `mask` into its own mask, in scan order of
/// the part's first pixel. Returns the parts with their seeds.
fn split_components(mask: &Grid<bool>) -> Vec<(IVec2, Grid<bool>)> {
    let mut labels = Grid::like(mask, UNASSIGNED);
    let mut parts = Vec::new();
    for (p, set) in mask.enumerate() {
        if !*set || *labels.at(p.x, p.y) != UNASSIGNED {
            continue;
        }
        let label = parts.len() as u32;
        flood_fill(mask, p, &mut labels, label);
        parts.push((p, labels.map(|l| *l == label)));
    }
    parts
}

/// Label of a 4-neighbour of `p`, `preferred` if any neighbour carries it
fn touching_label(labels: &Grid<u32>, p: IVec2, preferred: u32) -> Option<u32> {
    let mut found = None;
    for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
        match labels.get(p.x + dx, p.y + dy) {
            Some(&label) if label == preferred => return Some(label),
            Some(&label) if label != UNASSIGNED => {
                found.get_or_insert(label);
            }
            _ => {}
        }
    }
    found
}

/// Cut a region along a scribble.
///
/// The scribbled pixels are taken out of the region and the rest falls
/// apart into candidate pieces. Every cut pixel goes to its nearest candidate
/// (Chebyshev distance), and the pieces are flood-filled again with their
/// cut pixels added back. A cut pixel cut off from its nearest candidate
/// joins a piece it touches instead. The union of the new regions is exactly
/// the old region. The original is removed; returns the ids of the new regions.
pub fn divide(frame: &mut Frame, id: RegionId, scribble: &Grid<Rgba>) -> Result<Vec<RegionId>> {
    let _span = info_span!("divide", view = %frame.view(), id).entered();
    ensure_same_size(frame.ids(), scribble)?;
    let region = frame.get(id)?;
    let color = region.color();
    let mask = region.mask();

    let cut: Vec<IVec2> = scribble
        .enumerate()
        .filter(|(p, px)| px.is_painted() && *mask.at(p.x, p.y))
        .map(|(p, _)| p)
        .collect();
    if cut.is_empty() {
        return Err(RegionError::ScribbleOutsideRegion(id));
    }

    let mut remainder = mask.clone();
    for p in &cut {
        remainder.set(p.x, p.y, false);
    }
    let candidates = split_components(&remainder);
    if candidates.is_empty() {
        return Err(RegionError::InvalidEditState(format!(
            "scribble covers all of region {id}"
        )));
    }
    let masks: Vec<Grid<bool>> = candidates.iter().map(|(_, m)| m.clone()).collect();
    let nearest = assign_nearest(&masks, &cut);

    // flood each candidate again through its own cut pixels; a candidate
    // already reached by an earlier one joins it
    let mut labels = Grid::like(&mask, UNASSIGNED);
    let mut label_of = Vec::with_capacity(candidates.len());
    let mut next_label = 0u32;
    for (index, (seed, _)) in candidates.iter().enumerate() {
        let existing = *labels.at(seed.x, seed.y);
        if existing != UNASSIGNED {
            label_of.push(existing);
            continue;
        }
        let mut allowed = remainder.clone();
        for (p, c) in cut.iter().zip(&nearest) {
            if *c == index {
                allowed.set(p.x, p.y, true);
            }
        }
        for (cell, label) in allowed.as_mut_slice().iter_mut().zip(labels.as_slice()) {
            if *label != UNASSIGNED {
                *cell = false;
            }
        }
        flood_fill(&allowed, *seed, &mut labels, next_label);
        label_of.push(next_label);
        next_label += 1;
    }

    // cut pixels the floods did not reach grow onto a touching piece, the
    // nearest candidate's when it touches; pieces stay 4-connected
    let mut pending: Vec<(IVec2, u32)> = cut
        .iter()
        .zip(&nearest)
        .filter(|(p, _)| *labels.at(p.x, p.y) == UNASSIGNED)
        .map(|(p, c)| (*p, label_of[*c]))
        .collect();
    loop {
        let before = pending.len();
        pending.retain(|(p, preferred)| match touching_label(&labels, *p, *preferred) {
            Some(label) => {
                labels.set(p.x, p.y, label);
                false
            }
            None => true,
        });
        if pending.len() == before {
            break;
        }
    }
    for (p, preferred) in pending {
        labels.set(p.x, p.y, preferred);
    }

    let pieces: Vec<Grid<bool>> = (0..next_label).map(|l| labels.map(|v| *v == l)).collect();
    let mut created = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        created.push(frame.insert_region(color, piece)?);
    }
    frame.remove_region(id)?;
    debug!(pieces = created.len(), cut = cut.len(), "divided region");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::types::View;
    use cel_raster::Rgb;

    fn frame_with_bar() -> Frame {
        let mut image = Grid::new(12, 8, Rgb::WHITE).expect("Should build grid");
        for y in 1..=6 {
            for x in 1..=10 {
                image.set(x, y, Rgb::new(0, 200, 0));
            }
        }
        let config = SessionConfig {
            absorb_line_art: false,
            ..SessionConfig::default()
        };
        Frame::segment(View::Front, image, &config).expect("Should segment")
    }

    fn vertical_cut(xs: &[i32]) -> Grid<Rgba> {
        let mut scribble = Grid::new(12, 8, Rgba::TRANSPARENT).expect("Should build grid");
        for &x in xs {
            for y in 0..8 {
                scribble.set(x, y, Rgba::new(0, 0, 0, 255));
            }
        }
        scribble
    }

    #[test]
    fn test_divide_conserves_mask() {
        let mut frame = frame_with_bar();
        let original = frame.get(0).expect("Should exist").mask();

        let created = divide(&mut frame, 0, &vertical_cut(&[5, 6])).expect("Should divide");
        assert_eq!(created, vec![1, 2]);
        assert!(frame.region(0).is_none());

        let left = frame.get(1).expect("Should exist");
        let right = frame.get(2).expect("Should exist");
        assert_eq!(left.area(), 5 * 6);
        assert_eq!(right.area(), 5 * 6);
        assert!(left.contains(IVec2::new(5, 3)));
        assert!(right.contains(IVec2::new(6, 3)));
        for (p, inside) in original.enumerate() {
            let count = [left, right].iter().filter(|r| r.contains(p)).count();
            assert_eq!(count, usize::from(*inside), "pixel {p}");
        }
    }

    #[test]
    fn test_divide_keeps_pieces_connected() {
        let mut image = Grid::new(6, 6, Rgb::WHITE).expect("Should build grid");
        for y in 1..=4 {
            for x in 1..=4 {
                image.set(x, y, Rgb::new(0, 200, 0));
            }
        }
        let config = SessionConfig {
            absorb_line_art: false,
            ..SessionConfig::default()
        };
        let mut frame = Frame::segment(View::Front, image, &config).expect("Should segment");
        let original = frame.get(0).expect("Should exist").mask();

        // a staircase that leaves single-pixel islands between its steps
        let mut scribble = Grid::new(6, 6, Rgba::TRANSPARENT).expect("Should build grid");
        for (x, y) in [(1, 2), (2, 1), (2, 3), (3, 2), (3, 4), (4, 3), (4, 4)] {
            scribble.set(x, y, Rgba::new(0, 0, 0, 255));
        }

        let created = divide(&mut frame, 0, &scribble).expect("Should divide");
        assert!(created.len() > 1);
        let mut total = 0;
        for id in &created {
            let mask = frame.get(*id).expect("Should exist").mask();
            assert_eq!(split_components(&mask).len(), 1, "region {id} is split");
            total += mask.count(|set| *set);
        }
        assert_eq!(total, original.count(|set| *set));
        for (p, inside) in original.enumerate() {
            let count = created
                .iter()
                .filter(|id| frame.get(**id).expect("Should exist").contains(p))
                .count();
            assert_eq!(count, usize::from(*inside), "pixel {p}");
        }
    }

    #[test]
    fn test_divide_outside_scribble_fails_cleanly() {
        let mut frame = frame_with_bar();
        let scribble = {
            let mut s = Grid::new(12, 8, Rgba::TRANSPARENT).expect("Should build grid");
            s.set(0, 0, Rgba::new(0, 0, 0, 255));
            s
        };
        assert!(matches!(
            divide(&mut frame, 0, &scribble),
            Err(RegionError::ScribbleOutsideRegion(0))
        ));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_divide_without_split_keeps_one_piece() {
        let mut frame = frame_with_bar();
        let mut scribble = Grid::new(12, 8, Rgba::TRANSPARENT).expect("Should build grid");
        scribble.set(3, 3, Rgba::new(0, 0, 0, 255));
        let created = divide(&mut frame, 0, &scribble).expect("Should divide");
        assert_eq!(created.len(), 1);
        assert_eq!(frame.get(created[0]).expect("Should exist").area(), 60);
    }
}
