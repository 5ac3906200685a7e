use cel_raster::{Grid, IVec2, Rgb};
use tracing::debug;

use crate::config::{BACKGROUND_ID, UNLABELED_ID};
use crate::types::RegionId;

/// Scanline stack flood fill.
///
/// Writes `label` into `labels` for every cell 4-connected to `seed` whose
/// `source` value equals the seed's and which does not already carry `label`.
/// Returns the number of cells written. `labels` must have the size of `source`.
pub fn flood_fill<T: PartialEq + Copy>(
    source: &Grid<T>,
    seed: IVec2,
    labels: &mut Grid<u32>,
    label: u32,
) -> usize {
    let Some(&target) = source.get(seed.x, seed.y) else {
        return 0;
    };
    let width = source.width() as i32;
    let fillable = |labels: &Grid<u32>, x: i32, y: i32| {
        source.get(x, y) == Some(&target) && labels.get(x, y).is_some_and(|l| *l != label)
    };

    let mut filled = 0;
    let mut stack = vec![seed];
    while let Some(p) = stack.pop() {
        if !fillable(labels, p.x, p.y) {
            continue;
        }

        let y = p.y;
        let mut x_left = p.x;
        while fillable(labels, x_left - 1, y) {
            x_left -= 1;
        }
        let mut x_right = p.x;
        while fillable(labels, x_right + 1, y) {
            x_right += 1;
        }
        for x in x_left..=x_right {
            labels.set(x, y, label);
        }
        filled += (x_right - x_left + 1) as usize;

        // push the right end of every matching run above and below
        for ny in [y - 1, y + 1] {
            for x in x_left..=x_right {
                if fillable(labels, x, ny) && (x + 1 >= width || !fillable(labels, x + 1, ny)) {
                    stack.push(IVec2::new(x, ny));
                }
            }
            if fillable(labels, x_right, ny) {
                stack.push(IVec2::new(x_right, ny));
            }
        }
    }
    filled
}

/// One connected flat-color component found by [`label_components`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: RegionId,
    pub color: Rgb,
    /// First pixel of the component in scan order
    pub seed: IVec2,
    pub area: usize,
}

/// Result of labeling a color raster
#[derive(Debug, Clone)]
pub struct Labeling {
    pub ids: Grid<RegionId>,
    pub components: Vec<Component>,
}

/// Label every 4-connected flat-color component of `image`.
///
/// Background-colored pixels get [`BACKGROUND_ID`]; every other component
/// gets the next id starting from 0, in scan order of its first pixel.
pub fn label_components(image: &Grid<Rgb>, background: Rgb) -> Labeling {
    let mut ids = Grid::like(image, UNLABELED_ID);
    let mut components = Vec::new();
    let mut next_id: RegionId = 0;

    for y in 0..image.height() as i32 {
        for x in 0..image.width() as i32 {
            if *ids.at(x, y) != UNLABELED_ID {
                continue;
            }
            let color = *image.at(x, y);
            let seed = IVec2::new(x, y);
            if color == background {
                flood_fill(image, seed, &mut ids, BACKGROUND_ID);
                continue;
            }
            let area = flood_fill(image, seed, &mut ids, next_id);
            components.push(Component {
                id: next_id,
                color,
                seed,
                area,
            });
            next_id += 1;
        }
    }

    debug!(
        width = image.width(),
        height = image.height(),
        components = components.len(),
        "labeled color components"
    );
    Labeling { ids, components }
}

/// The 4-connected component of `mask` containing `seed`
pub fn connected_component(mask: &Grid<bool>, seed: IVec2) -> Grid<bool> {
    let mut labels = Grid::like(mask, 0u32);
    if mask.get(seed.x, seed.y) == Some(&true) {
        flood_fill(mask, seed, &mut labels, 1);
    }
    labels.map(|l| *l == 1)
}

/// Close interior holes: every cell not reachable from outside the mask
/// through unset cells becomes set
pub fn fill_holes(mask: &Grid<bool>) -> Grid<bool> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let Ok(mut padded) = Grid::new(mask.width() + 2, mask.height() + 2, false) else {
        return mask.clone();
    };
    for y in 0..h {
        for x in 0..w {
            padded.set(x + 1, y + 1, *mask.at(x, y));
        }
    }

    let mut outside = Grid::like(&padded, 0u32);
    flood_fill(&padded, IVec2::ZERO, &mut outside, 1);

    let mut filled = mask.clone();
    for y in 0..h {
        for x in 0..w {
            if *outside.at(x + 1, y + 1) != 1 {
                filled.set(x, y, true);
            }
        }
    }
    filled
}
