use cel_raster::{Grid, IVec2};

/// Unreached cells of an empty mask
pub const UNREACHABLE: u32 = u32::MAX;

const FORWARD: [(i32, i32); 4] = [(-1, 0), (-1, -1), (0, -1), (1, -1)];
const BACKWARD: [(i32, i32); 4] = [(1, 0), (1, 1), (0, 1), (-1, 1)];

fn sweep(field: &mut Grid<u32>, x: i32, y: i32, neighbours: &[(i32, i32)]) {
    let mut best = *field.at(x, y);
    for (dx, dy) in neighbours {
        if let Some(d) = field.get(x + dx, y + dy) {
            best = best.min(d.saturating_add(1));
        }
    }
    field.set(x, y, best);
}

/// Chebyshev distance from every cell to the nearest set cell of `mask`.
///
/// Two raster sweeps over the 8-neighbourhood with unit steps, which is exact
/// for the chessboard norm. Every cell is [`UNREACHABLE`] when `mask` is empty.
pub fn chebyshev_distance(mask: &Grid<bool>) -> Grid<u32> {
    let mut field = mask.map(|set| if *set { 0 } else { UNREACHABLE });
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    for y in 0..h {
        for x in 0..w {
            sweep(&mut field, x, y, &FORWARD);
        }
    }
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            sweep(&mut field, x, y, &BACKWARD);
        }
    }
    field
}

/// For every pixel, the index of the candidate mask nearest to it.
///
/// Ties go to the lowest index. Returns an empty vector when there are no
/// candidates.
pub fn assign_nearest(candidates: &[Grid<bool>], pixels: &[IVec2]) -> Vec<usize> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let fields: Vec<Grid<u32>> = candidates.iter().map(chebyshev_distance).collect();

    pixels
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = UNREACHABLE;
            for (i, field) in fields.iter().enumerate() {
                let d = *field.at(p.x, p.y);
                if d < best_dist {
                    best = i;
                    best_dist = d;
                }
            }
            best
        })
        .collect()
}
