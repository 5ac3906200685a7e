use std::collections::BTreeMap;

use cel_raster::{Grid, IVec2, Rgb};
use tracing::{debug, info, info_span, warn};

use crate::algorithms::distance::assign_nearest;
use crate::algorithms::flood_fill::{fill_holes, label_components};
use crate::config::{BACKGROUND_ID, SessionConfig};
use crate::error::{RegionError, Result, ensure_same_size};
use crate::region::Region;
use crate::types::{RegionId, View};

/// All regions of one view, with the view's source image and id map
#[derive(Debug, Clone)]
pub struct Frame {
    view: View,
    image: Grid<Rgb>,
    ids: Grid<RegionId>,
    regions: BTreeMap<RegionId, Region>,
    next_id: RegionId,
}

impl Frame {
    /// Segment `image` into flat-color regions.
    ///
    /// With `absorb_line_art`, pure black pixels are treated as ink: they are
    /// segmented as background, then handed to the nearest region and every
    /// region's holes are closed.
    pub fn segment(view: View, image: Grid<Rgb>, config: &SessionConfig) -> Result<Self> {
        let _span = info_span!("segment", view = %view).entered();
        let background = config.background_color;

        let line_art = if config.absorb_line_art {
            image.positions(|c| c.luma() == 0 && *c != background)
        } else {
            Vec::new()
        };
        let labeling = if line_art.is_empty() {
            label_components(&image, background)
        } else {
            let mut inkless = image.clone();
            for p in &line_art {
                inkless.set(p.x, p.y, background);
            }
            label_components(&inkless, background)
        };

        let mut regions = BTreeMap::new();
        for component in &labeling.components {
            let region = Region::from_ids(component.id, component.color, &labeling.ids)?;
            regions.insert(component.id, region);
        }

        let mut frame = Self {
            view,
            next_id: labeling.components.len() as RegionId,
            image,
            ids: labeling.ids,
            regions,
        };
        if !line_art.is_empty() {
            frame.absorb_line_art(&line_art)?;
        }

        info!(regions = frame.regions.len(), line_art = line_art.len(), "segmented frame");
        Ok(frame)
    }

    fn absorb_line_art(&mut self, pixels: &[IVec2]) -> Result<()> {
        if self.regions.is_empty() {
            warn!(pixels = pixels.len(), "no regions to absorb line art into");
            return Ok(());
        }
        let ids: Vec<RegionId> = self.regions.keys().copied().collect();
        let mut masks: Vec<Grid<bool>> = self.regions.values().map(Region::mask).collect();

        let assigned = assign_nearest(&masks, pixels);
        for (p, &index) in pixels.iter().zip(&assigned) {
            masks[index].set(p.x, p.y, true);
            self.ids.set(p.x, p.y, ids[index]);
        }

        for (id, mask) in ids.iter().zip(&masks) {
            if let Some(region) = self.regions.get_mut(id) {
                region.set_shape(&fill_holes(mask))?;
            }
        }
        self.refresh_id_map();
        debug!(pixels = pixels.len(), "absorbed line art");
        Ok(())
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Source color image
    pub fn image(&self) -> &Grid<Rgb> {
        &self.image
    }

    /// Region id per pixel, [`BACKGROUND_ID`] where no region covers it
    pub fn ids(&self) -> &Grid<RegionId> {
        &self.ids
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The id the next inserted region will get
    pub fn next_id(&self) -> RegionId {
        self.next_id
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Like [`Frame::region`], but a missing region is an error
    pub fn get(&self, id: RegionId) -> Result<&Region> {
        self.regions.get(&id).ok_or(RegionError::RegionNotFound { view: self.view, id })
    }

    pub(crate) fn get_mut(&mut self, id: RegionId) -> Result<&mut Region> {
        let view = self.view;
        self.regions.get_mut(&id).ok_or(RegionError::RegionNotFound { view, id })
    }

    /// Regions in id order
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.values()
    }

    pub(crate) fn regions_mut(&mut self) -> impl Iterator<Item = &mut Region> + '_ {
        self.regions.values_mut()
    }

    pub fn region_ids(&self) -> Vec<RegionId> {
        self.regions.keys().copied().collect()
    }

    /// Region under pixel `p`, if any
    pub fn region_at(&self, p: IVec2) -> Option<RegionId> {
        self.ids
            .get(p.x, p.y)
            .copied()
            .filter(|id| self.regions.contains_key(id))
    }

    /// Add a region covering `mask` under a fresh id
    pub fn insert_region(&mut self, color: Rgb, mask: &Grid<bool>) -> Result<RegionId> {
        ensure_same_size(&self.ids, mask)?;
        let id = self.next_id;
        let region = Region::from_mask(id, color, mask)?;
        self.regions.insert(id, region);
        self.next_id += 1;
        self.refresh_id_map();
        debug!(view = %self.view, id, "inserted region");
        Ok(id)
    }

    pub fn remove_region(&mut self, id: RegionId) -> Result<Region> {
        let region = self
            .regions
            .remove(&id)
            .ok_or(RegionError::RegionNotFound { view: self.view, id })?;
        self.refresh_id_map();
        debug!(view = %self.view, id, "removed region");
        Ok(region)
    }

    /// Rebuild the id map from the region masks.
    ///
    /// A pixel keeps its id while that region still covers it; otherwise it
    /// takes the lowest covering id, or [`BACKGROUND_ID`].
    pub fn refresh_id_map(&mut self) {
        let mut fresh = Grid::like(&self.ids, BACKGROUND_ID);
        for (id, region) in self.regions.iter().rev() {
            for (cell, px) in fresh.as_mut_slice().iter_mut().zip(region.map().as_slice()) {
                if px.is_painted() {
                    *cell = *id;
                }
            }
        }
        for (i, (cell, old)) in fresh
            .as_mut_slice()
            .iter_mut()
            .zip(self.ids.as_slice())
            .enumerate()
        {
            if *cell == *old {
                continue;
            }
            let still_covered = self
                .regions
                .get(old)
                .is_some_and(|r| r.map().as_slice()[i].is_painted());
            if still_covered {
                *cell = *old;
            }
        }
        self.ids = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn plain_config() -> SessionConfig {
        SessionConfig {
            absorb_line_art: false,
            ..SessionConfig::default()
        }
    }

    fn fill(image: &mut Grid<Rgb>, min: IVec2, max: IVec2, color: Rgb) {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                image.set(x, y, color);
            }
        }
    }

    #[test]
    fn test_single_pixel_scenario() {
        let mut image = Grid::new(10, 10, Rgb::WHITE).expect("Should build grid");
        image.set(5, 5, RED);
        let frame = Frame::segment(View::Front, image, &plain_config()).expect("Should segment");

        assert_eq!(frame.len(), 1);
        let region = frame.get(0).expect("Should have region 0");
        assert_eq!(region.color(), RED);
        assert_eq!(region.boundary(), &[IVec2::new(5, 5)]);
        assert_eq!(region.bbox().min, IVec2::new(5, 5));
        assert_eq!(region.bbox().max, IVec2::new(5, 5));
        assert_eq!(frame.region_at(IVec2::new(5, 5)), Some(0));
        assert_eq!(frame.region_at(IVec2::new(0, 0)), None);
    }

    #[test]
    fn test_segmentation_covers_every_colored_pixel_once() {
        let mut image = Grid::new(16, 12, Rgb::WHITE).expect("Should build grid");
        fill(&mut image, IVec2::new(1, 1), IVec2::new(6, 10), RED);
        fill(&mut image, IVec2::new(7, 1), IVec2::new(12, 4), BLUE);
        fill(&mut image, IVec2::new(14, 8), IVec2::new(15, 11), RED);
        let frame = Frame::segment(View::Front, image.clone(), &plain_config()).expect("Should segment");

        assert_eq!(frame.len(), 3);
        for (p, color) in image.enumerate() {
            let covering = frame.regions().filter(|r| r.contains(p)).count();
            if *color == Rgb::WHITE {
                assert_eq!(covering, 0);
                assert_eq!(*frame.ids().at(p.x, p.y), BACKGROUND_ID);
            } else {
                assert_eq!(covering, 1, "pixel {p}");
                let id = frame.region_at(p).expect("Should be labeled");
                assert_eq!(frame.get(id).expect("Should exist").color(), *color);
            }
        }
    }

    #[test]
    fn test_line_art_is_absorbed() {
        let mut image = Grid::new(12, 6, Rgb::WHITE).expect("Should build grid");
        fill(&mut image, IVec2::new(0, 0), IVec2::new(4, 5), RED);
        fill(&mut image, IVec2::new(5, 0), IVec2::new(5, 5), Rgb::BLACK);
        fill(&mut image, IVec2::new(6, 0), IVec2::new(11, 5), BLUE);

        let frame = Frame::segment(View::Front, image, &SessionConfig::default()).expect("Should segment");
        assert_eq!(frame.len(), 2);
        let total: usize = frame.regions().map(Region::area).sum();
        assert_eq!(total, 72);
        // the ink column is equidistant, so it goes to the first region
        assert_eq!(frame.region_at(IVec2::new(5, 3)), Some(0));
        assert_eq!(frame.ids().count(|id| *id == BACKGROUND_ID), 0);
    }

    #[test]
    fn test_insert_and_remove_keep_id_map_in_sync() {
        let mut image = Grid::new(8, 8, Rgb::WHITE).expect("Should build grid");
        fill(&mut image, IVec2::new(0, 0), IVec2::new(3, 3), RED);
        let mut frame = Frame::segment(View::Side, image, &plain_config()).expect("Should segment");

        let mut mask = Grid::new(8, 8, false).expect("Should build grid");
        mask.set(6, 6, true);
        let id = frame.insert_region(BLUE, &mask).expect("Should insert");
        assert_eq!(id, 1);
        assert_eq!(frame.region_at(IVec2::new(6, 6)), Some(1));

        frame.remove_region(0).expect("Should remove");
        assert_eq!(frame.region_at(IVec2::new(1, 1)), None);
        assert!(matches!(
            frame.remove_region(0),
            Err(RegionError::RegionNotFound { view: View::Side, id: 0 })
        ));
        // ids are never reused
        let again = frame.insert_region(RED, &mask).expect("Should insert");
        assert_eq!(again, 2);
        assert_eq!(frame.region_at(IVec2::new(6, 6)), Some(1));
    }

    #[test]
    fn test_insert_rejects_wrong_size() {
        let image = Grid::new(4, 4, RED).expect("Should build grid");
        let mut frame = Frame::segment(View::Front, image, &plain_config()).expect("Should segment");
        let mask = Grid::new(3, 3, true).expect("Should build grid");
        assert!(matches!(
            frame.insert_region(BLUE, &mask),
            Err(RegionError::DimensionMismatch { .. })
        ));
        assert_eq!(frame.len(), 1);
    }
}
