use std::collections::{BTreeMap, HashMap};

use cel_raster::Rgb;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use tracing::debug;

use crate::config::LINK_PALETTE_SIZE;
use crate::error::{RegionError, Result};
use crate::types::{LinkId, RegionId, View};

/// Display color of regions without a link
pub const UNLINKED_COLOR: Rgb = Rgb::new(64, 64, 64);

/// Correspondence between one main-view region and its counterparts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    id: LinkId,
    slots: [Option<RegionId>; View::COUNT],
}

impl LinkRecord {
    fn new(id: LinkId, main: RegionId) -> Self {
        let mut slots = [None; View::COUNT];
        slots[View::Front.index()] = Some(main);
        Self { id, slots }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    /// The main-view region this record belongs to
    pub fn main(&self) -> Option<RegionId> {
        self.get(View::Front)
    }

    pub fn get(&self, view: View) -> Option<RegionId> {
        self.slots[view.index()]
    }

    /// `(view, region)` for every filled slot
    pub fn linked(&self) -> Vec<(View, RegionId)> {
        View::iter()
            .filter_map(|view| self.get(view).map(|id| (view, id)))
            .collect()
    }

    pub fn linked_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether every view has a region
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Stable display color
    pub fn color(&self) -> Rgb {
        palette_color(self.id)
    }
}

/// Palette entry for a link id; ids wrap around the palette
pub fn palette_color(id: LinkId) -> Rgb {
    let index = id % LINK_PALETTE_SIZE;
    // golden-angle hue steps keep neighbors apart
    let hue = (index as f32 * 137.507_77) % 360.0;
    let saturation = if index % 2 == 0 { 0.75 } else { 0.55 };
    let value = if (index / 2) % 2 == 0 { 0.95 } else { 0.8 };
    hsv_to_rgb(hue, saturation, value)
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let c = value * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

/// All link records, keyed by id, with a reverse index from regions.
///
/// This table is the only place that knows which regions are linked;
/// regions do not point back at their record.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    records: BTreeMap<LinkId, LinkRecord>,
    index: HashMap<(View, RegionId), LinkId>,
    next_id: LinkId,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: LinkId) -> Result<&LinkRecord> {
        self.records.get(&id).ok_or(RegionError::LinkNotFound(id))
    }

    pub fn records(&self) -> impl Iterator<Item = &LinkRecord> + '_ {
        self.records.values()
    }

    /// Record holding `(view, region)`, if any
    pub fn record_of(&self, view: View, region: RegionId) -> Option<&LinkRecord> {
        self.index
            .get(&(view, region))
            .and_then(|id| self.records.get(id))
    }

    /// Display color for a region: its link's palette color, or gray
    pub fn display_color(&self, view: View, region: RegionId) -> Rgb {
        self.record_of(view, region)
            .map(LinkRecord::color)
            .unwrap_or(UNLINKED_COLOR)
    }

    /// Create the record of a main-view region; returns the existing one if
    /// the region already has a record
    pub fn create(&mut self, main: RegionId) -> LinkId {
        if let Some(id) = self.index.get(&(View::Front, main)) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.records.insert(id, LinkRecord::new(id, main));
        self.index.insert((View::Front, main), id);
        id
    }

    /// Put `region` into `view`'s slot of the record of main region `main`.
    ///
    /// The slot's previous occupant is unlinked, and `region` leaves any
    /// other record it was in.
    pub fn link(&mut self, main: RegionId, view: View, region: RegionId) -> Result<LinkId> {
        if view.is_main() {
            return Err(RegionError::InvalidEditState(
                "the main slot of a link record is fixed".to_string(),
            ));
        }
        let id = *self
            .index
            .get(&(View::Front, main))
            .ok_or(RegionError::RegionNotFound { view: View::Front, id: main })?;

        if let Some(previous) = self.record_of(view, region).map(LinkRecord::id) {
            if previous != id {
                self.clear_slot(previous, view);
            }
        }
        self.clear_slot(id, view);

        if let Some(record) = self.records.get_mut(&id) {
            record.slots[view.index()] = Some(region);
        }
        self.index.insert((view, region), id);
        debug!(link = id, main, %view, region, "linked regions");
        Ok(id)
    }

    fn clear_slot(&mut self, id: LinkId, view: View) -> Option<RegionId> {
        let record = self.records.get_mut(&id)?;
        let old = record.slots[view.index()].take()?;
        self.index.remove(&(view, old));
        Some(old)
    }

    /// Empty the non-main slots of the record holding `(view, region)`;
    /// returns the regions that were unlinked
    pub fn clear(&mut self, view: View, region: RegionId) -> Vec<(View, RegionId)> {
        let Some(id) = self.index.get(&(view, region)).copied() else {
            return Vec::new();
        };
        View::iter()
            .filter(|v| !v.is_main())
            .filter_map(|v| self.clear_slot(id, v).map(|r| (v, r)))
            .collect()
    }

    /// Drop every reference to a region that no longer exists. For a
    /// main-view region the whole record goes; returns the regions that
    /// lost their link.
    pub fn forget(&mut self, view: View, region: RegionId) -> Vec<(View, RegionId)> {
        let Some(id) = self.index.get(&(view, region)).copied() else {
            return Vec::new();
        };
        if !view.is_main() {
            self.clear_slot(id, view);
            return Vec::new();
        }
        let Some(record) = self.records.remove(&id) else {
            return Vec::new();
        };
        let mut orphaned = Vec::new();
        for (v, r) in record.linked() {
            self.index.remove(&(v, r));
            if !v.is_main() {
                orphaned.push((v, r));
            }
        }
        debug!(link = id, region, "removed link record");
        orphaned
    }

    /// Empty every non-main slot
    pub fn clear_all(&mut self) {
        let ids: Vec<LinkId> = self.records.keys().copied().collect();
        for id in ids {
            for view in View::iter().filter(|v| !v.is_main()) {
                self.clear_slot(id, view);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_idempotent() {
        let mut links = LinkTable::new();
        let a = links.create(3);
        assert_eq!(links.create(3), a);
        assert_ne!(links.create(4), a);
        assert_eq!(links.len(), 2);
        assert_eq!(links.get(a).expect("Should exist").main(), Some(3));
    }

    #[test]
    fn test_link_moves_side_region_between_records() {
        let mut links = LinkTable::new();
        let a = links.create(0);
        let b = links.create(1);

        links.link(0, View::Side, 10).expect("Should link");
        assert_eq!(links.record_of(View::Side, 10).map(LinkRecord::id), Some(a));

        // linking the same side region elsewhere removes it from `a`
        links.link(1, View::Side, 10).expect("Should link");
        assert_eq!(links.get(a).expect("Should exist").get(View::Side), None);
        assert_eq!(links.record_of(View::Side, 10).map(LinkRecord::id), Some(b));

        // replacing the occupant of `b` unlinks the old one
        links.link(1, View::Side, 11).expect("Should link");
        assert!(links.record_of(View::Side, 10).is_none());
        assert!(links.get(b).expect("Should exist").is_complete());
    }

    #[test]
    fn test_link_requires_main_record() {
        let mut links = LinkTable::new();
        assert!(matches!(
            links.link(5, View::Side, 1),
            Err(RegionError::RegionNotFound { view: View::Front, id: 5 })
        ));
        assert!(links.link(5, View::Front, 1).is_err());
    }

    #[test]
    fn test_clear_and_forget() {
        let mut links = LinkTable::new();
        let a = links.create(0);
        links.link(0, View::Side, 7).expect("Should link");

        assert_eq!(links.clear(View::Side, 7), vec![(View::Side, 7)]);
        assert_eq!(links.get(a).expect("Should exist").linked_count(), 1);

        links.link(0, View::Side, 8).expect("Should link");
        assert_eq!(links.forget(View::Front, 0), vec![(View::Side, 8)]);
        assert!(links.is_empty());
        assert!(links.record_of(View::Side, 8).is_none());
    }

    #[test]
    fn test_display_colors() {
        let mut links = LinkTable::new();
        let a = links.create(0);
        assert_eq!(links.display_color(View::Side, 0), UNLINKED_COLOR);
        assert_eq!(links.display_color(View::Front, 0), palette_color(a));
        assert_eq!(palette_color(3), palette_color(3 + LINK_PALETTE_SIZE));
        assert_ne!(palette_color(0), palette_color(1));
    }
}
