use std::sync::Arc;

use cel_raster::{Grid, IVec2, Rgb, Rgba};
use strum::EnumCount;
use tracing::{debug, info, info_span};

use crate::algorithms::depth::{Ray3, estimate_intersection};
use crate::algorithms::matching::ScoreMatrix;
use crate::config::{DEPTH_ITERATIONS, SessionConfig};
use crate::edit::{combine::combine, divide::divide, translate::translate};
use crate::error::{RegionError, Result, ensure_same_size};
use crate::frame::Frame;
use crate::interpolation::{InterpolatedOutline, interpolate_outline};
use crate::link::{LinkRecord, LinkTable};
use crate::region::Region;
use crate::traits::{RegionMatcher, SimilarityContext, SimilarityMetric};
use crate::types::{LinkId, RegionId, View, ViewRotation};

/// Both frames of a character, the link table between them, and the view
/// rotations.
///
/// Every operation runs to completion and leaves frames, id maps and links
/// consistent. An operation that returns an error has changed nothing.
pub struct Session {
    config: SessionConfig,
    front: Frame,
    side: Frame,
    links: LinkTable,
    rotations: [ViewRotation; View::COUNT],
    metric: Arc<dyn SimilarityMetric>,
    matcher: Arc<dyn RegionMatcher>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("front_regions", &self.front.len())
            .field("side_regions", &self.side.len())
            .field("links", &self.links.len())
            .field("rotations", &self.rotations)
            .field("metric", &self.metric.name())
            .finish()
    }
}

impl Session {
    /// Create a new session; every front region gets a link record
    pub fn new(
        config: SessionConfig,
        front: Frame,
        side: Frame,
        metric: Arc<dyn SimilarityMetric>,
        matcher: Arc<dyn RegionMatcher>,
    ) -> Result<Self> {
        if front.view() != View::Front || side.view() != View::Side {
            return Err(RegionError::InvalidEditState(format!(
                "frames must be front and side, got {} and {}",
                front.view(),
                side.view()
            )));
        }
        let mut links = LinkTable::new();
        for id in front.region_ids() {
            links.create(id);
        }
        let mut rotations = [ViewRotation::default(); View::COUNT];
        rotations[View::Front.index()] = config.front_rotation.clamped();
        rotations[View::Side.index()] = config.side_rotation.clamped();

        let mut session = Self {
            config,
            front,
            side,
            links,
            rotations,
            metric,
            matcher,
        };
        session.recompute_depths();
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn frame(&self, view: View) -> &Frame {
        match view {
            View::Front => &self.front,
            View::Side => &self.side,
        }
    }

    fn frame_mut(&mut self, view: View) -> &mut Frame {
        match view {
            View::Front => &mut self.front,
            View::Side => &mut self.side,
        }
    }

    pub fn region(&self, view: View, id: RegionId) -> Result<&Region> {
        self.frame(view).get(id)
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Link record holding a region, if any
    pub fn link_for(&self, view: View, id: RegionId) -> Option<&LinkRecord> {
        self.links.record_of(view, id)
    }

    /// Display color of a region's link, gray when unlinked
    pub fn link_color(&self, view: View, id: RegionId) -> Rgb {
        self.links.display_color(view, id)
    }

    pub fn rotation(&self, view: View) -> ViewRotation {
        self.rotations[view.index()]
    }

    /// Set a view's rotation (clamped) and recompute every depth
    pub fn set_rotation(&mut self, view: View, rotation: ViewRotation) {
        self.rotations[view.index()] = rotation.clamped();
        self.recompute_depths();
    }

    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }

    /// Replace all side links with a fresh mutual-best matching; returns the
    /// matched `(front, side)` pairs
    pub fn match_regions(&mut self) -> Result<Vec<(RegionId, RegionId)>> {
        let _span = info_span!("match_regions", metric = self.metric.name()).entered();
        let context = SimilarityContext {
            rotation_change: self.rotation(View::Front).delta(&self.rotation(View::Side)),
        };
        let pairs: Vec<(RegionId, RegionId)> = {
            let front: Vec<&Region> = self.front.regions().collect();
            let side: Vec<&Region> = self.side.regions().collect();
            let scores = ScoreMatrix::build(&front, &side, self.metric.as_ref(), &context);
            self.matcher
                .match_pairs(&scores)
                .into_iter()
                .map(|(i, j)| (front[i].id(), side[j].id()))
                .collect()
        };

        self.links.clear_all();
        for id in self.front.region_ids() {
            self.links.create(id);
        }
        for (main, side) in &pairs {
            self.links.link(*main, View::Side, *side)?;
        }
        for region in self.front.regions_mut().chain(self.side.regions_mut()) {
            region.reset_feature_points();
        }
        self.recompute_depths();
        info!(pairs = pairs.len(), "matched regions");
        Ok(pairs)
    }

    /// Link a front region with a side region, replacing earlier links of both
    pub fn link_regions(&mut self, main: RegionId, side: RegionId) -> Result<LinkId> {
        self.front.get(main)?;
        self.side.get(side)?;

        let mut affected = self.group_of(View::Front, main);
        affected.extend(self.group_of(View::Side, side));

        self.links.create(main);
        let link = self.links.link(main, View::Side, side)?;
        self.refresh(&affected);
        Ok(link)
    }

    /// Unlink the counterparts of a region
    pub fn clear_link(&mut self, view: View, id: RegionId) -> Result<()> {
        self.frame(view).get(id)?;
        let affected = self.group_of(view, id);
        let cleared = self.links.clear(view, id);
        debug!(%view, id, cleared = cleared.len(), "cleared link");
        self.refresh(&affected);
        Ok(())
    }

    /// Recompute the 3D position of every region
    pub fn recompute_depths(&mut self) {
        for id in self.front.region_ids() {
            self.update_depth(View::Front, id);
        }
        for id in self.side.region_ids() {
            if self.links.record_of(View::Side, id).is_none() {
                self.update_depth(View::Side, id);
            }
        }
    }

    /// Copy a region into the other view, linked to it. Fails if the region
    /// already has a counterpart there.
    pub fn create_matched_region(&mut self, view: View, id: RegionId) -> Result<RegionId> {
        let other = view.other();
        let region = self.frame(view).get(id)?;
        if self
            .links
            .record_of(view, id)
            .is_some_and(|record| record.get(other).is_some())
        {
            return Err(RegionError::InvalidEditState(format!(
                "region {id} already has a {other} counterpart"
            )));
        }
        ensure_same_size(self.frame(other).ids(), region.map())?;
        let (color, mask) = (region.color(), region.mask());

        let created = self.frame_mut(other).insert_region(color, &mask)?;
        let (main, side) = match view {
            View::Front => (id, created),
            View::Side => (created, id),
        };
        self.links.create(main);
        self.links.link(main, View::Side, side)?;
        let affected = self.group_of(View::Front, main);
        self.refresh(&affected);
        Ok(created)
    }

    /// Remove a region and its links; a front region takes its link record
    /// with it
    pub fn delete_region(&mut self, view: View, id: RegionId) -> Result<Region> {
        self.frame(view).get(id)?;
        let affected = self.group_of(view, id);
        self.links.forget(view, id);
        let region = self.frame_mut(view).remove_region(id)?;
        self.refresh(&affected);
        Ok(region)
    }

    /// Add a feature point to a linked region and a matching point, at the
    /// same share of the boundary, to each of its counterparts.
    /// Returns the point's position in the feature point list.
    pub fn add_feature_point(&mut self, view: View, id: RegionId, pixel: usize) -> Result<usize> {
        let others = self.feature_partners(view, id)?;
        let mut target = self.frame(view).get(id)?.clone();
        let position = target.add_feature_point(pixel)?;
        let ratio = pixel as f32 / target.boundary().len() as f32;

        let mut staged = vec![(view, target)];
        for (v, r) in others {
            let mut partner = self.frame(v).get(r)?.clone();
            partner.insert_feature_point_at_ratio(position, ratio)?;
            staged.push((v, partner));
        }
        self.commit(staged)?;
        Ok(position)
    }

    /// Move a feature point of a linked region; counterparts follow by
    /// boundary share
    pub fn set_feature_point(
        &mut self,
        view: View,
        id: RegionId,
        position: usize,
        pixel: usize,
    ) -> Result<()> {
        let others = self.feature_partners(view, id)?;
        let mut target = self.frame(view).get(id)?.clone();
        target.set_feature_point(position, pixel)?;
        let ratio = pixel as f32 / target.boundary().len() as f32;

        let mut staged = vec![(view, target)];
        for (v, r) in others {
            let mut partner = self.frame(v).get(r)?.clone();
            partner.move_feature_point_to_ratio(position, ratio)?;
            staged.push((v, partner));
        }
        self.commit(staged)
    }

    /// Remove a feature point from a linked region and its counterparts
    pub fn remove_feature_point(&mut self, view: View, id: RegionId, position: usize) -> Result<()> {
        let others = self.feature_partners(view, id)?;
        let mut staged = Vec::with_capacity(others.len() + 1);
        for (v, r) in std::iter::once((view, id)).chain(others) {
            let mut region = self.frame(v).get(r)?.clone();
            region.remove_feature_point(position)?;
            staged.push((v, region));
        }
        self.commit(staged)
    }

    /// Make boundary index `index` the start of a region's boundary. Feature
    /// points of the region and its counterparts are reset.
    pub fn set_boundary_start(&mut self, view: View, id: RegionId, index: usize) -> Result<()> {
        self.frame_mut(view).get_mut(id)?.set_boundary_start(index)?;
        let affected = self.group_of(view, id);
        self.refresh(&affected);
        Ok(())
    }

    /// Paint a scribble into a region (see [`Region::modify`])
    pub fn modify_region(&mut self, view: View, id: RegionId, scribble: &Grid<Rgba>) -> Result<()> {
        let _span = info_span!("modify", %view, id).entered();
        let frame = self.frame_mut(view);
        frame.get_mut(id)?.modify(scribble)?;
        frame.refresh_id_map();
        let affected = self.group_of(view, id);
        self.refresh(&affected);
        Ok(())
    }

    /// Close a region's interior holes; returns the number of pixels added
    pub fn fill_region_holes(&mut self, view: View, id: RegionId) -> Result<usize> {
        let frame = self.frame_mut(view);
        let added = frame.get_mut(id)?.fill_holes()?;
        if added > 0 {
            frame.refresh_id_map();
            let affected = self.group_of(view, id);
            self.refresh(&affected);
        }
        Ok(added)
    }

    /// Grow a region with a scribble, absorbing same-colored regions it
    /// touches; returns the ids of the absorbed regions
    pub fn combine_regions(
        &mut self,
        view: View,
        id: RegionId,
        scribble: &Grid<Rgba>,
    ) -> Result<Vec<RegionId>> {
        let mut affected = self.group_of(view, id);
        let absorbed = combine(self.frame_mut(view), id, scribble)?;
        for gone in &absorbed {
            affected.extend(self.group_of(view, *gone));
            self.links.forget(view, *gone);
        }
        self.refresh(&affected);
        Ok(absorbed)
    }

    /// Cut a region along a scribble; returns the ids of the new regions.
    /// New front regions get their own link records.
    pub fn divide_region(
        &mut self,
        view: View,
        id: RegionId,
        scribble: &Grid<Rgba>,
    ) -> Result<Vec<RegionId>> {
        let mut affected = self.group_of(view, id);
        let created = divide(self.frame_mut(view), id, scribble)?;
        self.links.forget(view, id);
        for new in &created {
            if view.is_main() {
                self.links.create(*new);
            }
            affected.push((view, *new));
        }
        self.refresh(&affected);
        Ok(created)
    }

    /// Move a region by `offset` pixels
    pub fn translate_region(&mut self, view: View, id: RegionId, offset: IVec2) -> Result<()> {
        translate(self.frame_mut(view), id, offset)?;
        let affected = self.group_of(view, id);
        self.refresh(&affected);
        Ok(())
    }

    /// Blend the outlines of a complete link for a view rotated by `rotation`
    pub fn interpolate_outline(&self, link: LinkId, rotation: &ViewRotation) -> Result<InterpolatedOutline> {
        let record = self.links.get(link)?;
        let (Some(front), Some(side)) = (record.get(View::Front), record.get(View::Side)) else {
            return Err(RegionError::NotEnoughLinkedViews {
                required: View::COUNT,
                linked: record.linked_count(),
            });
        };
        interpolate_outline(
            self.front.get(front)?,
            self.side.get(side)?,
            &self.rotation(View::Front),
            &self.rotation(View::Side),
            &rotation.clamped(),
        )
    }

    /// The region and its linked counterparts that still exist
    fn group_of(&self, view: View, id: RegionId) -> Vec<(View, RegionId)> {
        match self.links.record_of(view, id) {
            Some(record) => record.linked(),
            None => vec![(view, id)],
        }
    }

    /// Counterparts of a region for feature point edits; all of them must
    /// have the region's line count
    fn feature_partners(&self, view: View, id: RegionId) -> Result<Vec<(View, RegionId)>> {
        let region = self.frame(view).get(id)?;
        let group = self.group_of(view, id);
        if group.len() < 2 {
            return Err(RegionError::NotEnoughLinkedViews {
                required: 2,
                linked: group.len(),
            });
        }
        let others: Vec<(View, RegionId)> = group.into_iter().filter(|(v, _)| *v != view).collect();
        for (v, r) in &others {
            let lines = self.frame(*v).get(*r)?.lines().len();
            if lines != region.lines().len() {
                let (front, side) = if view.is_main() {
                    (region.lines().len(), lines)
                } else {
                    (lines, region.lines().len())
                };
                return Err(RegionError::MismatchedLines { front, side });
            }
        }
        Ok(others)
    }

    fn commit(&mut self, staged: Vec<(View, Region)>) -> Result<()> {
        for (view, region) in staged {
            let id = region.id();
            *self.frame_mut(view).get_mut(id)? = region;
        }
        Ok(())
    }

    /// Reset feature points and recompute depth for every listed region
    /// that still exists, together with its current counterparts
    fn refresh(&mut self, regions: &[(View, RegionId)]) {
        let mut groups: Vec<(View, RegionId)> = Vec::new();
        for (view, id) in regions {
            if self.frame(*view).region(*id).is_none() {
                continue;
            }
            for member in self.group_of(*view, *id) {
                if !groups.contains(&member) {
                    groups.push(member);
                }
            }
        }
        for (view, id) in &groups {
            if let Ok(region) = self.frame_mut(*view).get_mut(*id) {
                region.reset_feature_points();
            }
        }
        for (view, id) in groups {
            self.update_depth(view, id);
        }
    }

    fn ray_for(&self, view: View, id: RegionId) -> Option<Ray3> {
        let frame = self.frame(view);
        let region = frame.region(id)?;
        Some(Ray3::through_pixel(
            region.center(),
            frame.width(),
            frame.height(),
            &self.rotation(view),
        ))
    }

    /// Estimate one 3D point from the rays of a region's link group, then put
    /// each member on its own ray
    fn update_depth(&mut self, view: View, id: RegionId) {
        let members: Vec<(View, RegionId, Ray3)> = self
            .group_of(view, id)
            .into_iter()
            .filter_map(|(v, r)| self.ray_for(v, r).map(|ray| (v, r, ray)))
            .collect();
        if members.is_empty() {
            return;
        }
        let rays: Vec<Ray3> = members.iter().map(|(_, _, ray)| *ray).collect();
        let estimate = estimate_intersection(&rays, DEPTH_ITERATIONS);
        for (v, r, ray) in members {
            if let Ok(region) = self.frame_mut(v).get_mut(r) {
                region.set_pos3d(ray.closest_point(estimate));
            }
        }
    }
}
