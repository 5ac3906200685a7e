use cel_raster::{Grid, IVec2, Rgba, Vec2};
use tracing::{debug, info};

use super::EditMode;
use super::brush::ScribbleBrush;
use super::translate::offset_polygon;
use crate::error::{RegionError, Result};
use crate::session::Session;
use crate::types::{RegionId, View};

/// Where the editor is: picking a region, or editing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Select {
        selection: Option<(View, RegionId)>,
    },
    Active {
        view: View,
        region: RegionId,
        mode: EditMode,
    },
}

impl Default for EditorState {
    fn default() -> Self {
        Self::Select { selection: None }
    }
}

/// What a committed edit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Modified(RegionId),
    Combined {
        target: RegionId,
        absorbed: Vec<RegionId>,
    },
    Divided {
        original: RegionId,
        created: Vec<RegionId>,
    },
    Translated {
        id: RegionId,
        offset: IVec2,
    },
}

/// Drives one edit at a time against a [`Session`].
///
/// `select` picks a region, `begin` opens an edit in some [`EditMode`],
/// `paint`/`drag` collect input and `commit` applies it. A failed commit
/// keeps the edit open so the input can be fixed or cancelled.
#[derive(Debug, Clone)]
pub struct RegionEditor {
    state: EditorState,
    scribble: Option<Grid<Rgba>>,
    brush: ScribbleBrush,
    offset: IVec2,
}

impl RegionEditor {
    pub fn new(brush_radius: u32) -> Self {
        Self {
            state: EditorState::default(),
            scribble: None,
            brush: ScribbleBrush::new(brush_radius, Rgba::new(255, 0, 0, 255)),
            offset: IVec2::ZERO,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn mode(&self) -> Option<EditMode> {
        match self.state {
            EditorState::Active { mode, .. } => Some(mode),
            EditorState::Select { .. } => None,
        }
    }

    pub fn selection(&self) -> Option<(View, RegionId)> {
        match self.state {
            EditorState::Select { selection } => selection,
            EditorState::Active { view, region, .. } => Some((view, region)),
        }
    }

    /// Scribble layer of the open edit
    pub fn scribble(&self) -> Option<&Grid<Rgba>> {
        self.scribble.as_ref()
    }

    pub fn offset(&self) -> IVec2 {
        self.offset
    }

    pub fn brush_mut(&mut self) -> &mut ScribbleBrush {
        &mut self.brush
    }

    /// Select a region; only allowed while no edit is open
    pub fn select(&mut self, session: &Session, view: View, id: RegionId) -> Result<()> {
        if let EditorState::Active { mode, .. } = self.state {
            return Err(RegionError::InvalidEditState(format!(
                "cannot select while a {mode} edit is open"
            )));
        }
        session.region(view, id)?;
        self.state = EditorState::Select {
            selection: Some((view, id)),
        };
        Ok(())
    }

    pub fn deselect(&mut self) {
        if matches!(self.state, EditorState::Select { .. }) {
            self.state = EditorState::default();
        }
    }

    /// Open an edit on the selected region
    pub fn begin(&mut self, session: &Session, mode: EditMode) -> Result<()> {
        let (view, region) = match self.state {
            EditorState::Select {
                selection: Some(selection),
            } => selection,
            EditorState::Select { selection: None } => {
                return Err(RegionError::InvalidEditState("no region selected".to_string()));
            }
            EditorState::Active { mode, .. } => {
                return Err(RegionError::InvalidEditState(format!("a {mode} edit is already open")));
            }
        };
        session.region(view, region)?;

        let frame = session.frame(view);
        self.scribble = if mode.uses_scribble() {
            Some(Grid::new(frame.width(), frame.height(), Rgba::TRANSPARENT)?)
        } else {
            None
        };
        self.offset = IVec2::ZERO;
        self.brush.end_stroke();
        self.state = EditorState::Active { view, region, mode };
        debug!(%view, region, %mode, "edit started");
        Ok(())
    }

    /// Continue the brush stroke to `point` on the scribble layer
    pub fn paint(&mut self, point: Vec2) -> Result<()> {
        let Some(layer) = self.scribble.as_mut() else {
            return Err(RegionError::InvalidEditState(
                "painting needs an open scribble edit".to_string(),
            ));
        };
        self.brush.stroke_to(layer, point);
        Ok(())
    }

    pub fn end_stroke(&mut self) {
        self.brush.end_stroke();
    }

    /// Add `delta` to the pending translation
    pub fn drag(&mut self, delta: IVec2) -> Result<()> {
        match self.state {
            EditorState::Active {
                mode: EditMode::Translate,
                ..
            } => {
                self.offset += delta;
                Ok(())
            }
            _ => Err(RegionError::InvalidEditState(
                "dragging needs an open translate edit".to_string(),
            )),
        }
    }

    /// Outline of the region being edited, moved by the pending offset
    pub fn preview_polygon(&self, session: &Session) -> Result<Vec<IVec2>> {
        let EditorState::Active { view, region, .. } = self.state else {
            return Err(RegionError::InvalidEditState("no edit is open".to_string()));
        };
        Ok(offset_polygon(session.region(view, region)?.boundary(), self.offset))
    }

    /// Apply the open edit. On success the editor returns to selection.
    pub fn commit(&mut self, session: &mut Session) -> Result<EditOutcome> {
        let EditorState::Active { view, region, mode } = self.state else {
            return Err(RegionError::InvalidEditState("no edit is open".to_string()));
        };
        let outcome = match (mode, self.scribble.as_ref()) {
            (EditMode::Translate, _) => {
                session.translate_region(view, region, self.offset)?;
                EditOutcome::Translated {
                    id: region,
                    offset: self.offset,
                }
            }
            (EditMode::Freehand, Some(scribble)) => {
                session.modify_region(view, region, scribble)?;
                EditOutcome::Modified(region)
            }
            (EditMode::Combine, Some(scribble)) => {
                let absorbed = session.combine_regions(view, region, scribble)?;
                EditOutcome::Combined {
                    target: region,
                    absorbed,
                }
            }
            (EditMode::Divide, Some(scribble)) => {
                let created = session.divide_region(view, region, scribble)?;
                EditOutcome::Divided {
                    original: region,
                    created,
                }
            }
            (_, None) => {
                return Err(RegionError::InvalidEditState(format!(
                    "{mode} edit has no scribble layer"
                )));
            }
        };

        let selection = match &outcome {
            EditOutcome::Divided { .. } => None,
            _ => Some((view, region)),
        };
        self.finish(selection);
        info!(%view, region, %mode, "edit committed");
        Ok(outcome)
    }

    /// Drop the open edit and its input
    pub fn cancel(&mut self) {
        if let EditorState::Active { view, region, .. } = self.state {
            self.finish(Some((view, region)));
            debug!(%view, region, "edit cancelled");
        }
    }

    fn finish(&mut self, selection: Option<(View, RegionId)>) {
        self.scribble = None;
        self.offset = IVec2::ZERO;
        self.brush.end_stroke();
        self.state = EditorState::Select { selection };
    }
}
