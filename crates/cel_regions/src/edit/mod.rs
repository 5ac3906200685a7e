//! Region editing: the operators and the editor state machine driving them.

pub mod brush;
pub mod combine;
pub mod divide;
pub mod editor;
pub mod translate;

pub use brush::ScribbleBrush;
pub use editor::{EditOutcome, EditorState, RegionEditor};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EditMode {
    /// Paint over the region to grow it
    Freehand,
    /// Merge same-colored regions touched by a scribble
    Combine,
    /// Cut the region along a scribble
    Divide,
    /// Move the region's outline
    Translate,
}

impl EditMode {
    /// Get the JSON schema for all modes
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EditMode)
    }

    /// Get a list of all mode names
    pub fn mode_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Freehand => "Paint over the region; pixels cut off from it are dropped and holes are closed",
            Self::Combine => "Grow the region with a scribble and absorb same-colored regions it touches",
            Self::Divide => "Split the region along a scribble into separate regions",
            Self::Translate => "Drag the region outline and fill it back in at the new place",
        }
    }

    /// Whether the mode is driven by a scribble layer
    pub fn uses_scribble(&self) -> bool {
        !matches!(self, Self::Translate)
    }
}
