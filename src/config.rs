// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram-level configuration.
//!
//! Every option has a default, so a config can be built with struct-update syntax or loaded from
//! a (possibly partial) JSON document. Construction of a [`crate::Diagram`] validates the config;
//! an invalid config never reaches the layout engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::NodeId;

pub const DEFAULT_WRAP_WIDTH: usize = 10;
pub const DEFAULT_HORIZONTAL_SPACING: usize = 4;
pub const DEFAULT_VERTICAL_SPACING: usize = 2;
pub const DEFAULT_MAX_EXPANSION_ITERATIONS: usize = 8;

/// Border plus one column of horizontal padding on each side of a box.
pub const BOX_HORIZONTAL_CHROME: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramConfig {
    /// Maximum box content width in characters. Longer lines are hard-wrapped.
    pub wrap_width: usize,
    /// When `false`, connectors are rerouted and the grid is respaced until no connector crosses
    /// a foreign box or another connector.
    pub allow_intersections: bool,
    /// Upper bound on the rendered width in characters. Wide sibling rows are folded.
    pub max_layout_width: Option<usize>,
    /// Characters between adjacent grid columns.
    pub horizontal_spacing: usize,
    /// Characters between adjacent grid rows.
    pub vertical_spacing: usize,
    pub max_expansion_iterations: usize,
    pub box_style: BoxStyle,
    /// Opaque markup tag wrapped around connector glyphs when markup output is requested.
    pub connector_style: Option<String>,
    /// Opaque markup tag wrapped around box glyphs when markup output is requested.
    pub node_style: Option<String>,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            allow_intersections: false,
            max_layout_width: None,
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
            max_expansion_iterations: DEFAULT_MAX_EXPANSION_ITERATIONS,
            box_style: BoxStyle::default(),
            connector_style: None,
            node_style: None,
        }
    }
}

impl DiagramConfig {
    /// Parses a JSON config. Missing fields take their defaults; the result is validated.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wrap_width == 0 {
            return Err(ConfigError::ZeroWrapWidth);
        }
        if self.horizontal_spacing == 0 {
            return Err(ConfigError::ZeroSpacing { axis: SpacingAxis::Horizontal });
        }
        if self.vertical_spacing == 0 {
            return Err(ConfigError::ZeroSpacing { axis: SpacingAxis::Vertical });
        }
        if let Some(max_layout_width) = self.max_layout_width {
            let min = self.max_box_width();
            if max_layout_width < min {
                return Err(ConfigError::LayoutWidthTooSmall { max_layout_width, min });
            }
        }
        Ok(())
    }

    /// Widest box the formatter can produce.
    pub fn max_box_width(&self) -> usize {
        self.wrap_width.saturating_add(BOX_HORIZONTAL_CHROME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpacingAxis {
    Horizontal,
    Vertical,
}

impl fmt::Display for SpacingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("wrap_width must be at least 1 character")]
    ZeroWrapWidth,
    #[error("{axis} spacing must be at least 1 character")]
    ZeroSpacing { axis: SpacingAxis },
    #[error("max_layout_width {max_layout_width} is narrower than one box ({min} characters)")]
    LayoutWidthTooSmall { max_layout_width: usize, min: usize },
    #[error("a grid layout needs at least one row")]
    EmptyGrid,
    #[error("grid row {row} is empty")]
    EmptyGridRow { row: usize },
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid { row: usize, expected: usize, found: usize },
    #[error("grid cell holds {node}, which is not part of this diagram")]
    ForeignGridNode { node: NodeId },
    #[error("{node} appears in the grid more than once")]
    DuplicateGridNode { node: NodeId },
    #[error("unknown box style: {0}")]
    UnknownBoxStyle(String),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Glyph family used for box borders and connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxStyle {
    #[default]
    Rounded,
    Square,
    Ascii,
}

impl FromStr for BoxStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rounded" | "round" | "modern" => Ok(Self::Rounded),
            "square" | "line" | "box" => Ok(Self::Square),
            "ascii" | "plain" => Ok(Self::Ascii),
            _ => Err(ConfigError::UnknownBoxStyle(s.to_owned())),
        }
    }
}
