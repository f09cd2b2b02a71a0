//! Zoom-dependent scaling configuration for graph visuals.
//!
//! Node and link geometry lives in simulation space and scales with zoom. Line
//! widths and label fonts are specified in screen pixels and converted to
//! simulation units per frame.
//!
//! # Scaling Behaviors
//!
//! - [`ScaleBehavior::World`]: Scales with zoom.
//! - [`ScaleBehavior::Screen`]: Constant screen size. Divides by `k` to counteract
//!   the canvas transform.
//! - [`ScaleBehavior::Clamped`]: World-space scaling with min/max screen-size bounds.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom level `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Configuration for node visual scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Border width in screen pixels.
	pub border_width: f64,
	/// Label font size.
	pub label_size: f64,
	pub label_behavior: ScaleBehavior,
	/// Gap between the circle and its label, in world units.
	pub label_gap: f64,
}

/// Configuration for edge visual scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Stroke width in world units.
	pub line_width: f64,
	pub line_behavior: ScaleBehavior,
	/// Dash pattern (dash, gap) in world units.
	pub dash_pattern: (f64, f64),
	pub label_size: f64,
	pub label_behavior: ScaleBehavior,
}

/// Configuration for arrowheads.
#[derive(Clone, Debug)]
pub struct ArrowScaleConfig {
	/// Length of the arrowhead in world units. Matches the clearance left by
	/// the path geometry in front of the target.
	pub length: f64,
	/// Half-width relative to the length.
	pub spread: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub arrow: ArrowScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				border_width: 1.5,
				label_size: 12.0,
				label_behavior: ScaleBehavior::Clamped {
					min_screen: 8.0,
					max_screen: 24.0,
				},
				label_gap: 4.0,
			},
			edge: EdgeScaleConfig {
				line_width: 2.0,
				line_behavior: ScaleBehavior::Clamped {
					min_screen: 0.5,
					max_screen: 6.0,
				},
				dash_pattern: (6.0, 4.0),
				label_size: 10.0,
				label_behavior: ScaleBehavior::Screen,
			},
			arrow: ArrowScaleConfig {
				length: crate::geometry::ARROW_CLEARANCE,
				spread: 0.5,
			},
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub border_width: f64,
	/// Node label font (e.g., "12px sans-serif").
	pub node_font: String,
	pub label_gap: f64,
	pub edge_line_width: f64,
	pub dash_pattern: (f64, f64),
	pub edge_font: String,
	pub arrow_length: f64,
	pub arrow_half_width: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_font_size = config.node.label_behavior.apply(config.node.label_size, k);
		let edge_font_size = config.edge.label_behavior.apply(config.edge.label_size, k);
		Self {
			border_width: ScaleBehavior::Screen.apply(config.node.border_width, k),
			node_font: format!("{node_font_size}px sans-serif"),
			label_gap: config.node.label_gap,
			edge_line_width: config.edge.line_behavior.apply(config.edge.line_width, k),
			dash_pattern: config.edge.dash_pattern,
			edge_font: format!("{edge_font_size}px sans-serif"),
			arrow_length: config.arrow.length,
			arrow_half_width: config.arrow.length * config.arrow.spread,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_sizes_stay_within_screen_bounds() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 8.0,
			max_screen: 24.0,
		};
		assert_eq!(behavior.apply(12.0, 1.0), 12.0);
		// Zoomed far out the label would be 1.2px on screen; it stays at 8px.
		assert!((behavior.apply(12.0, 0.1) * 0.1 - 8.0).abs() < 1e-9);
		assert!((behavior.apply(12.0, 4.0) * 4.0 - 24.0).abs() < 1e-9);
	}

	#[test]
	fn screen_sizes_ignore_zoom() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 2.0);
		assert_eq!(scaled.border_width, 0.75);
		assert_eq!(scaled.edge_font, "5px sans-serif");
		assert_eq!(scaled.arrow_length, crate::geometry::ARROW_CLEARANCE);
	}
}
