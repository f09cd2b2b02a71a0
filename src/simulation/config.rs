//! Tunable simulation parameters.
//!
//! Field names deserialize in camelCase so a dataset can embed a `config`
//! object using the same option names as the engine surface, e.g.
//! `{ "linkDistance": 200, "chargeStrength": -30 }`. Every field has a default.

use serde::Deserialize;

use super::error::ConstructionError;

/// Link distance multiplier applied to the endpoints' combined radii when no
/// explicit `linkDistance` is configured.
pub const LINK_DISTANCE_RADIUS_FACTOR: f64 = 1.5;

/// Centring target used when none is configured, the middle of a 1000x600 view.
pub const DEFAULT_CENTER: (f64, f64) = (500.0, 300.0);

/// Rest length of a link: `distance` if given, otherwise derived from the radii.
pub(crate) fn link_distance(distance: Option<f64>, source_radius: f64, target_radius: f64) -> f64 {
	distance.unwrap_or(LINK_DISTANCE_RADIUS_FACTOR * (source_radius + target_radius))
}

/// Parameters of the force registry and the solver.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
	/// Target separation of linked nodes. `None` derives it from the radii.
	pub link_distance: Option<f64>,
	/// Relaxation passes of the link force per tick.
	pub link_iterations: usize,

	/// Charge per node. Negative values repel.
	pub charge_strength: f64,
	/// Barnes-Hut accuracy parameter. Smaller is more exact.
	pub theta: f64,
	/// Pairs closer than this are treated as being this far apart.
	pub charge_distance_min: f64,
	/// Pairs farther than this do not interact.
	pub charge_distance_max: f64,
	/// Node count from which the many-body force switches to the quad-tree.
	pub barnes_hut_threshold: usize,

	/// Extra spacing added to every node radius by the collision force.
	pub collision_padding: f64,
	pub collision_strength: f64,
	/// Relaxation passes of the collision force per tick.
	pub collision_iterations: usize,

	/// Centring target. Missing coordinates fall back to [`DEFAULT_CENTER`]
	/// unless filled in with [`with_default_center`](Self::with_default_center).
	pub center_x: Option<f64>,
	pub center_y: Option<f64>,
	/// Fraction of the centroid offset removed per tick.
	pub center_strength: f64,

	/// The simulation converges once alpha drops below this.
	pub alpha_min: f64,
	/// Fraction of the distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// Resting alpha target while nobody drags.
	pub alpha_target: f64,
	/// Friction: the fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha target while at least one node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: None,
			link_iterations: 1,
			charge_strength: -30.0,
			theta: 0.9,
			charge_distance_min: 1.0,
			charge_distance_max: f64::INFINITY,
			barnes_hut_threshold: 300,
			collision_padding: 5.0,
			collision_strength: 1.0,
			collision_iterations: 2,
			center_x: None,
			center_y: None,
			center_strength: 0.1,
			alpha_min,
			// Reaches alpha_min after ~300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
		}
	}
}

impl SimulationConfig {
	/// Returns the config with its centring target moved to `(x, y)`.
	pub fn centered_at(mut self, x: f64, y: f64) -> Self {
		self.center_x = Some(x);
		self.center_y = Some(y);
		self
	}

	/// Fills in whichever centre coordinates were not configured.
	pub fn with_default_center(mut self, x: f64, y: f64) -> Self {
		self.center_x.get_or_insert(x);
		self.center_y.get_or_insert(y);
		self
	}

	/// The centring target.
	pub fn center(&self) -> (f64, f64) {
		(
			self.center_x.unwrap_or(DEFAULT_CENTER.0),
			self.center_y.unwrap_or(DEFAULT_CENTER.1),
		)
	}

	/// Target distance for a link between nodes of the given radii.
	pub fn link_distance_for(&self, source_radius: f64, target_radius: f64) -> f64 {
		link_distance(self.link_distance, source_radius, target_radius)
	}

	/// Checks every parameter range. Called when a simulation is constructed.
	pub fn validate(&self) -> Result<(), ConstructionError> {
		fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConstructionError> {
			if ok {
				Ok(())
			} else {
				Err(ConstructionError::InvalidConfig { field, reason })
			}
		}

		if let Some(distance) = self.link_distance {
			check(distance.is_finite() && distance > 0.0, "linkDistance", "must be positive")?;
		}
		check(self.link_iterations >= 1, "linkIterations", "must be at least 1")?;
		check(self.charge_strength.is_finite(), "chargeStrength", "must be finite")?;
		check(self.theta > 0.0, "theta", "must be positive")?;
		check(
			self.charge_distance_min >= 0.0 && self.charge_distance_min < self.charge_distance_max,
			"chargeDistanceMin",
			"must be non-negative and below chargeDistanceMax",
		)?;
		check(
			self.collision_padding >= 0.0,
			"collisionPadding",
			"must be non-negative",
		)?;
		check(
			(0.0..=1.0).contains(&self.collision_strength),
			"collisionStrength",
			"must be within [0, 1]",
		)?;
		check(
			self.collision_iterations >= 1,
			"collisionIterations",
			"must be at least 1",
		)?;
		check(
			self.center().0.is_finite() && self.center().1.is_finite(),
			"centerX",
			"centre must be finite",
		)?;
		check(
			(0.0..=1.0).contains(&self.center_strength),
			"centerStrength",
			"must be within [0, 1]",
		)?;
		check(
			self.alpha_min > 0.0 && self.alpha_min < 1.0,
			"alphaMin",
			"must be within (0, 1)",
		)?;
		check(
			self.alpha_decay > 0.0 && self.alpha_decay <= 1.0,
			"alphaDecay",
			"must be within (0, 1]",
		)?;
		check(
			(0.0..=1.0).contains(&self.alpha_target),
			"alphaTarget",
			"must be within [0, 1]",
		)?;
		check(
			self.velocity_decay > 0.0 && self.velocity_decay < 1.0,
			"velocityDecay",
			"must be within (0, 1)",
		)?;
		check(
			(0.0..=1.0).contains(&self.drag_alpha_target),
			"dragAlphaTarget",
			"must be within [0, 1]",
		)
	}
}
