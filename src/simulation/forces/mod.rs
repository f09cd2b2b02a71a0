//! Composable forces. Each force adds to node velocities in place, scaled by
//! the current alpha, and is applied in registration order every tick.

mod center;
mod collide;
mod link;
mod many_body;

pub use center::Center;
pub use collide::Collide;
pub use link::LinkForce;
pub use many_body::ManyBody;

use super::config::SimulationConfig;
use super::graph::{Link, Node};

/// Deterministic linear congruential generator, used to separate coincident
/// nodes. A fixed seed keeps layouts reproducible.
#[derive(Clone, Debug)]
pub struct Lcg(u32);

impl Default for Lcg {
	fn default() -> Self {
		Self(1)
	}
}

impl Lcg {
	/// Next value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		f64::from(self.0) / 4_294_967_296.0
	}

	/// A tiny non-zero offset.
	pub fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}

/// Per-tick state shared by all forces.
pub struct TickContext<'a> {
	pub alpha: f64,
	pub random: &'a mut Lcg,
	/// Number of pair contributions dropped because they were not finite.
	pub skipped: usize,
}

impl TickContext<'_> {
	/// Replaces a zero offset by a jiggle so that directions stay defined.
	pub fn nonzero(&mut self, d: f64) -> f64 {
		if d == 0.0 { self.random.jiggle() } else { d }
	}

	/// Accepts a velocity contribution, or counts and drops it when it is not finite.
	pub fn accept(&mut self, dvx: f64, dvy: f64) -> bool {
		if dvx.is_finite() && dvy.is_finite() {
			true
		} else {
			self.skipped += 1;
			false
		}
	}
}

/// A force acting on the node set.
pub trait Force {
	/// Called once, before the first tick, with the resolved graph.
	fn initialize(&mut self, _nodes: &[Node], _links: &[Link]) {}

	/// Adds this force's contribution to the velocity of `nodes`.
	fn apply(&mut self, nodes: &mut [Node], ctx: &mut TickContext<'_>);
}

/// Ordered, named collection of forces.
#[derive(Default)]
pub struct ForceRegistry {
	forces: Vec<(String, Box<dyn Force>)>,
}

impl ForceRegistry {
	/// The link, charge, collision and center forces, in that order.
	pub fn standard(config: &SimulationConfig) -> Self {
		let mut registry = Self::default();
		let (cx, cy) = config.center();
		registry.add(
			"link",
			LinkForce::new(config.link_distance, config.link_iterations),
		);
		registry.add(
			"charge",
			ManyBody::new(config.charge_strength)
				.theta(config.theta)
				.distance_range(config.charge_distance_min, config.charge_distance_max)
				.approximate_from(config.barnes_hut_threshold),
		);
		registry.add(
			"collision",
			Collide::new(config.collision_padding)
				.strength(config.collision_strength)
				.iterations(config.collision_iterations),
		);
		registry.add(
			"center",
			Center::new(cx, cy).strength(config.center_strength),
		);
		registry
	}

	/// Adds a force, replacing one with the same name in place.
	pub fn add(&mut self, name: impl Into<String>, force: impl Force + 'static) {
		let name = name.into();
		let force: Box<dyn Force> = Box::new(force);
		match self.forces.iter_mut().find(|(n, _)| *n == name) {
			Some(slot) => slot.1 = force,
			None => self.forces.push((name, force)),
		}
	}

	pub fn remove(&mut self, name: &str) -> Option<Box<dyn Force>> {
		let pos = self.forces.iter().position(|(n, _)| n == name)?;
		Some(self.forces.remove(pos).1)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.forces.iter().map(|(n, _)| n.as_str())
	}

	pub fn initialize(&mut self, nodes: &[Node], links: &[Link]) {
		for (_, force) in &mut self.forces {
			force.initialize(nodes, links);
		}
	}

	/// Runs every force. All contributions are accumulated before returning.
	pub fn apply(&mut self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		for (_, force) in &mut self.forces {
			force.apply(nodes, ctx);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Push(f64);

	impl Force for Push {
		fn apply(&mut self, nodes: &mut [Node], _ctx: &mut TickContext<'_>) {
			for node in nodes {
				node.vx += self.0;
			}
		}
	}

	#[test]
	fn standard_order() {
		let registry = ForceRegistry::standard(&SimulationConfig::default());
		assert_eq!(
			registry.names().collect::<Vec<_>>(),
			vec!["link", "charge", "collision", "center"]
		);
	}

	#[test]
	fn adding_an_existing_name_replaces_in_place() {
		let mut registry = ForceRegistry::default();
		registry.add("a", Push(1.0));
		registry.add("b", Push(2.0));
		registry.add("a", Push(10.0));
		assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);

		let mut nodes = vec![Node::new("n", 1.0)];
		let mut random = Lcg::default();
		let mut ctx = TickContext {
			alpha: 1.0,
			random: &mut random,
			skipped: 0,
		};
		registry.apply(&mut nodes, &mut ctx);
		assert_eq!(nodes[0].vx, 12.0);

		assert!(registry.remove("a").is_some());
		assert!(registry.remove("a").is_none());
	}

	#[test]
	fn jiggle_is_tiny_and_reproducible() {
		let (mut a, mut b) = (Lcg::default(), Lcg::default());
		for _ in 0..100 {
			let j = a.jiggle();
			assert!(j.abs() <= 0.5e-6);
			assert_eq!(j, b.jiggle());
		}
	}
}
