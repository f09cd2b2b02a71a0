//! Force-directed layout solver.
//!
//! A [`Simulation`] owns the node table and links of one dataset. Every
//! [`tick`](Simulation::tick) runs the registered forces, integrates velocities
//! into positions, hands the updated state to the tick callbacks and cools
//! `alpha` towards `alpha_target`. Once `alpha` falls below `alpha_min` the
//! simulation is [`Converged`](SimulationState::Converged) and ticking is a
//! no-op until something reheats it.
//!
//! # Example
//!
//! ```
//! use rel_graph::simulation::{LinkSpec, Node, Simulation, SimulationConfig};
//!
//! let nodes = vec![Node::new("Alice", 40.0), Node::new("Bob", 35.0)];
//! let links = vec![LinkSpec::new("Alice", "Bob")];
//! let mut sim = Simulation::new(nodes, links, SimulationConfig::default()).unwrap();
//! sim.on_tick(|nodes, _links| {
//!     let _ = nodes[0].position();
//! });
//! sim.run(1000);
//! assert!(!sim.is_running());
//! ```

pub mod config;
mod error;
pub mod forces;
mod graph;
pub mod quadtree;

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, info, warn};

pub use config::SimulationConfig;
pub use error::ConstructionError;
pub use forces::{Force, ForceRegistry};
pub use graph::{
	Link, LinkId, LinkKind, LinkShape, LinkSpec, LinkStyle, Node, NodeId, ResolvedGraph, resolve,
};

use crate::interaction::ViewTransform;
use forces::{Lcg, TickContext};

/// Radius of the innermost node of the initial spiral.
const INITIAL_RADIUS: f64 = 10.0;

/// Lifecycle of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
	/// Ticks advance the layout.
	Running,
	/// Alpha fell below `alpha_min`. Reheating moves back to `Running`.
	Converged,
	/// Terminal. No further ticks, ever.
	Stopped,
}

/// Callback run after every tick with the freshly integrated state.
pub type TickCallback = Box<dyn FnMut(&[Node], &[Link])>;

/// A running layout of one dataset, together with its view transform.
pub struct Simulation {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<NodeId, usize>,
	forces: ForceRegistry,
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	state: SimulationState,
	ticks: u64,
	random: Lcg,
	callbacks: Vec<TickCallback>,
	view: ViewTransform,
}

/// Builds a simulation from a dataset. See [`Simulation::new`].
pub fn create_simulation(
	nodes: Vec<Node>,
	links: Vec<LinkSpec>,
	config: SimulationConfig,
) -> Result<Simulation, ConstructionError> {
	Simulation::new(nodes, links, config)
}

impl Simulation {
	/// Validates `config`, resolves the links and seeds positions of unplaced
	/// nodes on a phyllotaxis spiral around the configured centre.
	pub fn new(
		nodes: Vec<Node>,
		links: Vec<LinkSpec>,
		config: SimulationConfig,
	) -> Result<Self, ConstructionError> {
		config.validate()?;
		let graph = resolve(nodes, links)?;
		let index = graph
			.nodes
			.iter()
			.map(|n| (n.id.clone(), n.index))
			.collect();
		let ResolvedGraph {
			mut nodes, links, ..
		} = graph;

		let golden_angle = PI * (3.0 - 5f64.sqrt());
		let (cx, cy) = config.center();
		for (i, node) in nodes.iter_mut().enumerate().filter(|(_, n)| !n.is_placed()) {
			let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden_angle;
			node.mark_placed(
				cx + radius * angle.cos(),
				cy + radius * angle.sin(),
			);
		}

		let mut forces = ForceRegistry::standard(&config);
		forces.initialize(&nodes, &links);

		info!(
			"simulation: {} nodes, {} links, many-body {}",
			nodes.len(),
			links.len(),
			if nodes.len() >= config.barnes_hut_threshold {
				"barnes-hut"
			} else {
				"exact"
			}
		);

		Ok(Self {
			nodes,
			links,
			index,
			forces,
			alpha: 1.0,
			alpha_target: config.alpha_target,
			config,
			state: SimulationState::Running,
			ticks: 0,
			random: Lcg::default(),
			callbacks: Vec::new(),
			view: ViewTransform::default(),
		})
	}

	/// Registers a callback run after every tick. May be called repeatedly.
	///
	/// The callback only sees shared references: it can read the layout but
	/// cannot feed anything back into the simulation.
	pub fn on_tick(&mut self, callback: impl FnMut(&[Node], &[Link]) + 'static) {
		self.callbacks.push(Box::new(callback));
	}

	/// Advances the layout by one step, if running. Returns the resulting state.
	pub fn tick(&mut self) -> SimulationState {
		if self.state != SimulationState::Running {
			return self.state;
		}

		let mut ctx = TickContext {
			alpha: self.alpha,
			random: &mut self.random,
			skipped: 0,
		};
		self.forces.apply(&mut self.nodes, &mut ctx);
		if ctx.skipped > 0 {
			warn!(
				"simulation: skipped {} non-finite force contributions in tick {}",
				ctx.skipped, self.ticks
			);
		}

		let friction = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fixed {
				Some((fx, fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				None => {
					node.vx *= friction;
					node.vy *= friction;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}

		let Self {
			callbacks,
			nodes,
			links,
			..
		} = self;
		for callback in callbacks.iter_mut() {
			callback(nodes.as_slice(), links.as_slice());
		}

		self.ticks += 1;
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.alpha = self.alpha.clamp(0.0, 1.0);
		if self.alpha < self.config.alpha_min {
			self.state = SimulationState::Converged;
			info!("simulation: converged after {} ticks", self.ticks);
		}
		self.state
	}

	/// Ticks until the simulation leaves `Running` or `max_ticks` is reached.
	/// Returns the number of ticks performed.
	pub fn run(&mut self, max_ticks: usize) -> usize {
		let mut performed = 0;
		while performed < max_ticks && self.is_running() {
			self.tick();
			performed += 1;
		}
		performed
	}

	/// Stops the simulation for good. Idempotent.
	pub fn stop(&mut self) {
		if self.state != SimulationState::Stopped {
			info!("simulation: stopped after {} ticks", self.ticks);
			self.state = SimulationState::Stopped;
		}
	}

	/// Resumes a converged simulation. Returns whether the simulation is running.
	pub fn restart(&mut self) -> bool {
		if self.state == SimulationState::Converged {
			debug!("simulation: restarting at alpha {:.4}", self.alpha);
			self.state = SimulationState::Running;
		}
		self.is_running()
	}

	pub fn state(&self) -> SimulationState {
		self.state
	}

	pub fn is_running(&self) -> bool {
		self.state == SimulationState::Running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Ticks performed so far.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Registers `force` under `name`, replacing any force of that name in
	/// place. The force is initialized with the current graph.
	pub fn add_force(&mut self, name: impl Into<String>, mut force: impl Force + 'static) {
		force.initialize(&self.nodes, &self.links);
		self.forces.add(name, force);
	}

	pub fn remove_force(&mut self, name: &str) -> Option<Box<dyn Force>> {
		self.forces.remove(name)
	}

	/// Names of the registered forces, in application order.
	pub fn force_names(&self) -> Vec<&str> {
		self.forces.names().collect()
	}

	/// Pins a node at `(x, y)`. Returns `false` if the id is unknown or the
	/// position is not finite.
	pub fn pin(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
		if !(x.is_finite() && y.is_finite()) {
			debug!("simulation: ignoring pin of `{id}` at ({x}, {y})");
			return false;
		}
		match self.index.get(id) {
			Some(&i) => {
				self.nodes[i].fixed = Some((x, y));
				true
			}
			None => {
				debug!("simulation: ignoring pin of unknown node `{id}`");
				false
			}
		}
	}

	/// Releases a pinned node. Returns `false` if the id is unknown.
	pub fn unpin(&mut self, id: &NodeId) -> bool {
		match self.index.get(id) {
			Some(&i) => {
				self.nodes[i].fixed = None;
				true
			}
			None => {
				debug!("simulation: ignoring unpin of unknown node `{id}`");
				false
			}
		}
	}

	/// Topmost node whose circle contains the simulation-space point `(x, y)`.
	pub fn find(&self, x: f64, y: f64) -> Option<&Node> {
		// Later nodes are drawn on top.
		self.nodes.iter().rev().find(|node| {
			let (dx, dy) = (node.x - x, node.y - y);
			dx * dx + dy * dy <= node.radius * node.radius
		})
	}

	/// Sets the render-time view transform. Non-finite values and
	/// non-positive scales are ignored.
	pub fn set_view_transform(&mut self, k: f64, x: f64, y: f64) {
		let view = ViewTransform::new(k, x, y);
		if view.is_valid() {
			self.view = view;
		} else {
			debug!("simulation: ignoring invalid view transform {view:?}");
		}
	}

	pub fn view_transform(&self) -> ViewTransform {
		self.view
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	fn triangle() -> Simulation {
		Simulation::new(
			vec![
				Node::new("Alice", 40.0),
				Node::new("Bob", 35.0),
				Node::new("Carol", 35.0),
			],
			vec![
				LinkSpec::new("Alice", "Bob"),
				LinkSpec::new("Bob", "Alice"),
				LinkSpec::new("Bob", "Carol"),
			],
			SimulationConfig::default(),
		)
		.unwrap()
	}

	#[test]
	fn construction_errors_are_fatal() {
		let err = Simulation::new(
			vec![Node::new("a", 1.0)],
			vec![LinkSpec::new("a", "b")],
			SimulationConfig::default(),
		)
		.err();
		assert!(matches!(err, Some(ConstructionError::UnknownNodeReference { .. })));

		let config = SimulationConfig {
			alpha_min: 0.0,
			..Default::default()
		};
		let err = Simulation::new(vec![], vec![], config).err();
		assert!(matches!(err, Some(ConstructionError::InvalidConfig { .. })));
	}

	#[test]
	fn unplaced_nodes_are_seeded_around_the_center() {
		let sim = triangle();
		let positions: Vec<_> = sim.nodes().iter().map(Node::position).collect();
		for (i, &(x, y)) in positions.iter().enumerate() {
			let r = (x - 500.0).hypot(y - 300.0);
			assert!((r - INITIAL_RADIUS * (0.5 + i as f64).sqrt()).abs() < 1e-9);
		}
	}

	#[test]
	fn alpha_cools_monotonically_until_converged() {
		let mut sim = triangle();
		let mut previous = sim.alpha();
		while sim.tick() == SimulationState::Running {
			assert!(sim.alpha() < previous);
			previous = sim.alpha();
		}
		assert_eq!(sim.state(), SimulationState::Converged);
		assert!(sim.alpha() < sim.config().alpha_min);

		let ticks = sim.ticks();
		assert_eq!(sim.tick(), SimulationState::Converged);
		assert_eq!(sim.ticks(), ticks);
	}

	#[test]
	fn callbacks_run_once_per_tick_with_current_state() {
		let mut sim = triangle();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		sim.on_tick(move |nodes, links| {
			sink.borrow_mut().push((nodes[1].position(), links.len()));
		});
		let calls = Rc::new(RefCell::new(0));
		let counter = calls.clone();
		sim.on_tick(move |_, _| *counter.borrow_mut() += 1);

		sim.run(5);
		assert_eq!(*calls.borrow(), 5);
		let seen = seen.borrow();
		assert_eq!(seen.len(), 5);
		assert_eq!(seen[4], (sim.nodes()[1].position(), 3));
	}

	#[test]
	fn stop_is_terminal_and_idempotent() {
		let mut sim = triangle();
		sim.tick();
		sim.stop();
		sim.stop();
		assert_eq!(sim.state(), SimulationState::Stopped);
		assert!(!sim.restart());
		let ticks = sim.ticks();
		assert_eq!(sim.tick(), SimulationState::Stopped);
		assert_eq!(sim.ticks(), ticks);
	}

	#[test]
	fn pinned_nodes_stay_put() {
		let mut sim = triangle();
		assert!(sim.pin(&"Carol".into(), 10.0, -20.0));
		for _ in 0..50 {
			sim.tick();
			let carol = sim.node(&"Carol".into()).unwrap();
			assert_eq!(carol.position(), (10.0, -20.0));
			assert_eq!((carol.vx, carol.vy), (0.0, 0.0));
		}
		assert!(sim.unpin(&"Carol".into()));
		assert!(!sim.pin(&"Mallory".into(), 0.0, 0.0));
		assert!(!sim.unpin(&"Mallory".into()));
	}

	#[test]
	fn non_finite_pins_are_rejected() {
		let mut sim = triangle();
		assert!(!sim.pin(&"Carol".into(), f64::NAN, 0.0));
		assert!(!sim.pin(&"Carol".into(), 0.0, f64::INFINITY));
		assert_eq!(sim.node(&"Carol".into()).unwrap().fixed, None);

		sim.run(10_000);
		let n = sim.nodes().len() as f64;
		let (sx, sy) = sim
			.nodes()
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		assert!(sx.is_finite() && sy.is_finite());
		assert!((sx / n - 500.0).hypot(sy / n - 300.0) < 25.0);
	}

	#[test]
	fn reheating_restarts_a_converged_simulation() {
		let mut sim = triangle();
		sim.run(10_000);
		assert_eq!(sim.state(), SimulationState::Converged);
		sim.set_alpha_target(0.3);
		assert!(sim.restart());
		for _ in 0..20 {
			sim.tick();
		}
		assert!(sim.alpha() > sim.config().alpha_min);
		assert!(sim.is_running());
	}

	#[test]
	fn find_returns_topmost_hit() {
		let sim = Simulation::new(
			vec![
				Node::new("under", 20.0).with_position(0.0, 0.0),
				Node::new("over", 20.0).with_position(10.0, 0.0),
			],
			vec![],
			SimulationConfig::default(),
		)
		.unwrap();
		assert_eq!(sim.find(5.0, 0.0).map(|n| &n.id), Some(&NodeId::from("over")));
		assert_eq!(sim.find(-15.0, 0.0).map(|n| &n.id), Some(&NodeId::from("under")));
		assert!(sim.find(100.0, 100.0).is_none());
	}

	#[test]
	fn forces_are_managed_by_name() {
		struct Wind;
		impl Force for Wind {
			fn apply(&mut self, nodes: &mut [Node], _ctx: &mut TickContext<'_>) {
				for node in nodes {
					node.vx += 1.0;
				}
			}
		}

		let mut sim = triangle();
		assert_eq!(sim.force_names(), ["link", "charge", "collision", "center"]);
		assert!(sim.remove_force("charge").is_some());
		assert!(sim.remove_force("charge").is_none());
		sim.add_force("center", Wind);
		sim.add_force("wind", Wind);
		assert_eq!(sim.force_names(), ["link", "collision", "center", "wind"]);
	}

	#[test]
	fn view_transform_never_moves_nodes() {
		let mut sim = triangle();
		let before: Vec<_> = sim.nodes().iter().map(Node::position).collect();
		sim.set_view_transform(2.0, 30.0, -40.0);
		let after: Vec<_> = sim.nodes().iter().map(Node::position).collect();
		assert_eq!(before, after);
		assert_eq!(sim.view_transform(), ViewTransform::new(2.0, 30.0, -40.0));
	}
}
