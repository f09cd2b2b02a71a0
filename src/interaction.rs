//! Drag, pan and zoom.
//!
//! Dragging pins a node and reheats the simulation; panning and zooming only
//! change the [`ViewTransform`], which is applied at render time and never
//! enters the simulation math. Pointer coordinates arrive in screen space and
//! are mapped back through the current view transform.
//!
//! Events that reference nodes no longer present (e.g. after a dataset swap in
//! the middle of a gesture) are ignored.

use log::debug;

use crate::simulation::{NodeId, Simulation};

/// Zoom limits, as in the original canvas component.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Zoom factors per wheel notch.
const ZOOM_IN: f64 = 1.1;
const ZOOM_OUT: f64 = 0.9;

/// Affine map from simulation space to screen space: `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
	pub x: f64,
	pub y: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	pub const IDENTITY: Self = Self {
		k: 1.0,
		x: 0.0,
		y: 0.0,
	};

	pub const fn new(k: f64, x: f64, y: f64) -> Self {
		Self { k, x, y }
	}

	pub fn is_valid(&self) -> bool {
		self.k.is_finite() && self.k > 0.0 && self.x.is_finite() && self.y.is_finite()
	}

	pub fn apply(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Scales by `factor` around the screen point `(sx, sy)`, which stays put.
	pub fn zoom_about(&self, sx: f64, sy: f64, factor: f64) -> Self {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		Self {
			k,
			x: sx - (sx - self.x) * ratio,
			y: sy - (sy - self.y) * ratio,
		}
	}

	pub fn translate(&self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
			..*self
		}
	}
}

#[derive(Clone, Debug)]
struct Drag {
	node: NodeId,
	/// Node position minus pointer position at grab time, in simulation space.
	grab: (f64, f64),
}

/// Per-node drag state machine: a node is `Dragging` while it has an entry here.
#[derive(Clone, Debug, Default)]
pub struct DragController {
	active: Vec<Drag>,
}

impl DragController {
	pub fn is_dragging(&self, node: &NodeId) -> bool {
		self.active.iter().any(|d| &d.node == node)
	}

	/// Number of nodes currently being dragged.
	pub fn active(&self) -> usize {
		self.active.len()
	}

	/// Grabs `node` at the screen point `(sx, sy)`. The first concurrent drag
	/// reheats the simulation.
	pub fn start(&mut self, sim: &mut Simulation, node: &NodeId, sx: f64, sy: f64) -> bool {
		let Some((nx, ny)) = sim.node(node).map(|n| n.position()) else {
			debug!("drag: ignoring start on unknown node `{node}`");
			return false;
		};
		if self.is_dragging(node) {
			return true;
		}

		if self.active.is_empty() {
			let target = sim.config().drag_alpha_target;
			sim.set_alpha_target(target);
			sim.restart();
		}
		let (px, py) = sim.view_transform().invert(sx, sy);
		sim.pin(node, nx, ny);
		self.active.push(Drag {
			node: node.clone(),
			grab: (nx - px, ny - py),
		});
		debug!("drag: start `{node}` at ({nx:.1}, {ny:.1})");
		true
	}

	/// Moves a dragged node so that it stays under the pointer.
	pub fn drag(&mut self, sim: &mut Simulation, node: &NodeId, sx: f64, sy: f64) -> bool {
		let Some(drag) = self.active.iter().find(|d| &d.node == node) else {
			return false;
		};
		let (px, py) = sim.view_transform().invert(sx, sy);
		sim.pin(node, px + drag.grab.0, py + drag.grab.1)
	}

	/// Releases a dragged node. The last release lets the simulation cool down.
	pub fn end(&mut self, sim: &mut Simulation, node: &NodeId) -> bool {
		let Some(pos) = self.active.iter().position(|d| &d.node == node) else {
			return false;
		};
		self.active.remove(pos);
		sim.unpin(node);
		if self.active.is_empty() {
			let target = sim.config().alpha_target;
			sim.set_alpha_target(target);
		}
		debug!("drag: end `{node}`");
		true
	}

	/// Releases every dragged node, e.g. when the pointer leaves the canvas.
	pub fn cancel(&mut self, sim: &mut Simulation) {
		let nodes: Vec<_> = self.active.iter().map(|d| d.node.clone()).collect();
		for node in nodes {
			self.end(sim, &node);
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct Pan {
	start: (f64, f64),
	origin: ViewTransform,
}

/// What a pointer gesture is currently doing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Dragging(NodeId),
	Panning,
}

/// Routes pointer and wheel events to node drags or view changes.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	drags: DragController,
	gesture: Gesture,
	pan: Option<Pan>,
}

impl InteractionController {
	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	pub fn drags(&self) -> &DragController {
		&self.drags
	}

	/// Starts dragging the node under the pointer, or panning if there is none.
	pub fn pointer_down(&mut self, sim: &mut Simulation, sx: f64, sy: f64) {
		let (wx, wy) = sim.view_transform().invert(sx, sy);
		match sim.find(wx, wy).map(|n| n.id.clone()) {
			Some(node) => {
				if self.drags.start(sim, &node, sx, sy) {
					self.gesture = Gesture::Dragging(node);
				}
			}
			None => {
				self.pan = Some(Pan {
					start: (sx, sy),
					origin: sim.view_transform(),
				});
				self.gesture = Gesture::Panning;
			}
		}
	}

	/// Returns whether the view changed and needs a redraw.
	pub fn pointer_move(&mut self, sim: &mut Simulation, sx: f64, sy: f64) -> bool {
		match &self.gesture {
			Gesture::Idle => false,
			Gesture::Dragging(node) => {
				let node = node.clone();
				self.drags.drag(sim, &node, sx, sy)
			}
			Gesture::Panning => match self.pan {
				Some(pan) => {
					let view = pan.origin.translate(sx - pan.start.0, sy - pan.start.1);
					sim.set_view_transform(view.k, view.x, view.y);
					true
				}
				None => false,
			},
		}
	}

	pub fn pointer_up(&mut self, sim: &mut Simulation) {
		if let Gesture::Dragging(node) = std::mem::take(&mut self.gesture) {
			self.drags.end(sim, &node);
		}
		self.pan = None;
	}

	/// Pointer left the surface: every gesture ends.
	pub fn pointer_leave(&mut self, sim: &mut Simulation) {
		self.drags.cancel(sim);
		self.gesture = Gesture::Idle;
		self.pan = None;
	}

	/// Zooms around the pointer. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, sim: &mut Simulation, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { ZOOM_OUT } else { ZOOM_IN };
		let view = sim.view_transform().zoom_about(sx, sy, factor);
		sim.set_view_transform(view.k, view.x, view.y);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::simulation::{LinkSpec, Node, SimulationConfig};

	fn sim() -> Simulation {
		Simulation::new(
			vec![
				Node::new("Alice", 40.0).with_position(0.0, 0.0),
				Node::new("Bob", 35.0).with_position(200.0, 0.0),
			],
			vec![LinkSpec::new("Alice", "Bob")],
			SimulationConfig::default(),
		)
		.unwrap()
	}

	#[test]
	fn invert_undoes_apply() {
		let view = ViewTransform::new(2.5, -40.0, 13.0);
		let (sx, sy) = view.apply(7.0, -3.0);
		let (wx, wy) = view.invert(sx, sy);
		assert!((wx - 7.0).abs() < 1e-12 && (wy + 3.0).abs() < 1e-12);
	}

	#[test]
	fn zoom_keeps_the_pointer_fixed_and_clamps() {
		let view = ViewTransform::new(1.0, 10.0, 20.0);
		let zoomed = view.zoom_about(300.0, 200.0, 2.0);
		let before = view.invert(300.0, 200.0);
		let after = zoomed.invert(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);

		let mut view = ViewTransform::IDENTITY;
		for _ in 0..100 {
			view = view.zoom_about(0.0, 0.0, 1.1);
		}
		assert_eq!(view.k, MAX_ZOOM);
	}

	#[test]
	fn drag_pins_through_the_view_transform() {
		let mut sim = sim();
		sim.set_view_transform(2.0, 100.0, 50.0);
		let mut drags = DragController::default();
		let bob: NodeId = "Bob".into();

		// Grab Bob at his centre on screen.
		let (sx, sy) = sim.view_transform().apply(200.0, 0.0);
		assert!(drags.start(&mut sim, &bob, sx, sy));
		assert!(drags.is_dragging(&bob));
		assert_eq!(sim.alpha_target(), 0.3);

		// 20 screen pixels right is 10 simulation units at k = 2.
		assert!(drags.drag(&mut sim, &bob, sx + 20.0, sy));
		sim.tick();
		assert_eq!(sim.node(&bob).unwrap().position(), (210.0, 0.0));

		// A pointer without a position leaves the pin where it was.
		assert!(!drags.drag(&mut sim, &bob, f64::NAN, sy));
		sim.tick();
		assert_eq!(sim.node(&bob).unwrap().position(), (210.0, 0.0));

		assert!(drags.end(&mut sim, &bob));
		assert_eq!(sim.alpha_target(), 0.0);
		assert_eq!(sim.node(&bob).unwrap().fixed, None);
	}

	#[test]
	fn only_the_last_release_cools_down() {
		let mut sim = sim();
		let mut drags = DragController::default();
		let (alice, bob) = (NodeId::from("Alice"), NodeId::from("Bob"));
		drags.start(&mut sim, &alice, 0.0, 0.0);
		drags.start(&mut sim, &bob, 200.0, 0.0);
		assert_eq!(drags.active(), 2);

		drags.end(&mut sim, &alice);
		assert_eq!(sim.alpha_target(), 0.3);
		drags.end(&mut sim, &bob);
		assert_eq!(sim.alpha_target(), 0.0);
	}

	#[test]
	fn unknown_nodes_are_ignored() {
		let mut sim = sim();
		let mut drags = DragController::default();
		let ghost = NodeId::from("Ghost");
		assert!(!drags.start(&mut sim, &ghost, 0.0, 0.0));
		assert!(!drags.drag(&mut sim, &ghost, 5.0, 5.0));
		assert!(!drags.end(&mut sim, &ghost));
		assert_eq!(sim.alpha_target(), 0.0);
	}

	#[test]
	fn background_drag_pans_without_moving_nodes() {
		let mut sim = sim();
		let mut controller = InteractionController::default();
		let before: Vec<_> = sim.nodes().iter().map(Node::position).collect();

		controller.pointer_down(&mut sim, 500.0, 500.0);
		assert_eq!(controller.gesture(), &Gesture::Panning);
		assert!(controller.pointer_move(&mut sim, 530.0, 480.0));
		controller.pointer_up(&mut sim);

		assert_eq!(sim.view_transform(), ViewTransform::new(1.0, 30.0, -20.0));
		let after: Vec<_> = sim.nodes().iter().map(Node::position).collect();
		assert_eq!(before, after);
		assert_eq!(controller.gesture(), &Gesture::Idle);
	}

	#[test]
	fn pointer_down_on_a_node_starts_a_drag() {
		let mut sim = sim();
		let mut controller = InteractionController::default();
		controller.pointer_down(&mut sim, 195.0, 5.0);
		assert_eq!(controller.gesture(), &Gesture::Dragging("Bob".into()));
		controller.pointer_leave(&mut sim);
		assert_eq!(controller.drags().active(), 0);
		assert_eq!(sim.node(&"Bob".into()).unwrap().fixed, None);
	}

	#[test]
	fn wheel_zooms_about_the_pointer() {
		let mut sim = sim();
		let mut controller = InteractionController::default();
		controller.wheel(&mut sim, 100.0, 100.0, -1.0);
		let view = sim.view_transform();
		assert!((view.k - 1.1).abs() < 1e-12);
		assert!((view.x - -10.0).abs() < 1e-9);
	}
}
