//! Per-dataset view state of the canvas component.
//!
//! Wraps a [`Simulation`] with the scene it publishes every tick, the pointer
//! gesture in progress and the canvas size. Everything here is plain Rust; the
//! component feeds it browser events and asks it whether another animation
//! frame is needed.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use super::types::GraphData;
use crate::interaction::{InteractionController, ViewTransform};
use crate::simulation::{ConstructionError, Simulation, SimulationState};
use crate::sync::{RenderSync, Scene};

/// Core graph state combining the simulation with interaction tracking.
///
/// Created whenever the dataset changes, then advanced each frame by the
/// animation loop.
pub struct ForceGraphState {
	pub sim: Simulation,
	pub scene: Rc<RefCell<Scene>>,
	interaction: InteractionController,
	pub width: f64,
	pub height: f64,
	/// The view changed since the last draw.
	dirty: bool,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Result<Self, ConstructionError> {
		let (nodes, links) = data.to_parts();
		let mut sim = Simulation::new(nodes, links, data.config_for(width, height))?;
		let scene = RenderSync::attach(&mut sim);
		Ok(Self {
			sim,
			scene,
			interaction: InteractionController::default(),
			width,
			height,
			dirty: true,
		})
	}

	pub fn view(&self) -> ViewTransform {
		self.sim.view_transform()
	}

	/// Advances one animation frame. Returns whether the canvas must be redrawn.
	pub fn frame(&mut self) -> bool {
		let ticked = self.sim.is_running();
		if ticked {
			self.sim.tick();
		}
		std::mem::take(&mut self.dirty) || ticked
	}

	/// Whether the frame loop has anything left to do.
	pub fn needs_frame(&self) -> bool {
		self.dirty || self.sim.is_running()
	}

	/// Marks the view for redrawing, e.g. after an image finished loading.
	pub fn invalidate(&mut self) {
		self.dirty = true;
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.interaction.pointer_down(&mut self.sim, sx, sy);
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.interaction.pointer_move(&mut self.sim, sx, sy) {
			self.dirty = true;
		}
	}

	pub fn pointer_up(&mut self) {
		self.interaction.pointer_up(&mut self.sim);
	}

	pub fn pointer_leave(&mut self) {
		self.interaction.pointer_leave(&mut self.sim);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.interaction.wheel(&mut self.sim, sx, sy, delta_y);
		self.dirty = true;
	}

	/// Whether the pointer is over a node, for the cursor style.
	pub fn is_over_node(&self, sx: f64, sy: f64) -> bool {
		let (x, y) = self.view().invert(sx, sy);
		self.sim.find(x, y).is_some()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	/// Ends this dataset's simulation. Called before it is replaced.
	pub fn shutdown(&mut self) {
		if self.sim.state() != SimulationState::Stopped {
			info!("force-graph: discarding layout after {} ticks", self.sim.ticks());
		}
		self.sim.stop();
		self.dirty = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frames_run_until_converged_then_idle() {
		let mut state = ForceGraphState::new(&GraphData::sample(), 800.0, 600.0).unwrap();
		assert!(state.frame());
		let mut frames = 1;
		while state.needs_frame() {
			assert!(state.frame());
			frames += 1;
			assert!(frames < 1_000);
		}
		assert_eq!(state.sim.state(), SimulationState::Converged);
		assert!(!state.frame());
		assert_eq!(state.scene.borrow().revision, state.sim.ticks() + 1);
	}

	#[test]
	fn dragging_rearms_a_converged_layout() {
		let mut state = ForceGraphState::new(&GraphData::sample(), 800.0, 600.0).unwrap();
		state.sim.run(10_000);
		assert!(!state.sim.is_running());

		let bob = state.sim.node(&"Bob".into()).unwrap().position();
		let (sx, sy) = state.view().apply(bob.0, bob.1);
		assert!(state.is_over_node(sx, sy));
		state.pointer_down(sx, sy);
		assert!(state.needs_frame());
		state.pointer_move(sx + 50.0, sy);
		state.frame();
		let moved = state.sim.node(&"Bob".into()).unwrap().position();
		assert!((moved.0 - bob.0 - 50.0).abs() < 1e-9);

		state.pointer_up();
		assert_eq!(state.sim.alpha_target(), 0.0);
	}

	#[test]
	fn zoom_only_redraws() {
		let mut state = ForceGraphState::new(&GraphData::sample(), 800.0, 600.0).unwrap();
		state.sim.run(10_000);
		state.frame();
		assert!(!state.needs_frame());
		state.wheel(400.0, 300.0, 1.0);
		assert!(state.needs_frame());
		assert!(state.frame());
		assert!(!state.needs_frame());
		assert!(!state.sim.is_running());
	}

	#[test]
	fn shutdown_stops_the_simulation() {
		let mut state = ForceGraphState::new(&GraphData::sample(), 800.0, 600.0).unwrap();
		state.shutdown();
		assert_eq!(state.sim.state(), SimulationState::Stopped);
		assert!(!state.needs_frame());
	}
}
