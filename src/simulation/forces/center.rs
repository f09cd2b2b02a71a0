//! Keeps the layout centred on a fixed point.

use super::{Force, TickContext};
use crate::simulation::graph::Node;

/// Nudges every node by a fraction of the centroid's offset from `(x, y)`.
#[derive(Clone, Debug)]
pub struct Center {
	x: f64,
	y: f64,
	strength: f64,
}

impl Center {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y, strength: 0.1 }
	}

	pub fn strength(mut self, strength: f64) -> Self {
		self.strength = strength;
		self
	}
}

impl Force for Center {
	fn apply(&mut self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		// Nodes without a finite position do not count towards the centroid.
		let (sx, sy, count) = nodes
			.iter()
			.filter(|node| node.x.is_finite() && node.y.is_finite())
			.fold((0.0, 0.0, 0usize), |(sx, sy, n), node| (sx + node.x, sy + node.y, n + 1));
		if count == 0 {
			return;
		}
		let n = count as f64;
		let dx = (sx / n - self.x) * self.strength;
		let dy = (sy / n - self.y) * self.strength;
		if !ctx.accept(dx, dy) {
			return;
		}
		for node in nodes {
			node.vx -= dx;
			node.vy -= dy;
		}
	}
}
