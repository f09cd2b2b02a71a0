//! Pushes overlapping node circles apart.
//!
//! Positions are predicted one step ahead (`x + vx`). Each overlapping pair is
//! separated along its center line, the lighter node (by squared radius)
//! moving more. A quad-tree annotated with the largest radius per cell prunes
//! pairs that cannot touch.

use super::{Force, TickContext};
use crate::simulation::graph::Node;
use crate::simulation::quadtree::QuadTree;

#[derive(Clone, Debug)]
pub struct Collide {
	padding: f64,
	strength: f64,
	iterations: usize,
}

impl Collide {
	/// `padding` is added to every node radius.
	pub fn new(padding: f64) -> Self {
		Self {
			padding,
			strength: 1.0,
			iterations: 1,
		}
	}

	pub fn strength(mut self, strength: f64) -> Self {
		self.strength = strength;
		self
	}

	/// Relaxation passes per tick.
	pub fn iterations(mut self, iterations: usize) -> Self {
		self.iterations = iterations.max(1);
		self
	}

	fn relax(&self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		let radii: Vec<f64> = nodes.iter().map(|n| n.radius + self.padding).collect();
		let predicted: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x + n.vx, n.y + n.vy)).collect();
		let mut tree = QuadTree::build(&predicted);
		tree.accumulate_radii(|i| radii[i]);

		for i in 0..nodes.len() {
			let ri = radii[i];
			let ri2 = ri * ri;
			let (xi, yi) = (nodes[i].x + nodes[i].vx, nodes[i].y + nodes[i].vy);

			tree.visit(|cell| {
				let reach = ri + cell.max_radius;
				if !cell.is_leaf() {
					return cell.x0 > xi + reach
						|| cell.x1() < xi - reach
						|| cell.y0 > yi + reach
						|| cell.y1() < yi - reach;
				}

				// Each pair is handled once, from its lower index.
				for &j in cell.points().iter().filter(|&&j| j > i) {
					let rj = radii[j];
					let r = ri + rj;
					let other = &nodes[j];
					let mut x = xi - other.x - other.vx;
					let mut y = yi - other.y - other.vy;
					let l = x * x + y * y;
					if l >= r * r {
						continue;
					}
					x = ctx.nonzero(x);
					y = ctx.nonzero(y);
					let l = (x * x + y * y).sqrt();
					let k = (r - l) / l * self.strength;
					let (x, y) = (x * k, y * k);
					if !ctx.accept(x, y) {
						continue;
					}

					let share = rj * rj / (ri2 + rj * rj);
					nodes[i].vx += x * share;
					nodes[i].vy += y * share;
					nodes[j].vx -= x * (1.0 - share);
					nodes[j].vy -= y * (1.0 - share);
				}
				true
			});
		}
	}
}

impl Force for Collide {
	fn apply(&mut self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		for _ in 0..self.iterations {
			self.relax(nodes, ctx);
		}
	}
}
