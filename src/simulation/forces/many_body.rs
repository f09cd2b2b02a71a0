//! Pairwise charge between all nodes, inversely proportional to squared distance.
//!
//! Small graphs use exact O(n²) summation. From `approximate_from` nodes on, a
//! quad-tree groups far-away nodes into a single pseudo-charge (Barnes-Hut).

use super::{Force, TickContext};
use crate::simulation::graph::Node;
use crate::simulation::quadtree::QuadTree;

#[derive(Clone, Debug)]
pub struct ManyBody {
	strength: f64,
	theta2: f64,
	distance_min2: f64,
	distance_max2: f64,
	threshold: usize,
}

impl ManyBody {
	pub fn new(strength: f64) -> Self {
		Self {
			strength,
			theta2: 0.81,
			distance_min2: 1.0,
			distance_max2: f64::INFINITY,
			threshold: 300,
		}
	}

	pub fn theta(mut self, theta: f64) -> Self {
		self.theta2 = theta * theta;
		self
	}

	pub fn distance_range(mut self, min: f64, max: f64) -> Self {
		self.distance_min2 = min * min;
		self.distance_max2 = max * max;
		self
	}

	/// Node count from which the quad-tree approximation is used.
	pub fn approximate_from(mut self, threshold: usize) -> Self {
		self.threshold = threshold;
		self
	}

	/// Velocity change for a unit charge at distance `(x, y)` with squared length `l`.
	fn pull(&self, x: f64, y: f64, mut l: f64, charge: f64, ctx: &mut TickContext<'_>) -> (f64, f64) {
		if l < self.distance_min2 {
			l = (self.distance_min2 * l).sqrt();
		}
		// Coincident points with a zero minimum distance.
		if l == 0.0 {
			l = f64::EPSILON;
		}
		let w = charge * ctx.alpha / l;
		(x * w, y * w)
	}

	fn apply_exact(&self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		for i in 0..nodes.len() {
			let (xi, yi) = (nodes[i].x, nodes[i].y);
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for (j, other) in nodes.iter().enumerate() {
				if i == j {
					continue;
				}
				let mut x = other.x - xi;
				let mut y = other.y - yi;
				let mut l = x * x + y * y;
				if l >= self.distance_max2 {
					continue;
				}
				if x == 0.0 {
					x = ctx.random.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = ctx.random.jiggle();
					l += y * y;
				}
				let (px, py) = self.pull(x, y, l, self.strength, ctx);
				if ctx.accept(px, py) {
					dvx += px;
					dvy += py;
				}
			}
			nodes[i].vx += dvx;
			nodes[i].vy += dvy;
		}
	}

	fn apply_approximate(&self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		let points: Vec<(f64, f64)> = nodes.iter().map(Node::position).collect();
		let mut tree = QuadTree::build(&points);
		tree.accumulate_charges(&points, |_| self.strength);

		for (i, node) in nodes.iter_mut().enumerate() {
			let (xi, yi) = (node.x, node.y);
			let (mut dvx, mut dvy) = (0.0, 0.0);
			tree.visit(|cell| {
				if cell.strength == 0.0 {
					return true;
				}
				let mut x = cell.cx - xi;
				let mut y = cell.cy - yi;
				let mut l = x * x + y * y;

				// Far enough away to treat the whole cell as one charge.
				if cell.size * cell.size / self.theta2 < l {
					if l < self.distance_max2 {
						let (px, py) = self.pull(x, y, l, cell.strength, ctx);
						if ctx.accept(px, py) {
							dvx += px;
							dvy += py;
						}
					}
					return true;
				}
				if !cell.is_leaf() || l >= self.distance_max2 {
					return false;
				}

				let points = cell.points();
				if points.len() > 1 || points.first() != Some(&i) {
					if x == 0.0 {
						x = ctx.random.jiggle();
						l += x * x;
					}
					if y == 0.0 {
						y = ctx.random.jiggle();
						l += y * y;
					}
				}
				// Every point carries the same charge.
				let others = points.iter().filter(|&&j| j != i).count() as f64;
				if others > 0.0 {
					let (px, py) = self.pull(x, y, l, self.strength * others, ctx);
					if ctx.accept(px, py) {
						dvx += px;
						dvy += py;
					}
				}
				false
			});
			node.vx += dvx;
			node.vy += dvy;
		}
	}
}

impl Force for ManyBody {
	fn apply(&mut self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		if self.strength == 0.0 {
			return;
		}
		if nodes.len() >= self.threshold {
			self.apply_approximate(nodes, ctx);
		} else {
			self.apply_exact(nodes, ctx);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::simulation::forces::Lcg;

	fn grid(n: usize) -> Vec<Node> {
		let side = (n as f64).sqrt().ceil() as usize;
		(0..n)
			.map(|i| {
				let (col, row) = ((i % side) as f64, (i / side) as f64);
				Node::new(i as i64, 1.0).with_position(col * 13.0 + row * 0.7, row * 11.0)
			})
			.collect()
	}

	fn apply(force: &mut ManyBody, nodes: &mut [Node]) -> usize {
		let mut random = Lcg::default();
		let mut ctx = TickContext {
			alpha: 1.0,
			random: &mut random,
			skipped: 0,
		};
		force.apply(nodes, &mut ctx);
		ctx.skipped
	}

	#[test]
	fn negative_charge_repels() {
		let mut nodes = vec![
			Node::new("a", 1.0).with_position(0.0, 0.0),
			Node::new("b", 1.0).with_position(10.0, 0.0),
		];
		apply(&mut ManyBody::new(-30.0), &mut nodes);
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
		// -30 * alpha / 100 * 10
		assert!((nodes[1].vx - 3.0).abs() < 1e-4);
	}

	#[test]
	fn coincident_nodes_get_finite_velocities() {
		let mut nodes = vec![
			Node::new("a", 1.0).with_position(5.0, 5.0),
			Node::new("b", 1.0).with_position(5.0, 5.0),
		];
		let skipped = apply(&mut ManyBody::new(-30.0), &mut nodes);
		assert_eq!(skipped, 0);
		for node in &nodes {
			assert!(node.vx.is_finite() && node.vy.is_finite());
		}
	}

	#[test]
	fn pairs_with_a_lost_node_are_skipped_alone() {
		let mut nodes = vec![
			Node::new("a", 1.0).with_position(0.0, 0.0),
			Node::new("b", 1.0).with_position(10.0, 0.0),
			Node::new("c", 1.0).with_position(f64::NAN, 0.0),
		];
		let skipped = apply(&mut ManyBody::new(-30.0), &mut nodes);

		// a-c and b-c, seen from both sides.
		assert_eq!(skipped, 4);
		assert!((nodes[0].vx + 3.0).abs() < 1e-4);
		assert!((nodes[1].vx - 3.0).abs() < 1e-4);
		assert_eq!((nodes[2].vx, nodes[2].vy), (0.0, 0.0));
	}

	#[test]
	fn approximation_tracks_exact_summation() {
		let mut exact = grid(400);
		let mut approx = exact.clone();
		apply(&mut ManyBody::new(-30.0).approximate_from(usize::MAX), &mut exact);
		apply(
			&mut ManyBody::new(-30.0).theta(0.5).approximate_from(0),
			&mut approx,
		);

		let magnitude: f64 = exact.iter().map(|n| n.vx.hypot(n.vy)).sum::<f64>() / 400.0;
		let error: f64 = exact
			.iter()
			.zip(&approx)
			.map(|(e, a)| (e.vx - a.vx).hypot(e.vy - a.vy))
			.sum::<f64>()
			/ 400.0;
		assert!(error < 0.1 * magnitude, "error {error} vs magnitude {magnitude}");
	}
}
