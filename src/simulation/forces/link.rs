//! Spring force along links.

use super::{Force, TickContext};
use crate::simulation::config::link_distance;
use crate::simulation::graph::{Link, Node, degrees};

#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	distance: f64,
	/// `1 / min(degree)`, so that hubs are not dragged around by every leaf.
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// Pulls linked nodes towards a target separation.
#[derive(Clone, Debug)]
pub struct LinkForce {
	distance: Option<f64>,
	iterations: usize,
	springs: Vec<Spring>,
}

impl LinkForce {
	/// `distance: None` uses a multiple of the endpoints' combined radii.
	pub fn new(distance: Option<f64>, iterations: usize) -> Self {
		Self {
			distance,
			iterations: iterations.max(1),
			springs: Vec::new(),
		}
	}
}

impl Force for LinkForce {
	fn initialize(&mut self, nodes: &[Node], links: &[Link]) {
		let degree = degrees(nodes.len(), links);
		self.springs = links
			.iter()
			.filter(|l| !l.is_self_loop())
			.map(|link| {
				let (s, t) = (link.source, link.target);
				let (ds, dt) = (degree[s] as f64, degree[t] as f64);
				Spring {
					source: s,
					target: t,
					distance: link_distance(self.distance, nodes[s].radius, nodes[t].radius),
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();
	}

	fn apply(&mut self, nodes: &mut [Node], ctx: &mut TickContext<'_>) {
		for _ in 0..self.iterations {
			for spring in &self.springs {
				let (source, target) = (&nodes[spring.source], &nodes[spring.target]);
				let x = ctx.nonzero(target.x + target.vx - source.x - source.vx);
				let y = ctx.nonzero(target.y + target.vy - source.y - source.vy);
				let l = (x * x + y * y).sqrt();
				let k = (l - spring.distance) / l * ctx.alpha * spring.strength;
				let (x, y) = (x * k, y * k);
				if !ctx.accept(x, y) {
					continue;
				}

				let target = &mut nodes[spring.target];
				target.vx -= x * spring.bias;
				target.vy -= y * spring.bias;
				let source = &mut nodes[spring.source];
				source.vx += x * (1.0 - spring.bias);
				source.vy += y * (1.0 - spring.bias);
			}
		}
	}
}
