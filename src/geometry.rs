//! On-screen geometry of links.
//!
//! [`path_for`] is a pure function of the endpoint positions, radii and the
//! link's [`LinkShape`]: the same inputs always produce the same path.
//!
//! - A straight link runs from the source circle's boundary to the target
//!   circle's boundary, leaving room for the arrowhead.
//! - A curved link is a circular arc whose radius equals the distance between
//!   the node centres, drawn clockwise from source to target. Two opposite links
//!   between the same pair therefore bulge to opposite sides.
//! - A self-loop is a cubic Bézier on top of the node, scaled by its radius.

use std::f64::consts::FRAC_PI_3;

use crate::simulation::{Link, LinkShape, Node};

/// Space left between a link's end and the target circle for the arrowhead.
pub const ARROW_CLEARANCE: f64 = 8.0;

/// Below this distance two node centres are treated as coincident.
const EPSILON: f64 = 1e-9;

/// A point in simulation space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Self) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}

	fn on_circle(center: Self, radius: f64, angle: f64) -> Self {
		center.offset(radius * angle.cos(), radius * angle.sin())
	}
}

fn unit(dx: f64, dy: f64) -> (f64, f64) {
	let l = dx.hypot(dy);
	if l < EPSILON { (1.0, 0.0) } else { (dx / l, dy / l) }
}

/// Shape of a link on screen.
#[derive(Clone, Debug, PartialEq)]
pub enum PathGeometry {
	Line {
		source: Point,
		target: Point,
	},
	/// Clockwise arc of the circle around `center`, from `source` to `target`.
	Arc {
		source: Point,
		target: Point,
		center: Point,
		radius: f64,
	},
	Loop {
		source: Point,
		target: Point,
		control: [Point; 2],
	},
}

impl PathGeometry {
	pub fn source(&self) -> Point {
		match self {
			Self::Line { source, .. } | Self::Arc { source, .. } | Self::Loop { source, .. } => {
				*source
			}
		}
	}

	pub fn target(&self) -> Point {
		match self {
			Self::Line { target, .. } | Self::Arc { target, .. } | Self::Loop { target, .. } => {
				*target
			}
		}
	}

	/// SVG path data, e.g. `M 10.00 0.00 L 82.00 0.00`.
	pub fn to_svg(&self) -> String {
		match self {
			Self::Line { source, target } => format!(
				"M {:.2} {:.2} L {:.2} {:.2}",
				source.x, source.y, target.x, target.y
			),
			Self::Arc {
				source,
				target,
				radius,
				..
			} => format!(
				"M {:.2} {:.2} A {radius:.2} {radius:.2} 0 0 1 {:.2} {:.2}",
				source.x, source.y, target.x, target.y
			),
			Self::Loop {
				source,
				target,
				control: [c1, c2],
			} => format!(
				"M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
				source.x, source.y, c1.x, c1.y, c2.x, c2.y, target.x, target.y
			),
		}
	}

	/// Unit direction of travel at `target`.
	pub fn end_direction(&self) -> (f64, f64) {
		match self {
			Self::Line { source, target } => unit(target.x - source.x, target.y - source.y),
			Self::Arc { target, center, .. } => {
				let angle = (target.y - center.y).atan2(target.x - center.x);
				(-angle.sin(), angle.cos())
			}
			Self::Loop {
				target,
				control: [_, c2],
				..
			} => unit(target.x - c2.x, target.y - c2.y),
		}
	}

	/// Where the arrowhead's tip goes: `clearance` beyond the path's end, on the
	/// target circle. Loops end on the circle already.
	pub fn arrow_tip(&self, clearance: f64) -> Point {
		match self {
			Self::Loop { target, .. } => *target,
			_ => {
				let (ux, uy) = self.end_direction();
				self.target().offset(ux * clearance, uy * clearance)
			}
		}
	}

	/// Point halfway along the path and the direction of travel there.
	pub fn midpoint(&self) -> (Point, (f64, f64)) {
		match self {
			Self::Line { source, target } => (
				Point::new((source.x + target.x) / 2.0, (source.y + target.y) / 2.0),
				unit(target.x - source.x, target.y - source.y),
			),
			Self::Arc {
				source,
				target,
				center,
				radius,
			} => {
				let a0 = (source.y - center.y).atan2(source.x - center.x);
				let mut a1 = (target.y - center.y).atan2(target.x - center.x);
				if a1 < a0 {
					a1 += std::f64::consts::TAU;
				}
				let mid = (a0 + a1) / 2.0;
				(Point::on_circle(*center, *radius, mid), (-mid.sin(), mid.cos()))
			}
			Self::Loop {
				source,
				target,
				control: [c1, c2],
			} => {
				// Cubic Bézier at t = 1/2.
				let at = |p0: f64, p1: f64, p2: f64, p3: f64| (p0 + 3.0 * p1 + 3.0 * p2 + p3) / 8.0;
				(
					Point::new(
						at(source.x, c1.x, c2.x, target.x),
						at(source.y, c1.y, c2.y, target.y),
					),
					unit(target.x + c2.x - source.x - c1.x, target.y + c2.y - source.y - c1.y),
				)
			}
		}
	}
}

/// Path of `link` for the current positions in `nodes`, with the default
/// arrow clearance.
pub fn path_for(link: &Link, nodes: &[Node]) -> PathGeometry {
	path_with_clearance(link, nodes, ARROW_CLEARANCE)
}

/// Path of `link`, keeping `clearance` free in front of the target circle.
pub fn path_with_clearance(link: &Link, nodes: &[Node], clearance: f64) -> PathGeometry {
	let (source, target) = (&nodes[link.source], &nodes[link.target]);
	match link.shape {
		LinkShape::SelfLoop => self_loop(source),
		LinkShape::Straight => straight(source, target, clearance),
		LinkShape::Curved => arc(source, target, clearance),
	}
}

fn straight(source: &Node, target: &Node, clearance: f64) -> PathGeometry {
	let (s, t) = (Point::new(source.x, source.y), Point::new(target.x, target.y));
	let d = s.distance(t);
	let trim_end = target.radius + clearance;
	if d < EPSILON || source.radius + trim_end >= d {
		// Overlapping circles: nothing sensible to trim.
		return PathGeometry::Line {
			source: s,
			target: t,
		};
	}
	let (ux, uy) = ((t.x - s.x) / d, (t.y - s.y) / d);
	PathGeometry::Line {
		source: s.offset(ux * source.radius, uy * source.radius),
		target: t.offset(-ux * trim_end, -uy * trim_end),
	}
}

fn arc(source: &Node, target: &Node, clearance: f64) -> PathGeometry {
	let (s, t) = (Point::new(source.x, source.y), Point::new(target.x, target.y));
	let radius = s.distance(t);
	if radius < EPSILON {
		return PathGeometry::Line {
			source: s,
			target: t,
		};
	}

	// With radius == chord, the centre completes an equilateral triangle and
	// the arc spans 60 degrees.
	let (dx, dy) = (t.x - s.x, t.y - s.y);
	let (sin, cos) = FRAC_PI_3.sin_cos();
	let center = s.offset(dx * cos - dy * sin, dx * sin + dy * cos);
	let start = (s.y - center.y).atan2(s.x - center.x);
	let end = start + FRAC_PI_3;

	// Angle subtended by a chord of length `c`.
	let chord_angle = |c: f64| 2.0 * (c / (2.0 * radius)).min(1.0).asin();
	let trimmed_start = start + chord_angle(source.radius);
	let trimmed_end = end - chord_angle(target.radius + clearance);
	let (a0, a1) = if trimmed_start < trimmed_end {
		(trimmed_start, trimmed_end)
	} else {
		(start, end)
	};

	PathGeometry::Arc {
		source: Point::on_circle(center, radius, a0),
		target: Point::on_circle(center, radius, a1),
		center,
		radius,
	}
}

fn self_loop(node: &Node) -> PathGeometry {
	let (p, r) = (Point::new(node.x, node.y), node.radius);
	// Leaves and re-enters the top of the circle at -120 and -60 degrees.
	let (s60, c60) = FRAC_PI_3.sin_cos();
	PathGeometry::Loop {
		source: p.offset(-r * c60, -r * s60),
		target: p.offset(r * c60, -r * s60),
		control: [p.offset(-1.6 * r, -2.6 * r), p.offset(1.6 * r, -2.6 * r)],
	}
}

#[cfg(test)]
mod tests {
	use similar_asserts::assert_eq;

	use super::*;
	use crate::simulation::{LinkSpec, resolve};

	fn graph(positions: &[(&str, f64, f64, f64)], links: Vec<LinkSpec>) -> (Vec<Node>, Vec<Link>) {
		let nodes = positions
			.iter()
			.map(|&(id, r, x, y)| Node::new(id, r).with_position(x, y))
			.collect();
		let graph = resolve(nodes, links).unwrap();
		(graph.nodes, graph.links)
	}

	/// Signed side of `p` relative to the directed line `a -> b`.
	fn side(a: Point, b: Point, p: Point) -> f64 {
		(b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
	}

	#[test]
	fn straight_link_stops_at_circle_boundaries() {
		let (nodes, links) = graph(
			&[("a", 10.0, 0.0, 0.0), ("b", 10.0, 100.0, 0.0)],
			vec![LinkSpec::new("a", "b")],
		);
		let path = path_for(&links[0], &nodes);
		assert_eq!(path.to_svg().as_str(), "M 10.00 0.00 L 82.00 0.00");
		assert_eq!(path.arrow_tip(ARROW_CLEARANCE), Point::new(90.0, 0.0));
		assert_eq!(path.end_direction(), (1.0, 0.0));
	}

	#[test]
	fn overlapping_circles_fall_back_to_centres() {
		let (nodes, links) = graph(
			&[("a", 30.0, 0.0, 0.0), ("b", 30.0, 20.0, 0.0)],
			vec![LinkSpec::new("a", "b")],
		);
		assert_eq!(
			path_for(&links[0], &nodes),
			PathGeometry::Line {
				source: Point::new(0.0, 0.0),
				target: Point::new(20.0, 0.0),
			}
		);
	}

	#[test]
	fn path_is_a_pure_function_of_positions() {
		let (nodes, links) = graph(
			&[("a", 12.0, 3.5, -7.25), ("b", 9.0, 140.0, 61.0)],
			vec![LinkSpec::new("a", "b"), LinkSpec::new("b", "a")],
		);
		for link in &links {
			let first = path_for(link, &nodes).to_svg();
			for _ in 0..3 {
				assert_eq!(path_for(link, &nodes).to_svg(), first);
			}
		}
	}

	#[test]
	fn opposite_links_bulge_to_opposite_sides() {
		let (nodes, links) = graph(
			&[("A", 20.0, 0.0, 0.0), ("B", 20.0, 200.0, 0.0)],
			vec![LinkSpec::new("A", "B"), LinkSpec::new("B", "A")],
		);
		let (a, b) = (Point::new(0.0, 0.0), Point::new(200.0, 0.0));
		let forward = path_for(&links[0], &nodes);
		let backward = path_for(&links[1], &nodes);
		assert!(matches!(forward, PathGeometry::Arc { .. }));
		assert!(matches!(backward, PathGeometry::Arc { .. }));

		let (mid_forward, _) = forward.midpoint();
		let (mid_backward, _) = backward.midpoint();
		assert!(side(a, b, mid_forward) * side(a, b, mid_backward) < 0.0);
		assert!(mid_forward.y.abs() > 1.0);
	}

	#[test]
	fn arc_ends_are_trimmed_on_the_arc() {
		let (nodes, links) = graph(
			&[("A", 20.0, 0.0, 0.0), ("B", 15.0, 0.0, 150.0)],
			vec![LinkSpec::new("A", "B").bidirectional()],
		);
		let PathGeometry::Arc {
			source,
			target,
			center,
			radius,
		} = path_for(&links[0], &nodes)
		else {
			panic!("bidirectional link should be an arc");
		};
		assert!((radius - 150.0).abs() < 1e-9);
		assert!((center.distance(source) - radius).abs() < 1e-9);
		assert!((center.distance(target) - radius).abs() < 1e-9);
		assert!((source.distance(Point::new(0.0, 0.0)) - 20.0).abs() < 1e-9);
		assert!((target.distance(Point::new(0.0, 150.0)) - (15.0 + ARROW_CLEARANCE)).abs() < 1e-9);
	}

	#[test]
	fn self_loop_is_anchored_on_the_node() {
		let (nodes, links) = graph(&[("Bob", 35.0, 50.0, 80.0)], vec![LinkSpec::new("Bob", "Bob")]);
		let path = path_for(&links[0], &nodes);
		let bob = Point::new(50.0, 80.0);
		let PathGeometry::Loop {
			source,
			target,
			control,
		} = &path
		else {
			panic!("self link should be a loop");
		};
		assert!((source.distance(bob) - 35.0).abs() < 1e-9);
		assert!((target.distance(bob) - 35.0).abs() < 1e-9);
		assert!(source.distance(*target) > 1.0);
		assert!(control.iter().all(|c| c.distance(bob) > 35.0));
		assert!(path.to_svg().starts_with("M 32.50 49.69 C"));
		// The loop rises above the node.
		assert!(path.midpoint().0.y < 80.0 - 35.0);
	}
}
