//! Arena-backed point quad-tree used for the Barnes-Hut many-body
//! approximation and for pruning collision checks.
//!
//! Cells are stored in a flat `Vec`; a cell is always pushed before its
//! children, so walking the arena backwards visits children before parents.
//! Points are referred to by their index in the slice the tree was built from.

/// Subdivision stops at this depth; deeper points share a leaf.
const MAX_DEPTH: usize = 32;

/// A square region of the plane.
#[derive(Clone, Debug)]
pub struct Cell {
	pub x0: f64,
	pub y0: f64,
	pub size: f64,
	children: Option<[Option<usize>; 4]>,
	points: Vec<usize>,
	/// Sum of the charges of all points below this cell.
	pub strength: f64,
	/// Charge-weighted centroid of the points below this cell.
	pub cx: f64,
	pub cy: f64,
	/// Largest radius of any point below this cell.
	pub max_radius: f64,
}

impl Cell {
	fn new(x0: f64, y0: f64, size: f64) -> Self {
		Self {
			x0,
			y0,
			size,
			children: None,
			points: Vec::new(),
			strength: 0.0,
			cx: 0.0,
			cy: 0.0,
			max_radius: 0.0,
		}
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_none()
	}

	/// Indices of the points stored in this leaf. Empty for internal cells.
	pub fn points(&self) -> &[usize] {
		&self.points
	}

	pub fn x1(&self) -> f64 {
		self.x0 + self.size
	}

	pub fn y1(&self) -> f64 {
		self.y0 + self.size
	}

	fn quadrant(&self, x: f64, y: f64) -> usize {
		let half = self.size / 2.0;
		let right = x >= self.x0 + half;
		let bottom = y >= self.y0 + half;
		usize::from(right) | (usize::from(bottom) << 1)
	}

	fn child_bounds(&self, quadrant: usize) -> (f64, f64, f64) {
		let half = self.size / 2.0;
		let x0 = if quadrant & 1 == 1 { self.x0 + half } else { self.x0 };
		let y0 = if quadrant & 2 == 2 { self.y0 + half } else { self.y0 };
		(x0, y0, half)
	}
}

/// Quad-tree over a fixed set of points.
#[derive(Clone, Debug)]
pub struct QuadTree {
	cells: Vec<Cell>,
}

impl QuadTree {
	/// Builds a tree covering all finite points. Non-finite points are left out.
	pub fn build(points: &[(f64, f64)]) -> Self {
		let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
		let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for &(x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}

		if min_x > max_x {
			return Self {
				cells: vec![Cell::new(0.0, 0.0, 1.0)],
			};
		}

		let size = (max_x - min_x).max(max_y - min_y).max(1.0);
		let mut tree = Self {
			cells: vec![Cell::new(min_x, min_y, size)],
		};
		for (i, &(x, y)) in points.iter().enumerate() {
			if x.is_finite() && y.is_finite() {
				tree.insert(i, x, y, points);
			}
		}
		tree
	}

	fn push_child(&mut self, parent: usize, quadrant: usize) -> usize {
		let (x0, y0, size) = self.cells[parent].child_bounds(quadrant);
		let child = self.cells.len();
		self.cells.push(Cell::new(x0, y0, size));
		if let Some(children) = self.cells[parent].children.as_mut() {
			children[quadrant] = Some(child);
		}
		child
	}

	fn child_for(&mut self, parent: usize, x: f64, y: f64) -> usize {
		let quadrant = self.cells[parent].quadrant(x, y);
		match self.cells[parent].children.and_then(|c| c[quadrant]) {
			Some(child) => child,
			None => self.push_child(parent, quadrant),
		}
	}

	fn insert(&mut self, index: usize, x: f64, y: f64, points: &[(f64, f64)]) {
		let mut cell = 0;
		let mut depth = 0;
		loop {
			if !self.cells[cell].is_leaf() {
				cell = self.child_for(cell, x, y);
				depth += 1;
				continue;
			}

			let leaf = &self.cells[cell];
			let coincident = leaf
				.points
				.first()
				.is_some_and(|&other| points[other] == (x, y));
			if leaf.points.is_empty() || coincident || depth >= MAX_DEPTH {
				self.cells[cell].points.push(index);
				return;
			}

			// Split the leaf and push its points one level down.
			let existing = std::mem::take(&mut self.cells[cell].points);
			self.cells[cell].children = Some([None; 4]);
			for other in existing {
				let (ox, oy) = points[other];
				let child = self.child_for(cell, ox, oy);
				self.cells[child].points.push(other);
			}
		}
	}

	/// Computes `strength` and the charge-weighted centroid of every cell.
	pub fn accumulate_charges(&mut self, points: &[(f64, f64)], charge: impl Fn(usize) -> f64) {
		for i in (0..self.cells.len()).rev() {
			let (mut strength, mut weight, mut cx, mut cy) = (0.0, 0.0, 0.0, 0.0);
			match self.cells[i].children {
				Some(children) => {
					for child in children.into_iter().flatten() {
						let child = &self.cells[child];
						let c = child.strength.abs();
						if c > 0.0 {
							strength += child.strength;
							weight += c;
							cx += c * child.cx;
							cy += c * child.cy;
						}
					}
				}
				None => {
					for &p in &self.cells[i].points {
						let c = charge(p);
						strength += c;
						weight += c.abs();
						cx += c.abs() * points[p].0;
						cy += c.abs() * points[p].1;
					}
				}
			}

			let cell = &mut self.cells[i];
			cell.strength = strength;
			if weight > 0.0 {
				cell.cx = cx / weight;
				cell.cy = cy / weight;
			} else {
				cell.cx = cell.x0 + cell.size / 2.0;
				cell.cy = cell.y0 + cell.size / 2.0;
			}
		}
	}

	/// Computes `max_radius` of every cell.
	pub fn accumulate_radii(&mut self, radius: impl Fn(usize) -> f64) {
		for i in (0..self.cells.len()).rev() {
			let max_radius = match self.cells[i].children {
				Some(children) => children
					.into_iter()
					.flatten()
					.map(|c| self.cells[c].max_radius)
					.fold(0.0, f64::max),
				None => self.cells[i]
					.points
					.iter()
					.map(|&p| radius(p))
					.fold(0.0, f64::max),
			};
			self.cells[i].max_radius = max_radius;
		}
	}

	/// Pre-order traversal. Returning `true` from `visit` skips the cell's children.
	pub fn visit(&self, mut visit: impl FnMut(&Cell) -> bool) {
		let mut stack = vec![0];
		while let Some(i) = stack.pop() {
			let cell = &self.cells[i];
			if visit(cell) {
				continue;
			}
			if let Some(children) = cell.children {
				// Reversed so that quadrant 0 is visited first.
				stack.extend(children.into_iter().rev().flatten());
			}
		}
	}

	#[cfg(test)]
	fn root(&self) -> &Cell {
		&self.cells[0]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn collect_points(tree: &QuadTree) -> Vec<usize> {
		let mut found = Vec::new();
		tree.visit(|cell| {
			found.extend_from_slice(cell.points());
			false
		});
		found.sort_unstable();
		found
	}

	#[test]
	fn every_finite_point_lands_in_exactly_one_leaf() {
		let points = [(0.0, 0.0), (10.0, 10.0), (3.0, 7.0), (f64::NAN, 1.0), (9.0, 1.0)];
		let tree = QuadTree::build(&points);
		assert_eq!(collect_points(&tree), vec![0, 1, 2, 4]);
	}

	#[test]
	fn coincident_points_share_a_leaf() {
		let points = [(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)];
		let tree = QuadTree::build(&points);
		assert!(tree.root().is_leaf());
		assert_eq!(tree.root().points(), &[0, 1, 2]);
	}

	#[test]
	fn charges_aggregate_to_the_root() {
		let points = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)];
		let mut tree = QuadTree::build(&points);
		tree.accumulate_charges(&points, |_| -30.0);
		let root = tree.root();
		assert_eq!(root.strength, -120.0);
		assert!((root.cx - 5.0).abs() < 1e-12);
		assert!((root.cy - 5.0).abs() < 1e-12);
	}

	#[test]
	fn radii_aggregate_to_the_root() {
		let points = [(0.0, 0.0), (10.0, 0.0), (4.0, 4.0)];
		let mut tree = QuadTree::build(&points);
		tree.accumulate_radii(|i| [3.0, 8.0, 1.0][i]);
		assert_eq!(tree.root().max_radius, 8.0);
	}

	#[test]
	fn pruned_cells_hide_their_points() {
		let points = [(0.0, 0.0), (100.0, 100.0)];
		let tree = QuadTree::build(&points);
		let mut seen = Vec::new();
		tree.visit(|cell| {
			if cell.x0 > 40.0 && cell.y0 > 40.0 {
				return true;
			}
			seen.extend_from_slice(cell.points());
			false
		});
		assert_eq!(seen, vec![0]);
	}
}
