//! Bridges simulation ticks to render primitives.
//!
//! [`RenderSync::attach`] registers a tick callback that rebuilds a [`Scene`]:
//! one [`EdgeFrame`] per link, addressed by [`LinkId`], and one [`NodeFrame`]
//! per node, addressed by [`NodeId`]. Renderers read the scene and never touch
//! the simulation, so nothing they do can feed back into the solver.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{ARROW_CLEARANCE, PathGeometry, Point, path_with_clearance};
use crate::simulation::{Link, LinkId, LinkStyle, Node, NodeId, Simulation};

/// A link label, placed halfway along its path.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelFrame {
	pub text: String,
	pub position: Point,
	/// Rotation in radians, following the path tangent but never upside down.
	pub angle: f64,
}

/// Render state of one link after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeFrame {
	pub id: LinkId,
	pub path: PathGeometry,
	/// SVG path data of `path`.
	pub svg: String,
	pub style: LinkStyle,
	pub label: Option<LabelFrame>,
}

/// Render state of one node after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeFrame {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub label: String,
	pub icon: Option<String>,
}

impl NodeFrame {
	/// `translate(x y)` of the node's group.
	pub fn transform(&self) -> String {
		format!("translate({} {})", self.x, self.y)
	}
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub edges: Vec<EdgeFrame>,
	pub nodes: Vec<NodeFrame>,
	/// Ticks folded into this scene since it was created.
	pub revision: u64,
}

impl Scene {
	pub fn edge(&self, id: LinkId) -> Option<&EdgeFrame> {
		self.edges.iter().find(|e| e.id == id)
	}

	pub fn node(&self, id: &NodeId) -> Option<&NodeFrame> {
		self.nodes.iter().find(|n| &n.id == id)
	}

	/// Rebuilds every frame from the current layout.
	pub fn update(&mut self, nodes: &[Node], links: &[Link]) {
		self.edges.clear();
		self.edges.extend(links.iter().map(|link| edge_frame(link, nodes)));
		self.nodes.clear();
		self.nodes.extend(nodes.iter().map(|node| NodeFrame {
			id: node.id.clone(),
			x: node.x,
			y: node.y,
			radius: node.radius,
			label: node.label.clone().unwrap_or_else(|| node.id.to_string()),
			icon: node.icon.clone(),
		}));
		self.revision += 1;
	}
}

fn edge_frame(link: &Link, nodes: &[Node]) -> EdgeFrame {
	let path = path_with_clearance(link, nodes, ARROW_CLEARANCE);
	let label = link.label.as_ref().map(|text| {
		let (position, (dx, dy)) = path.midpoint();
		let mut angle = dy.atan2(dx);
		if angle.abs() > std::f64::consts::FRAC_PI_2 {
			angle -= std::f64::consts::PI.copysign(angle);
		}
		LabelFrame {
			text: text.clone(),
			position,
			angle,
		}
	});
	EdgeFrame {
		id: link.id,
		svg: path.to_svg(),
		path,
		style: link.style.clone(),
		label,
	}
}

/// Keeps a [`Scene`] in step with a simulation.
pub struct RenderSync;

impl RenderSync {
	/// Builds the scene for the current layout and refreshes it on every tick.
	pub fn attach(sim: &mut Simulation) -> Rc<RefCell<Scene>> {
		let mut scene = Scene::default();
		scene.update(sim.nodes(), sim.links());
		let scene = Rc::new(RefCell::new(scene));
		let sink = Rc::clone(&scene);
		sim.on_tick(move |nodes, links| {
			// A renderer holding a borrow skips this tick; the next one catches up.
			if let Ok(mut scene) = sink.try_borrow_mut() {
				scene.update(nodes, links);
			}
		});
		scene
	}
}
