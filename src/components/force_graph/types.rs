//! Graph data structures for input to the force graph component.

use serde::Deserialize;

use crate::simulation::{LinkKind, LinkSpec, LinkStyle, Node, NodeId, SimulationConfig};

fn default_radius() -> f64 {
	30.0
}

/// A node in the graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: NodeId,
	/// Circle radius in simulation units.
	#[serde(default = "default_radius")]
	pub radius: f64,
	/// Optional display label. Defaults to the id.
	#[serde(default)]
	pub label: Option<String>,
	/// Optional image URL drawn inside the node circle.
	#[serde(default)]
	pub icon: Option<String>,
	/// Optional initial position. Both coordinates must be given.
	#[serde(default)]
	pub x: Option<f64>,
	#[serde(default)]
	pub y: Option<f64>,
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: NodeId,
	/// Target node ID.
	pub target: NodeId,
	#[serde(default)]
	pub label: Option<String>,
	/// Optional CSS color override (e.g., "#ff0000" or "rgb(255, 0, 0)").
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub kind: LinkKind,
	/// Draw curved even when this is the only link between its endpoints.
	#[serde(default)]
	pub bidirectional: bool,
}

/// Complete graph data: nodes, links and optional simulation settings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<GraphLink>,
	#[serde(default)]
	pub config: Option<SimulationConfig>,
}

impl From<&GraphNode> for Node {
	fn from(data: &GraphNode) -> Self {
		let mut node = Node::new(data.id.clone(), data.radius);
		if let Some(label) = &data.label {
			node = node.with_label(label.clone());
		}
		if let Some(icon) = &data.icon {
			node = node.with_icon(icon.clone());
		}
		if let (Some(x), Some(y)) = (data.x, data.y) {
			node = node.with_position(x, y);
		}
		node
	}
}

impl From<&GraphLink> for LinkSpec {
	fn from(data: &GraphLink) -> Self {
		let mut spec = LinkSpec::new(data.source.clone(), data.target.clone()).with_style(LinkStyle {
			color: data.color.clone(),
			kind: data.kind,
		});
		if let Some(label) = &data.label {
			spec = spec.with_label(label.clone());
		}
		if data.bidirectional {
			spec = spec.bidirectional();
		}
		spec
	}
}

impl GraphData {
	/// The three-person graph shown when the page carries no dataset.
	pub fn sample() -> Self {
		let node = |id: &str, radius: f64| GraphNode {
			id: id.into(),
			radius,
			label: None,
			icon: None,
			x: None,
			y: None,
		};
		let link = |source: &str, target: &str| GraphLink {
			source: source.into(),
			target: target.into(),
			label: None,
			color: None,
			kind: LinkKind::Solid,
			bidirectional: false,
		};
		Self {
			nodes: vec![node("Alice", 40.0), node("Bob", 35.0), node("Carol", 35.0)],
			links: vec![link("Alice", "Bob"), link("Bob", "Alice"), link("Bob", "Carol")],
			config: None,
		}
	}

	/// Engine inputs for this dataset.
	pub fn to_parts(&self) -> (Vec<Node>, Vec<LinkSpec>) {
		(
			self.nodes.iter().map(Node::from).collect(),
			self.links.iter().map(LinkSpec::from).collect(),
		)
	}

	/// Settings for a canvas of the given size. Centre coordinates the dataset
	/// leaves out default to the middle of the canvas.
	pub fn config_for(&self, width: f64, height: f64) -> SimulationConfig {
		self.config
			.clone()
			.unwrap_or_default()
			.with_default_center(width / 2.0, height / 2.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_the_dom_dataset() {
		let data: GraphData = serde_json::from_str(
			r##"{
				"nodes": [
					{ "id": "Alice", "radius": 40, "icon": "alice.png", "x": 10, "y": 20 },
					{ "id": 7 }
				],
				"links": [
					{ "source": "Alice", "target": 7, "label": "knows", "kind": "dashed", "color": "#f00" }
				],
				"config": { "linkDistance": 200, "chargeStrength": -60 }
			}"##,
		)
		.unwrap();

		let (nodes, links) = data.to_parts();
		assert_eq!(nodes[0].position(), (10.0, 20.0));
		assert!(nodes[0].is_placed());
		assert_eq!(nodes[0].icon.as_deref(), Some("alice.png"));
		assert_eq!(nodes[1].id, NodeId::Int(7));
		assert_eq!(nodes[1].radius, 30.0);
		assert!(!nodes[1].is_placed());

		assert_eq!(links[0].target, NodeId::Int(7));
		assert_eq!(links[0].style.kind, LinkKind::Dashed);
		assert_eq!(links[0].style.color.as_deref(), Some("#f00"));
		assert_eq!(links[0].label.as_deref(), Some("knows"));

		let config = data.config_for(800.0, 600.0);
		assert_eq!(config.link_distance, Some(200.0));
		assert_eq!(config.charge_strength, -60.0);
		assert_eq!(config.collision_padding, 5.0);
	}

	#[test]
	fn missing_config_centres_on_the_canvas() {
		let config = GraphData::sample().config_for(800.0, 600.0);
		assert_eq!(config.center(), (400.0, 300.0));
	}

	#[test]
	fn partial_config_still_centres_on_the_canvas() {
		let data: GraphData =
			serde_json::from_str(r#"{ "nodes": [], "links": [], "config": { "linkDistance": 200 } }"#)
				.unwrap();
		let config = data.config_for(1920.0, 1080.0);
		assert_eq!(config.link_distance, Some(200.0));
		assert_eq!(config.center(), (960.0, 540.0));

		let data: GraphData =
			serde_json::from_str(r#"{ "nodes": [], "links": [], "config": { "centerX": 10 } }"#)
				.unwrap();
		assert_eq!(data.config_for(1920.0, 1080.0).center(), (10.0, 540.0));
	}
}
