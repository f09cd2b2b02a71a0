//! Node and link records, and resolution of link endpoints into the node table.
//!
//! Links never hold pointers to nodes. After [`resolve`] each link stores the
//! indices of its endpoints in the owned node table, which every other part of
//! the engine uses for lookups.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use super::error::ConstructionError;

/// Stable identifier of a node. Datasets use either strings or integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Integer id, e.g. generated datasets.
	Int(i64),
	/// String id, e.g. a person's name.
	Str(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(id) => write!(f, "{id}"),
			Self::Str(id) => f.write_str(id),
		}
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self::Str(id.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(id: String) -> Self {
		Self::Str(id)
	}
}

impl From<i64> for NodeId {
	fn from(id: i64) -> Self {
		Self::Int(id)
	}
}

/// A node of the simulated graph.
///
/// Position and velocity are owned by the simulation. `fixed` is the only field
/// written from outside, through [`Simulation::pin`](super::Simulation::pin).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	/// Position in the node table, assigned by [`resolve`].
	pub index: usize,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned position. While set, integration snaps the node here.
	pub fixed: Option<(f64, f64)>,
	pub radius: f64,
	pub label: Option<String>,
	/// Opaque reference to the node's image, e.g. a URL.
	pub icon: Option<String>,
	placed: bool,
}

impl Node {
	/// Creates an unplaced node. The simulation will seed its position.
	pub fn new(id: impl Into<NodeId>, radius: f64) -> Self {
		Self {
			id: id.into(),
			index: 0,
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			fixed: None,
			radius,
			label: None,
			icon: None,
			placed: false,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	/// Seeds the initial position instead of using the spiral placement.
	pub fn with_position(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self.placed = true;
		self
	}

	/// Whether an initial position has been assigned.
	pub fn is_placed(&self) -> bool {
		self.placed
	}

	pub(crate) fn mark_placed(&mut self, x: f64, y: f64) {
		self.x = x;
		self.y = y;
		self.placed = true;
	}

	/// Current position, as `(x, y)`.
	pub fn position(&self) -> (f64, f64) {
		(self.x, self.y)
	}
}

/// Stroke type of a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
	#[default]
	Solid,
	Dashed,
}

/// Visual tag of a link: an optional colour override and the stroke type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LinkStyle {
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub kind: LinkKind,
}

/// A link as supplied by the dataset, referencing nodes by id.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSpec {
	pub source: NodeId,
	pub target: NodeId,
	pub label: Option<String>,
	pub style: LinkStyle,
	/// Forces the curved representation even for a single edge.
	pub bidirectional: bool,
}

impl LinkSpec {
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			label: None,
			style: LinkStyle::default(),
			bidirectional: false,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_style(mut self, style: LinkStyle) -> Self {
		self.style = style;
		self
	}

	pub fn bidirectional(mut self) -> Self {
		self.bidirectional = true;
		self
	}
}

/// Identifies a link within one simulation. Used to address render primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "link-{}", self.0)
	}
}

/// How a link is drawn. Decided once, at resolution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkShape {
	/// The only edge between its endpoints.
	Straight,
	/// One of several edges between the same pair, or marked bidirectional.
	Curved,
	/// Source and target are the same node.
	SelfLoop,
}

/// A link whose endpoints have been resolved into node table indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub id: LinkId,
	pub source: usize,
	pub target: usize,
	pub label: Option<String>,
	pub style: LinkStyle,
	pub shape: LinkShape,
}

impl Link {
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Output of [`resolve`]: the node table, its links and the id lookup.
#[derive(Clone, Debug)]
pub struct ResolvedGraph {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
	index: HashMap<NodeId, usize>,
}

impl ResolvedGraph {
	/// Looks up the table index of a node id.
	pub fn index_of(&self, id: &NodeId) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Number of links touching each node, self-loops excluded.
	pub fn degrees(&self) -> Vec<usize> {
		degrees(self.nodes.len(), &self.links)
	}
}

pub(crate) fn degrees(node_count: usize, links: &[Link]) -> Vec<usize> {
	let mut degrees = vec![0; node_count];
	for link in links.iter().filter(|l| !l.is_self_loop()) {
		degrees[link.source] += 1;
		degrees[link.target] += 1;
	}
	degrees
}

/// Validates the node list and replaces link endpoint ids by node indices.
///
/// Nodes keep their input order; `Node::index` is set to that order. Links get
/// sequential [`LinkId`]s and a [`LinkShape`] derived from how many links share
/// the same unordered pair of endpoints.
pub fn resolve(mut nodes: Vec<Node>, links: Vec<LinkSpec>) -> Result<ResolvedGraph, ConstructionError> {
	let mut index = HashMap::with_capacity(nodes.len());
	for (i, node) in nodes.iter_mut().enumerate() {
		if node.radius.is_nan() || node.radius <= 0.0 {
			return Err(ConstructionError::NonPositiveRadius {
				node: node.id.clone(),
				radius: node.radius,
			});
		}
		if index.insert(node.id.clone(), i).is_some() {
			return Err(ConstructionError::DuplicateNodeId(node.id.clone()));
		}
		node.index = i;
	}

	let lookup = |link: usize, id: &NodeId| {
		index
			.get(id)
			.copied()
			.ok_or_else(|| ConstructionError::UnknownNodeReference {
				link,
				node: id.clone(),
			})
	};

	let mut endpoints = Vec::with_capacity(links.len());
	let mut pair_counts: HashMap<(usize, usize), usize> = HashMap::new();
	for (i, spec) in links.iter().enumerate() {
		let (source, target) = (lookup(i, &spec.source)?, lookup(i, &spec.target)?);
		*pair_counts
			.entry((source.min(target), source.max(target)))
			.or_insert(0) += 1;
		endpoints.push((source, target));
	}

	let links = links
		.into_iter()
		.zip(endpoints)
		.enumerate()
		.map(|(i, (spec, (source, target)))| {
			let shape = if source == target {
				LinkShape::SelfLoop
			} else if spec.bidirectional || pair_counts[&(source.min(target), source.max(target))] > 1 {
				LinkShape::Curved
			} else {
				LinkShape::Straight
			};
			Link {
				id: LinkId(i),
				source,
				target,
				label: spec.label,
				style: spec.style,
				shape,
			}
		})
		.collect();

	Ok(ResolvedGraph { nodes, links, index })
}
