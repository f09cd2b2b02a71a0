//! Construction-time failures. These are fatal: a simulation is never built
//! from a dataset that produces one of them.

use super::graph::NodeId;

/// Why a dataset or configuration could not be turned into a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
	/// A link names a node id that is not part of the node list.
	#[error("link #{link} references unknown node `{node}`")]
	UnknownNodeReference {
		/// Position of the offending link in the input list.
		link: usize,
		/// The id that failed to resolve.
		node: NodeId,
	},

	/// Two nodes share the same id.
	#[error("duplicate node id `{0}`")]
	DuplicateNodeId(NodeId),

	/// A node radius is zero, negative or not a number.
	#[error("node `{node}` has non-positive radius {radius}")]
	NonPositiveRadius {
		/// The offending node.
		node: NodeId,
		/// The radius that was supplied.
		radius: f64,
	},

	/// A simulation parameter is outside of its valid range.
	#[error("invalid simulation config `{field}`: {reason}")]
	InvalidConfig {
		/// Name of the parameter, as spelled in the JSON config.
		field: &'static str,
		/// Human readable constraint that was violated.
		reason: &'static str,
	},
}
