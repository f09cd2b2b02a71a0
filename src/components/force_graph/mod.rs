//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - Physics-based node positioning via [`crate::simulation`]
//! - Straight, curved and self-loop links with arrowheads and labels
//! - Pan, zoom, and node dragging interactions
//! - Configurable theming and visual scaling
//!
//! # Example
//!
//! ```ignore
//! use rel_graph::{ForceGraphCanvas, GraphData};
//!
//! let data: GraphData = serde_json::from_str(r#"{
//!     "nodes": [{ "id": "Alice", "radius": 40 }, { "id": "Bob", "radius": 35 }],
//!     "links": [{ "source": "Alice", "target": "Bob", "label": "knows" }]
//! }"#)?;
//!
//! view! { <ForceGraphCanvas data=Signal::stored(data) fullscreen=true /> }
//! ```

mod component;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;

pub use component::ForceGraphCanvas;
pub use state::ForceGraphState;
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode};
