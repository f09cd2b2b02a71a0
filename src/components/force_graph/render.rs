//! Canvas rendering for the force graph.
//!
//! Draws the [`Scene`] published by the simulation. Rendering uses multiple
//! passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, arrowheads, then link labels (world space)
//! 3. Nodes with their images, then node labels

use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement, Path2d};

use super::scale::{ScaleConfig, ScaledValues};
use super::state::ForceGraphState;
use super::theme::Theme;
use crate::geometry::Point;
use crate::simulation::LinkKind;
use crate::sync::{EdgeFrame, NodeFrame};

/// Node images by URL. Images load asynchronously; until one is ready its node
/// is filled with a palette color.
#[derive(Default)]
pub struct ImageCache {
	images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
	fn get(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(url) {
			match HtmlImageElement::new() {
				Ok(image) => {
					image.set_src(url);
					self.images.insert(url.to_owned(), image);
				}
				Err(e) => {
					warn!("force-graph: cannot create image for {url}: {e:?}");
					return None;
				}
			}
		}
		self.images
			.get(url)
			.filter(|image| image.complete() && image.natural_width() > 0)
	}

	/// Whether any image is still being fetched.
	pub fn loading(&self) -> bool {
		self.images.values().any(|image| !image.complete())
	}
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	images: &mut ImageCache,
) {
	let view = state.view();
	let scale = ScaledValues::new(config, view.k);

	let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	// A renderer never waits for the simulation; a tick in progress is skipped.
	let Ok(scene) = state.scene.try_borrow() else {
		return;
	};

	ctx.save();
	let _ = ctx.translate(view.x, view.y);
	let _ = ctx.scale(view.k, view.k);

	for edge in &scene.edges {
		draw_edge(ctx, edge, &scale, theme);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	for edge in &scene.edges {
		draw_edge_label(ctx, edge, &scale, theme);
	}

	for (i, node) in scene.nodes.iter().enumerate() {
		draw_node(ctx, node, i, &scale, theme, images);
	}

	ctx.restore();
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeFrame, scale: &ScaledValues, theme: &Theme) {
	let Ok(path) = Path2d::new_with_path_string(&edge.svg) else {
		return;
	};
	let color = theme.edge_color(edge.style.color.as_deref());

	ctx.set_stroke_style_str(&color);
	ctx.set_line_width(scale.edge_line_width);
	match edge.style.kind {
		LinkKind::Solid => {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
		LinkKind::Dashed => {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(scale.dash_pattern.0),
				&JsValue::from_f64(scale.dash_pattern.1),
			));
		}
	}
	ctx.stroke_with_path(&path);

	let tip = edge.path.arrow_tip(scale.arrow_length);
	let (ux, uy) = edge.path.end_direction();
	let back = Point::new(tip.x - ux * scale.arrow_length, tip.y - uy * scale.arrow_length);
	let (px, py) = (-uy * scale.arrow_half_width, ux * scale.arrow_half_width);

	ctx.set_fill_style_str(&color);
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back.x + px, back.y + py);
	ctx.line_to(back.x - px, back.y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, edge: &EdgeFrame, scale: &ScaledValues, theme: &Theme) {
	let Some(label) = &edge.label else {
		return;
	};
	ctx.save();
	let _ = ctx.translate(label.position.x, label.position.y);
	let _ = ctx.rotate(label.angle);
	ctx.set_font(&scale.edge_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("bottom");
	ctx.set_fill_style_str(&theme.edge.label_color.to_css());
	let _ = ctx.fill_text(&label.text, 0.0, -scale.edge_line_width);
	ctx.restore();
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &NodeFrame,
	index: usize,
	scale: &ScaledValues,
	theme: &Theme,
	images: &mut ImageCache,
) {
	let (x, y, r) = (node.x, node.y, node.radius);

	ctx.begin_path();
	let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&theme.node_fill(index).to_css());
	ctx.fill();

	let image = match node.icon.as_deref() {
		Some(url) => images.get(url),
		None => None,
	};
	if let Some(image) = image {
		ctx.save();
		ctx.begin_path();
		let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		ctx.clip();
		let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
			image,
			x - r,
			y - r,
			2.0 * r,
			2.0 * r,
		);
		ctx.restore();
	}

	if theme.node.border_color.a > 0.0 {
		ctx.begin_path();
		let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(scale.border_width);
		ctx.stroke();
	}

	ctx.set_font(&scale.node_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	let _ = ctx.fill_text(&node.label, x, y + r + scale.label_gap);
}
