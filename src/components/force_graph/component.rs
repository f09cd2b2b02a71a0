//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, panning, and zooming. A `requestAnimationFrame`
//! loop ticks the simulation and redraws; it stops requesting frames once the
//! layout has converged and nothing changed, and any interaction re-arms it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render::{self, ImageCache};
use super::scale::ScaleConfig;
use super::state::ForceGraphState;
use super::theme::Theme;
use super::types::GraphData;

/// Bundles graph state with its drawing surface and visual configuration.
struct GraphContext {
	state: ForceGraphState,
	canvas: CanvasRenderingContext2d,
	scale: ScaleConfig,
	theme: Theme,
	images: ImageCache,
}

/// The component's single animation frame loop.
#[derive(Clone, Default)]
struct FrameLoop {
	callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	pending: Rc<Cell<bool>>,
}

impl FrameLoop {
	/// Schedules the next frame unless one is already pending.
	fn request(&self) {
		if self.pending.get() {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref cb) = *self.callback.borrow() {
			if window.request_animation_frame(cb.as_ref().unchecked_ref()).is_ok() {
				self.pending.set(true);
			}
		}
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Pointer position relative to the canvas' top-left corner.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal; every change discards the
/// current layout and starts a new simulation with a reset view. The component
/// sizes itself to its parent container by default; set `fullscreen = true` to
/// fill the viewport and resize automatically with the window. Explicit
/// `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] theme: Option<Theme>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let frames = FrameLoop::default();
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, frames_init, resize_cb_init) =
		(context.clone(), frames.clone(), resize_cb.clone());
	let theme = theme.unwrap_or_default();

	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = match (fullscreen, window_size(&window)) {
			(true, Some(size)) => size,
			_ => (
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			),
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("force-graph: 2d context has an unexpected type");
					return;
				}
			},
			_ => {
				error!("force-graph: canvas has no 2d context");
				return;
			}
		};

		{
			let mut slot = context_init.borrow_mut();
			if let Some(old) = slot.as_mut() {
				old.state.shutdown();
			}
			*slot = match ForceGraphState::new(&data, w, h) {
				Ok(state) => {
					info!(
						"force-graph: {} nodes, {} links on a {w}x{h} canvas",
						data.nodes.len(),
						data.links.len()
					);
					Some(GraphContext {
						state,
						canvas: ctx,
						scale: ScaleConfig::default(),
						theme: theme.clone(),
						images: ImageCache::default(),
					})
				}
				Err(e) => {
					error!("force-graph: cannot lay out graph: {e}");
					None
				}
			};
		}

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (context_resize, frames_resize) = (context_init.clone(), frames_init.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas.set_width(nw as u32);
				canvas.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
				frames_resize.request();
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		if frames_init.callback.borrow().is_none() {
			let (context_anim, frames_inner) = (context_init.clone(), frames_init.clone());
			*frames_init.callback.borrow_mut() = Some(Closure::new(move || {
				frames_inner.pending.set(false);
				let again = match *context_anim.borrow_mut() {
					Some(ref mut c) => {
						if c.state.frame() {
							render::render(&c.state, &c.canvas, &c.scale, &c.theme, &mut c.images);
						}
						if c.images.loading() {
							c.state.invalidate();
						}
						c.state.needs_frame()
					}
					None => false,
				};
				if again {
					frames_inner.request();
				}
			}));
		}
		frames_init.request();
	});

	let (context_md, frames_md) = (context.clone(), frames.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.pointer_down(x, y);
		}
		frames_md.request();
	};

	let (context_mm, frames_mm) = (context.clone(), frames.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.pointer_move(x, y);
			if let Some(canvas) = canvas_ref.get() {
				let cursor = if c.state.is_over_node(x, y) { "pointer" } else { "grab" };
				let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
			}
		}
		frames_mm.request();
	};

	let (context_mu, frames_mu) = (context.clone(), frames.clone());
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.state.pointer_up();
		}
		frames_mu.request();
	};

	let (context_ml, frames_ml) = (context.clone(), frames.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pointer_leave();
		}
		frames_ml.request();
	};

	let (context_wh, frames_wh) = (context.clone(), frames.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.wheel(x, y, ev.delta_y());
		}
		frames_wh.request();
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
