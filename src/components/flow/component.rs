use leptos::ev;
use leptos::html::Div;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::controls::{Controls, MiniMap};
use super::geometry::edge_path;
use super::node::IframeNode;
use super::state::FlowState;

/// Spacing of the background dot grid at zoom 1.
const GRID_SIZE: f64 = 20.0;

/// Handles shared by every widget on the canvas.
#[derive(Clone, Copy)]
pub struct FlowContext {
	pub state: RwSignal<FlowState>,
	pub container: NodeRef<Div>,
}

impl FlowContext {
	/// Pointer position relative to the canvas element.
	pub fn local_point(&self, ev: &MouseEvent) -> Option<(f64, f64)> {
		let el = self.container.get_untracked()?;
		let rect = el.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	}
}

/// Pannable, zoomable surface holding the frame nodes and the edges between
/// them.
#[component]
pub fn FlowCanvas(state: RwSignal<FlowState>) -> impl IntoView {
	let container = NodeRef::<Div>::new();
	let ctx = FlowContext { state, container };

	let measure = move || {
		if let Some(el) = container.get_untracked() {
			let (w, h) = (el.client_width() as f64, el.client_height() as f64);
			state.update(|s| s.resize(w, h));
		}
	};

	Effect::new(move |_| {
		if container.get().is_some() {
			measure();
			state.update(|s| s.fit_view());
		}
	});

	let resize_handle = window_event_listener(ev::resize, move |_| measure());
	let key_handle = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		let typing = ev
			.target()
			.is_some_and(|t| t.dyn_ref::<HtmlInputElement>().is_some());
		if typing {
			return;
		}
		if matches!(ev.key().as_str(), "Delete" | "Backspace") {
			state.update(|s| {
				if s.remove_selected() {
					log::info!("Deleted selection");
				}
			});
		}
	});
	on_cleanup(move || {
		resize_handle.remove();
		key_handle.remove();
	});

	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		if let Some((x, y)) = ctx.local_point(&ev) {
			state.update(|s| s.begin_pan(x, y));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if !state.with_untracked(|s| s.is_interacting()) {
			return;
		}
		if let Some((x, y)) = ctx.local_point(&ev) {
			state.update(|s| s.drag_to(x, y));
		}
	};

	let on_release = move |_: MouseEvent| {
		if state.with_untracked(|s| s.is_interacting()) {
			state.update(|s| s.end_interaction());
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = ctx.local_point(&ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		state.update(|s| s.zoom_at(x, y, factor));
	};

	let background = move || {
		state.with(|s| {
			let grid = GRID_SIZE * s.viewport.zoom;
			format!(
				"background-size: {grid}px {grid}px; background-position: {}px {}px;",
				s.viewport.x, s.viewport.y
			)
		})
	};

	let transform = move || {
		state.with(|s| {
			format!(
				"transform: translate({}px, {}px) scale({});",
				s.viewport.x, s.viewport.y, s.viewport.zoom
			)
		})
	};

	let edges = move || {
		state.with(|s| {
			s.edges
				.iter()
				.filter_map(|edge| {
					let (from, to) = s.edge_endpoints(edge)?;
					let selected = s.selected_edge.as_deref() == Some(edge.id.as_str());
					let id = edge.id.clone();
					Some(view! {
						<path
							d=edge_path(from, to)
							class=if selected { "flow-edge selected" } else { "flow-edge" }
							on:mousedown=move |ev: MouseEvent| {
								ev.stop_propagation();
								state.update(|s| s.select_edge(&id));
							}
						/>
					})
				})
				.collect_view()
		})
	};

	let pending = move || {
		state
			.with(|s| s.pending_connection())
			.map(|(from, to)| view! { <path d=edge_path(from, to) class="flow-edge pending" /> })
	};

	view! {
		<div
			node_ref=container
			class=move || {
				if state.with(|s| s.is_interacting()) { "flow flow--interacting" } else { "flow" }
			}
			style=background
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_release
			on:mouseleave=on_release
			on:wheel=on_wheel
		>
			<div class="flow-viewport" style=transform>
				<svg class="flow-edges">{edges} {pending}</svg>
				<For
					each=move || state.with(|s| s.node_ids())
					key=|id| *id
					children=move |id| view! { <IframeNode ctx=ctx id=id /> }
				/>
			</div>
			<Controls state=state />
			<MiniMap state=state />
		</div>
	}
}
