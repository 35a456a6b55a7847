use leptos::prelude::*;
use web_sys::MouseEvent;

use super::geometry::{self, node_rect};
use super::state::FlowState;

const ZOOM_STEP: f64 = 1.2;

/// Zoom and fit buttons in the bottom-left corner.
#[component]
pub fn Controls(state: RwSignal<FlowState>) -> impl IntoView {
	view! {
		<div class="flow-controls" on:mousedown=|ev: MouseEvent| ev.stop_propagation()>
			<button title="Zoom in" on:click=move |_| state.update(|s| s.zoom_by(ZOOM_STEP))>
				"+"
			</button>
			<button title="Zoom out" on:click=move |_| state.update(|s| s.zoom_by(1.0 / ZOOM_STEP))>
				"−"
			</button>
			<button title="Fit view" on:click=move |_| state.update(|s| s.fit_view())>
				"⤢"
			</button>
		</div>
	}
}

/// Overview of every node with the visible area outlined.
#[component]
pub fn MiniMap(state: RwSignal<FlowState>) -> impl IntoView {
	let view_box = move || {
		state.with(|s| {
			let visible = s.visible_rect();
			let area = geometry::bounds(&s.nodes)
				.map(|b| b.union(&visible))
				.unwrap_or(visible);
			format!(
				"{} {} {} {}",
				area.x,
				area.y,
				area.width.max(1.0),
				area.height.max(1.0)
			)
		})
	};

	let nodes = move || {
		state.with(|s| {
			s.nodes
				.iter()
				.map(|node| {
					let r = node_rect(node);
					let class = if node.selected {
						"minimap-node selected"
					} else {
						"minimap-node"
					};
					view! { <rect x=r.x y=r.y width=r.width height=r.height class=class /> }
				})
				.collect_view()
		})
	};

	let visible = move || {
		state.with(|s| {
			let r = s.visible_rect();
			view! {
				<rect class="minimap-viewport" x=r.x y=r.y width=r.width height=r.height />
			}
		})
	};

	view! {
		<svg
			class="flow-minimap"
			width="200"
			height="150"
			viewBox=view_box
			preserveAspectRatio="xMidYMid meet"
			on:mousedown=|ev: MouseEvent| ev.stop_propagation()
		>
			{nodes}
			{visible}
		</svg>
	}
}
