use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::JsCast;
use web_sys::{ErrorEvent, Event, HtmlIFrameElement, MouseEvent};

use super::component::FlowContext;
use super::geometry::{
	HANDLE_OFFSET, LABEL_VERTICAL_OFFSET, LABEL_WIDTH, add_button_percent, handle_offset_percent,
};
use super::handle_label::HandleLabel;
use super::types::{HandleKind, NodeId};

const BLOCKED_MESSAGE: &str = "This website cannot be embedded due to security restrictions.";
const LOAD_FAILED_MESSAGE: &str = "Failed to load the website. Please check the URL.";
const SANDBOX: &str = "allow-same-origin allow-scripts allow-popups allow-forms";

/// One embedded page: a titled, resizable, collapsible box with connection
/// handles on both sides.
#[component]
pub fn IframeNode(ctx: FlowContext, id: NodeId) -> impl IntoView {
	let state = ctx.state;
	let node = Memo::new(move |_| state.with(|s| s.node(id).cloned()));
	let label = Memo::new(move |_| {
		node.with(|n| n.as_ref().map(|n| n.label.clone()).unwrap_or_default())
	});
	let url = Memo::new(move |_| {
		node.with(|n| n.as_ref().map(|n| n.url.clone()).unwrap_or_default())
	});
	let collapsed = Memo::new(move |_| node.with(|n| n.as_ref().is_some_and(|n| n.collapsed)));
	let selected = Memo::new(move |_| node.with(|n| n.as_ref().is_some_and(|n| n.selected)));
	let (load_error, set_load_error) = signal(String::new());

	let frame_style = move || {
		node.with(|n| {
			n.as_ref()
				.map(|n| {
					format!(
						"left: {}px; top: {}px; width: {}px; height: {}px;",
						n.position.x, n.position.y, n.size.width, n.size.height
					)
				})
				.unwrap_or_default()
		})
	};

	let on_select = move |ev: MouseEvent| {
		ev.stop_propagation();
		state.update(|s| s.select(id));
	};

	let on_header_down = move |ev: MouseEvent| {
		ev.stop_propagation();
		if ev.button() != 0 {
			return;
		}
		if let Some((x, y)) = ctx.local_point(&ev) {
			state.update(|s| s.begin_node_drag(id, x, y));
		}
	};

	let on_resize_down = move |ev: MouseEvent| {
		ev.stop_propagation();
		ev.prevent_default();
		if let Some((x, y)) = ctx.local_point(&ev) {
			state.update(|s| s.begin_resize(id, x, y));
		}
	};

	let on_toggle = move |_| {
		state.update(|s| {
			if let Some(now) = s.toggle_collapse(id) {
				debug!("Node {} collapsed: {}", id, now);
			}
		});
	};

	let on_load = move |ev: Event| {
		set_load_error.set(String::new());
		let window = ev
			.target()
			.and_then(|t| t.dyn_into::<HtmlIFrameElement>().ok())
			.and_then(|frame| frame.content_window());
		if window.is_none() {
			error!("Iframe error in node {}: cannot access iframe content", id);
			set_load_error.set(BLOCKED_MESSAGE.to_string());
		}
	};

	let on_error = move |_: ErrorEvent| {
		warn!("Node {} failed to load {}", id, url.get_untracked());
		set_load_error.set(LOAD_FAILED_MESSAGE.to_string());
	};

	view! {
		<div
			class="frame-node"
			class:selected=move || selected.get()
			data-id=id.to_string()
			style=frame_style
			on:mousedown=on_select
		>
			<Show when=move || selected.get()>
				<div class="node-resizer" title="Resize" on:mousedown=on_resize_down></div>
			</Show>

			<HandleColumn ctx=ctx id=id kind=HandleKind::Input collapsed=collapsed />
			<HandleColumn ctx=ctx id=id kind=HandleKind::Output collapsed=collapsed />

			<div class="frame-node__content">
				<div class="frame-node__header" on:mousedown=on_header_down>
					<h3>{move || label.get()}</h3>
					<button
						class="frame-node__toggle"
						aria-label=move || if collapsed.get() { "Expand" } else { "Collapse" }
						on:mousedown=|ev: MouseEvent| ev.stop_propagation()
						on:click=on_toggle
					>
						<span class="chevron" class:collapsed=move || collapsed.get()>
							"▾"
						</span>
					</button>
				</div>
				<Show when=move || !collapsed.get()>
					<div class="frame-node__body">
						<Show when=move || !load_error.get().is_empty()>
							<div class="frame-node__warning">
								<span>"⚠"</span>
								<span>{move || load_error.get()}</span>
							</div>
						</Show>
						<iframe
							src=move || url.get()
							title=move || label.get()
							sandbox=SANDBOX
							on:load=on_load
							on:error=on_error
						></iframe>
						<div class="frame-node__url">"Current URL: " {move || url.get()}</div>
					</div>
				</Show>
			</div>
		</div>
	}
}

/// Input handles down the left border, or output handles down the right,
/// followed by a "+" button that appends another.
#[component]
fn HandleColumn(
	ctx: FlowContext,
	id: NodeId,
	kind: HandleKind,
	collapsed: Memo<bool>,
) -> impl IntoView {
	let state = ctx.state;
	let handles = Memo::new(move |_| {
		state.with(|s| {
			s.node(id)
				.map(|n| n.handles(kind).to_vec())
				.unwrap_or_default()
		})
	});
	let total = Signal::derive(move || handles.with(Vec::len));

	let (side, title) = match kind {
		HandleKind::Input => ("left", "Add input"),
		HandleKind::Output => ("right", "Add output"),
	};
	let button_style = move || {
		format!(
			"{}: -{}px; top: {}%;",
			side,
			HANDLE_OFFSET,
			add_button_percent(total.get(), collapsed.get())
		)
	};

	view! {
		<div class=format!("handle-column handle-column--{}", side)>
			<For
				each=move || handles.get()
				key=|index| *index
				children=move |index| {
					view! {
						<HandleRow
							ctx=ctx
							id=id
							kind=kind
							index=index
							total=total
							collapsed=collapsed
						/>
					}
				}
			/>
			<button
				class="handle-add"
				title=title
				style=button_style
				on:mousedown=|ev: MouseEvent| ev.stop_propagation()
				on:click=move |_| {
					state.update(|s| {
						s.add_handle(id, kind);
					});
				}
			>
				"+"
			</button>
		</div>
	}
}

/// A single connection point with its editable label. Dragging from an
/// output and releasing over an input creates an edge.
#[component]
fn HandleRow(
	ctx: FlowContext,
	id: NodeId,
	kind: HandleKind,
	index: usize,
	total: Signal<usize>,
	collapsed: Memo<bool>,
) -> impl IntoView {
	let state = ctx.state;
	let row_style = move || {
		format!(
			"top: {}%;",
			handle_offset_percent(index, total.get(), collapsed.get())
		)
	};
	let label = state.with_untracked(|s| {
		s.node(id)
			.and_then(|n| n.label_for(kind, index))
			.map(str::to_owned)
	});
	let on_change = Callback::new(move |text: String| {
		state.update(|s| {
			s.set_handle_label(id, kind, index, text);
		});
	});

	let label_box = match kind {
		HandleKind::Input => "right",
		HandleKind::Output => "left",
	};
	let (dot_side, dot_class) = match kind {
		HandleKind::Input => ("left", "handle handle--target"),
		HandleKind::Output => ("right", "handle handle--source"),
	};
	let dot_style = format!("{}: -{}px;", dot_side, HANDLE_OFFSET);
	let label_style = format!(
		"{}: {}px; top: {}px; width: {}px;",
		label_box,
		HANDLE_OFFSET + 4.0,
		LABEL_VERTICAL_OFFSET,
		LABEL_WIDTH
	);

	let on_down = move |ev: MouseEvent| {
		ev.stop_propagation();
		if kind != HandleKind::Output || ev.button() != 0 {
			return;
		}
		ev.prevent_default();
		if let Some((x, y)) = ctx.local_point(&ev) {
			state.update(|s| s.begin_connection(id, index, x, y));
		}
	};

	let on_up = move |_: MouseEvent| {
		if kind == HandleKind::Input {
			state.update(|s| {
				s.complete_connection(id, index);
			});
		}
	};

	view! {
		<div class="handle-row" style=row_style>
			<div
				class=dot_class
				data-handleid=kind.handle_id(index)
				style=dot_style
				on:mousedown=on_down
				on:mouseup=on_up
			></div>
			<div class="handle-label-box" style=label_style>
				<HandleLabel label=label kind=kind on_change=on_change />
			</div>
		</div>
	}
}
