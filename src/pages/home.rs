use leptos::prelude::*;
use log::error;

use crate::components::flow::{FlowCanvas, FlowState, Position};
use crate::relay::{RELAY_URL, relay_src};

const DEFAULT_URL: &str = "https://example.com";
const BLANK_URL: &str = "about:blank";

/// Random spot in the upper-left of the graph for a new frame.
fn random_position() -> Position {
	Position::new(js_sys::Math::random() * 500.0, js_sys::Math::random() * 300.0)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let state = RwSignal::new(FlowState::with_example_nodes());
	let (via_relay, set_via_relay) = signal(false);

	let add_frame = move |url: String| {
		let position = random_position();
		state.update(|s| {
			s.add_node(url, position);
		});
	};

	let on_new_website = move |_| {
		let Some(window) = web_sys::window() else {
			return;
		};
		match window.prompt_with_message_and_default("Enter website URL:", DEFAULT_URL) {
			Ok(Some(url)) if !url.trim().is_empty() => {
				let url = url.trim();
				let src = if via_relay.get_untracked() {
					relay_src(RELAY_URL, url)
				} else {
					url.to_owned()
				};
				add_frame(src);
			}
			Ok(_) => {}
			Err(err) => {
				error!("Error creating node: {:?}", err);
				let _ = window
					.alert_with_message("Failed to create node. Check console for details.");
			}
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-flow">
				<FlowCanvas state=state />
				<div class="flow-toolbar">
					<label
						class="relay-toggle"
						title=format!("Fetch new frames through {}", RELAY_URL)
					>
						<input
							type="checkbox"
							prop:checked=move || via_relay.get()
							on:change=move |ev| set_via_relay.set(event_target_checked(&ev))
						/>
						"Via relay"
					</label>
					<button class="btn btn-primary" on:click=on_new_website>
						"+ New Website Frame"
					</button>
					<button
						class="btn btn-secondary"
						on:click=move |_| add_frame(BLANK_URL.to_string())
					>
						"+ Empty Frame"
					</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
