use leptos::html::Input;
use leptos::prelude::*;
use web_sys::{KeyboardEvent, MouseEvent};

use super::types::HandleKind;

pub const PLACEHOLDER: &str = "Click to edit";

/// Inline-editable caption next to a handle. Click to edit; Enter or
/// focus loss commits.
#[component]
pub fn HandleLabel(
	#[prop(into)] label: Option<String>,
	kind: HandleKind,
	#[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
	let (editing, set_editing) = signal(false);
	let (text, set_text) = signal(label.unwrap_or_default());
	let input_ref = NodeRef::<Input>::new();

	let commit = move || {
		if editing.get_untracked() {
			set_editing.set(false);
			on_change.run(text.get_untracked());
		}
	};

	Effect::new(move |_| {
		if let Some(input) = input_ref.get() {
			let _ = input.focus();
		}
	});

	let align = match kind {
		HandleKind::Input => "text-right",
		HandleKind::Output => "text-left",
	};

	view! {
		<Show
			when=move || editing.get()
			fallback=move || {
				view! {
					<div
						class=format!("handle-label {}", align)
						on:mousedown=|ev: MouseEvent| ev.stop_propagation()
						on:click=move |_| set_editing.set(true)
					>
						{move || {
							let current = text.get();
							if current.is_empty() { PLACEHOLDER.to_string() } else { current }
						}}
					</div>
				}
			}
		>
			<input
				node_ref=input_ref
				type="text"
				class=format!("handle-label handle-label--editing {}", align)
				prop:value=move || text.get()
				on:input=move |ev| set_text.set(event_target_value(&ev))
				on:blur=move |_| commit()
				on:keydown=move |ev: KeyboardEvent| {
					ev.stop_propagation();
					if ev.key() == "Enter" {
						commit();
					}
				}
				on:mousedown=|ev: MouseEvent| ev.stop_propagation()
			/>
		</Show>
	}
}
