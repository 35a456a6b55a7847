use log::debug;

use super::geometry::{self, Rect, handle_anchor};
use super::types::{
	COLLAPSED_HEIGHT, Connection, Edge, FrameNode, HandleKind, MAX_ZOOM, MIN_NODE_WIDTH, MIN_ZOOM,
	NodeId, Position, Size, Viewport,
};

/// Fraction of the canvas left empty around the nodes by `fit_view`.
const FIT_PADDING: f64 = 0.1;

/// Pointer gesture in progress. Screen coordinates are relative to the
/// canvas element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interaction {
	#[default]
	Idle,
	DragNode {
		id: NodeId,
		start_x: f64,
		start_y: f64,
		origin: Position,
	},
	Pan {
		start_x: f64,
		start_y: f64,
		origin_x: f64,
		origin_y: f64,
	},
	Resize {
		id: NodeId,
		start_x: f64,
		start_y: f64,
		origin: Size,
	},
	Connect {
		source: NodeId,
		handle: usize,
		cursor: Position,
	},
}

/// View-state of the whole canvas: the node and edge collections plus the
/// viewport and whatever drag is in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowState {
	pub nodes: Vec<FrameNode>,
	pub edges: Vec<Edge>,
	pub viewport: Viewport,
	pub interaction: Interaction,
	pub selected_edge: Option<String>,
	pub width: f64,
	pub height: f64,
	next_id: u32,
}

impl Default for FlowState {
	fn default() -> Self {
		Self::new()
	}
}

impl FlowState {
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			viewport: Viewport::default(),
			interaction: Interaction::Idle,
			selected_edge: None,
			width: 0.0,
			height: 0.0,
			next_id: 1,
		}
	}

	/// Two example sites joined by one edge.
	pub fn with_example_nodes() -> Self {
		let mut state = Self::new();
		let first = state.push_node(
			"Example Website 1",
			"https://example.com",
			Position::new(100.0, 0.0),
		);
		let second = state.push_node(
			"Example Website 2",
			"https://example.org",
			Position::new(600.0, 0.0),
		);
		state.connect(Connection {
			source: first,
			source_handle: None,
			target: second,
			target_handle: None,
		});
		state
	}

	fn push_node(
		&mut self,
		label: impl Into<String>,
		url: impl Into<String>,
		position: Position,
	) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id += 1;
		self.nodes.push(FrameNode::new(id, label, url, position));
		id
	}

	pub fn node(&self, id: NodeId) -> Option<&FrameNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut FrameNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn node_ids(&self) -> Vec<NodeId> {
		self.nodes.iter().map(|n| n.id).collect()
	}

	/// Append a node labelled `Website <id>` showing `url`.
	pub fn add_node(&mut self, url: impl Into<String>, position: Position) -> NodeId {
		let url = url.into();
		let label = format!("Website {}", self.next_id);
		debug!("Adding {} for {}", label, url);
		self.push_node(label, url, position)
	}

	/// Remove a node and every edge attached to it.
	pub fn remove_node(&mut self, id: NodeId) -> bool {
		let before = self.nodes.len();
		self.nodes.retain(|n| n.id != id);
		if self.nodes.len() == before {
			return false;
		}
		self.edges.retain(|e| !e.touches(id));
		let dangling = self
			.selected_edge
			.as_ref()
			.is_some_and(|edge| !self.edges.iter().any(|e| &e.id == edge));
		if dangling {
			self.selected_edge = None;
		}
		if matches!(self.interaction_node(), Some(n) if n == id) {
			self.interaction = Interaction::Idle;
		}
		debug!("Removed node {}", id);
		true
	}

	/// Delete whatever is selected: the selected edge if any, else the
	/// selected node.
	pub fn remove_selected(&mut self) -> bool {
		if let Some(edge) = self.selected_edge.take() {
			return self.remove_edge(&edge);
		}
		match self.selected() {
			Some(id) => self.remove_node(id),
			None => false,
		}
	}

	/// Grow a node's input or output list by one handle. The new handle's
	/// index is the previous length of the list.
	pub fn add_handle(&mut self, id: NodeId, kind: HandleKind) -> Option<usize> {
		let node = self.node_mut(id)?;
		let handles = node.handles_mut(kind);
		let index = handles.len();
		handles.push(index);
		debug!("Node {} gained handle {}", id, kind.handle_id(index));
		Some(index)
	}

	pub fn set_handle_label(
		&mut self,
		id: NodeId,
		kind: HandleKind,
		index: usize,
		text: impl Into<String>,
	) -> bool {
		match self.node_mut(id) {
			Some(node) => {
				node.labels_mut(kind).insert(index, text.into());
				true
			}
			None => false,
		}
	}

	/// Add an edge. Duplicates, self-loops and dangling endpoints are ignored.
	pub fn connect(&mut self, conn: Connection) -> Option<String> {
		if conn.source == conn.target
			|| self.node(conn.source).is_none()
			|| self.node(conn.target).is_none()
			|| self.edges.iter().any(|e| e.same_endpoints(&conn))
		{
			return None;
		}
		let edge = Edge::from_connection(conn);
		let id = edge.id.clone();
		debug!("Connected {}", id);
		self.edges.push(edge);
		Some(id)
	}

	pub fn remove_edge(&mut self, id: &str) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| e.id != id);
		if self.selected_edge.as_deref() == Some(id) {
			self.selected_edge = None;
		}
		self.edges.len() != before
	}

	/// Collapse to a header bar, or restore the size saved when collapsing.
	/// Returns the new collapsed flag.
	pub fn toggle_collapse(&mut self, id: NodeId) -> Option<bool> {
		let node = self.node_mut(id)?;
		if node.collapsed {
			if let Some(size) = node.expanded_size.take() {
				node.size = size;
			}
			node.collapsed = false;
		} else {
			node.expanded_size = Some(node.size);
			node.size.height = COLLAPSED_HEIGHT;
			node.collapsed = true;
		}
		Some(node.collapsed)
	}

	pub fn select(&mut self, id: NodeId) {
		self.selected_edge = None;
		for node in &mut self.nodes {
			node.selected = node.id == id;
		}
	}

	pub fn select_edge(&mut self, id: &str) {
		for node in &mut self.nodes {
			node.selected = false;
		}
		self.selected_edge = self
			.edges
			.iter()
			.find(|e| e.id == id)
			.map(|e| e.id.clone());
	}

	pub fn clear_selection(&mut self) {
		self.selected_edge = None;
		for node in &mut self.nodes {
			node.selected = false;
		}
	}

	pub fn selected(&self) -> Option<NodeId> {
		self.nodes.iter().find(|n| n.selected).map(|n| n.id)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.viewport.x) / self.viewport.zoom,
			(sy - self.viewport.y) / self.viewport.zoom,
		)
	}

	pub fn graph_to_screen(&self, p: Position) -> (f64, f64) {
		(
			p.x * self.viewport.zoom + self.viewport.x,
			p.y * self.viewport.zoom + self.viewport.y,
		)
	}

	pub fn begin_node_drag(&mut self, id: NodeId, sx: f64, sy: f64) {
		let Some(origin) = self.node(id).map(|n| n.position) else {
			return;
		};
		self.select(id);
		self.interaction = Interaction::DragNode {
			id,
			start_x: sx,
			start_y: sy,
			origin,
		};
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.clear_selection();
		self.interaction = Interaction::Pan {
			start_x: sx,
			start_y: sy,
			origin_x: self.viewport.x,
			origin_y: self.viewport.y,
		};
	}

	pub fn begin_resize(&mut self, id: NodeId, sx: f64, sy: f64) {
		let Some(origin) = self.node(id).map(|n| n.size) else {
			return;
		};
		self.interaction = Interaction::Resize {
			id,
			start_x: sx,
			start_y: sy,
			origin,
		};
	}

	/// Start dragging a new edge out of an output handle.
	pub fn begin_connection(&mut self, source: NodeId, handle: usize, sx: f64, sy: f64) {
		if self.node(source).is_none() {
			return;
		}
		self.interaction = Interaction::Connect {
			source,
			handle,
			cursor: self.screen_to_graph(sx, sy),
		};
	}

	/// Drop a pending connection on an input handle.
	pub fn complete_connection(&mut self, target: NodeId, handle: usize) -> Option<String> {
		let Interaction::Connect {
			source,
			handle: source_handle,
			..
		} = self.interaction
		else {
			return None;
		};
		self.interaction = Interaction::Idle;
		self.connect(Connection {
			source,
			source_handle: Some(source_handle),
			target,
			target_handle: Some(handle),
		})
	}

	/// Pointer moved to `(sx, sy)` while a gesture may be active.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let zoom = self.viewport.zoom;
		match self.interaction {
			Interaction::Idle => {}
			Interaction::DragNode {
				id,
				start_x,
				start_y,
				origin,
			} => {
				if let Some(node) = self.node_mut(id) {
					node.position = Position::new(
						origin.x + (sx - start_x) / zoom,
						origin.y + (sy - start_y) / zoom,
					);
				}
			}
			Interaction::Pan {
				start_x,
				start_y,
				origin_x,
				origin_y,
			} => {
				self.viewport.x = origin_x + (sx - start_x);
				self.viewport.y = origin_y + (sy - start_y);
			}
			Interaction::Resize {
				id,
				start_x,
				start_y,
				origin,
			} => {
				if let Some(node) = self.node_mut(id) {
					let min_height = node.min_height();
					node.size = Size {
						width: (origin.width + (sx - start_x) / zoom).max(MIN_NODE_WIDTH),
						height: (origin.height + (sy - start_y) / zoom).max(min_height),
					};
				}
			}
			Interaction::Connect { source, handle, .. } => {
				self.interaction = Interaction::Connect {
					source,
					handle,
					cursor: self.screen_to_graph(sx, sy),
				};
			}
		}
	}

	/// Pointer released or left the canvas. Unfinished connections are dropped.
	pub fn end_interaction(&mut self) {
		self.interaction = Interaction::Idle;
	}

	pub fn is_interacting(&self) -> bool {
		self.interaction != Interaction::Idle
	}

	fn interaction_node(&self) -> Option<NodeId> {
		match self.interaction {
			Interaction::DragNode { id, .. } | Interaction::Resize { id, .. } => Some(id),
			Interaction::Connect { source, .. } => Some(source),
			_ => None,
		}
	}

	/// Endpoints of the edge being dragged out, if any.
	pub fn pending_connection(&self) -> Option<(Position, Position)> {
		let Interaction::Connect {
			source,
			handle,
			cursor,
		} = self.interaction
		else {
			return None;
		};
		let node = self.node(source)?;
		Some((handle_anchor(node, HandleKind::Output, handle), cursor))
	}

	/// Graph-space endpoints of an edge.
	pub fn edge_endpoints(&self, edge: &Edge) -> Option<(Position, Position)> {
		let source = self.node(edge.source)?;
		let target = self.node(edge.target)?;
		Some((
			handle_anchor(source, HandleKind::Output, edge.source_handle.unwrap_or(0)),
			handle_anchor(target, HandleKind::Input, edge.target_handle.unwrap_or(0)),
		))
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_zoom = (self.viewport.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_zoom / self.viewport.zoom;
		self.viewport.x = sx - (sx - self.viewport.x) * ratio;
		self.viewport.y = sy - (sy - self.viewport.y) * ratio;
		self.viewport.zoom = new_zoom;
	}

	/// Zoom around the centre of the canvas.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	/// Frame every node inside the canvas.
	pub fn fit_view(&mut self) {
		if self.width <= 0.0 || self.height <= 0.0 {
			return;
		}
		let Some(bounds) = geometry::bounds(&self.nodes) else {
			self.viewport = Viewport::default();
			return;
		};
		let scale = 1.0 + 2.0 * FIT_PADDING;
		let zoom = (self.width / (bounds.width * scale))
			.min(self.height / (bounds.height * scale))
			.clamp(MIN_ZOOM, MAX_ZOOM);
		let center = bounds.center();
		self.viewport = Viewport {
			x: self.width / 2.0 - center.x * zoom,
			y: self.height / 2.0 - center.y * zoom,
			zoom,
		};
	}

	/// The part of the graph currently on screen.
	pub fn visible_rect(&self) -> Rect {
		let top_left = self.screen_to_graph(0.0, 0.0);
		Rect {
			x: top_left.x,
			y: top_left.y,
			width: self.width / self.viewport.zoom,
			height: self.height / self.viewport.zoom,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn two_nodes() -> (FlowState, NodeId, NodeId) {
		let state = FlowState::with_example_nodes();
		let ids = state.node_ids();
		(state, ids[0], ids[1])
	}

	#[test]
	fn example_nodes_are_connected() {
		let (state, first, second) = two_nodes();
		assert_eq!(state.nodes.len(), 2);
		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.edges[0].id, "e1-2");
		assert_eq!(state.edges[0].source, first);
		assert_eq!(state.edges[0].target, second);
		assert_eq!(state.node(first).unwrap().label, "Example Website 1");
		assert_eq!(state.node(second).unwrap().url, "https://example.org");
	}

	#[test]
	fn add_node_grows_collection_by_one() {
		let (mut state, _, _) = two_nodes();
		let id = state.add_node("https://example.net", Position::new(10.0, 20.0));
		assert_eq!(state.nodes.len(), 3);

		let node = state.node(id).unwrap();
		assert_eq!(node.label, "Website 3");
		assert_eq!(node.inputs, vec![0]);
		assert_eq!(node.outputs, vec![0]);
		assert!(node.input_labels.is_empty());
		assert_eq!(node.size.width, 400.0);
		assert_eq!(node.size.height, 300.0);
	}

	#[test]
	fn ids_are_not_reused_after_removal() {
		let (mut state, first, _) = two_nodes();
		state.remove_node(first);
		let id = state.add_node("about:blank", Position::default());
		assert_eq!(id, NodeId(3));
		assert_eq!(state.nodes.len(), 2);
	}

	#[test]
	fn add_input_handle_only_touches_that_node() {
		let (mut state, first, second) = two_nodes();
		assert_eq!(state.add_handle(first, HandleKind::Input), Some(1));
		assert_eq!(state.add_handle(first, HandleKind::Input), Some(2));

		assert_eq!(state.node(first).unwrap().inputs, vec![0, 1, 2]);
		assert_eq!(state.node(first).unwrap().outputs, vec![0]);
		assert_eq!(state.node(second).unwrap().inputs, vec![0]);
		assert_eq!(state.add_handle(NodeId(99), HandleKind::Output), None);
	}

	#[test]
	fn labels_are_keyed_by_handle_index() {
		let (mut state, first, second) = two_nodes();
		state.add_handle(first, HandleKind::Output);
		assert!(state.set_handle_label(first, HandleKind::Output, 1, "results"));
		assert!(state.set_handle_label(first, HandleKind::Output, 1, "rows"));

		let node = state.node(first).unwrap();
		assert_eq!(node.label_for(HandleKind::Output, 1), Some("rows"));
		assert_eq!(node.label_for(HandleKind::Output, 0), None);
		assert_eq!(node.label_for(HandleKind::Input, 1), None);
		assert!(state.node(second).unwrap().output_labels.is_empty());
		assert!(!state.set_handle_label(NodeId(42), HandleKind::Input, 0, "x"));
	}

	#[test]
	fn duplicate_and_self_connections_are_rejected() {
		let (mut state, first, second) = two_nodes();
		let same = Connection {
			source: first,
			source_handle: Some(0),
			target: second,
			target_handle: Some(0),
		};
		// handle 0 is what the handle-less example edge already uses
		assert_eq!(state.connect(same), None);

		let looped = Connection {
			source: first,
			source_handle: None,
			target: first,
			target_handle: None,
		};
		assert_eq!(state.connect(looped), None);

		state.add_handle(second, HandleKind::Input);
		let id = state.connect(Connection {
			target_handle: Some(1),
			..same
		});
		assert_eq!(id.as_deref(), Some("e1:0-2:1"));
		assert_eq!(state.edges.len(), 2);
	}

	#[test]
	fn removing_a_node_drops_its_edges() {
		let (mut state, first, second) = two_nodes();
		state.select_edge("e1-2");
		assert!(state.remove_node(second));
		assert!(state.edges.is_empty());
		assert_eq!(state.selected_edge, None);
		assert!(state.node(first).is_some());
		assert!(!state.remove_node(second));
	}

	#[test]
	fn remove_selected_prefers_edge() {
		let (mut state, first, _) = two_nodes();
		state.select_edge("e1-2");
		assert!(state.remove_selected());
		assert_eq!(state.nodes.len(), 2);
		assert!(state.edges.is_empty());

		state.select(first);
		assert!(state.remove_selected());
		assert_eq!(state.nodes.len(), 1);
		assert!(!state.remove_selected());
	}

	#[test]
	fn collapse_then_expand_restores_size() {
		let (mut state, first, _) = two_nodes();
		state.node_mut(first).unwrap().size = Size {
			width: 520.0,
			height: 410.0,
		};

		assert_eq!(state.toggle_collapse(first), Some(true));
		let node = state.node(first).unwrap();
		assert_eq!(node.size.height, COLLAPSED_HEIGHT);
		assert_eq!(node.size.width, 520.0);

		assert_eq!(state.toggle_collapse(first), Some(false));
		let node = state.node(first).unwrap();
		assert_eq!(node.size.height, 410.0);
		assert_eq!(node.expanded_size, None);
	}

	#[test]
	fn dragging_a_node_accounts_for_zoom() {
		let (mut state, first, _) = two_nodes();
		state.viewport.zoom = 2.0;
		state.begin_node_drag(first, 10.0, 10.0);
		assert_eq!(state.selected(), Some(first));
		state.drag_to(50.0, 30.0);
		state.end_interaction();

		assert_eq!(state.node(first).unwrap().position, Position::new(120.0, 10.0));
		assert!(!state.is_interacting());
	}

	#[test]
	fn panning_moves_viewport_and_clears_selection() {
		let (mut state, first, _) = two_nodes();
		state.select(first);
		state.begin_pan(0.0, 0.0);
		state.drag_to(30.0, -15.0);
		assert_eq!(state.viewport.x, 30.0);
		assert_eq!(state.viewport.y, -15.0);
		assert_eq!(state.selected(), None);
	}

	#[test]
	fn resize_respects_minimums() {
		let (mut state, first, _) = two_nodes();
		state.begin_resize(first, 0.0, 0.0);
		state.drag_to(-500.0, -500.0);
		let size = state.node(first).unwrap().size;
		assert_eq!(size.width, MIN_NODE_WIDTH);
		assert_eq!(size.height, 200.0);

		state.drag_to(100.0, 60.0);
		let size = state.node(first).unwrap().size;
		assert_eq!(size.width, 500.0);
		assert_eq!(size.height, 360.0);
	}

	#[test]
	fn collapsed_resize_floors_at_header_height() {
		let (mut state, first, _) = two_nodes();
		state.toggle_collapse(first);
		state.begin_resize(first, 0.0, 0.0);
		state.drag_to(-1000.0, -1000.0);

		let size = state.node(first).unwrap().size;
		assert_eq!(size.width, MIN_NODE_WIDTH);
		assert_eq!(size.height, COLLAPSED_HEIGHT);
	}

	#[test]
	fn connection_gesture_creates_edge() {
		let (mut state, first, second) = two_nodes();
		state.add_handle(first, HandleKind::Output);
		state.begin_connection(first, 1, 0.0, 0.0);
		state.drag_to(300.0, 100.0);
		assert!(state.pending_connection().is_some());

		let id = state.complete_connection(second, 0);
		assert_eq!(id.as_deref(), Some("e1:1-2:0"));
		assert_eq!(state.pending_connection(), None);
		assert_eq!(state.complete_connection(second, 0), None);
	}

	#[test]
	fn dropping_connection_elsewhere_cancels() {
		let (mut state, first, _) = two_nodes();
		state.begin_connection(first, 0, 0.0, 0.0);
		state.end_interaction();
		assert_eq!(state.edges.len(), 1);
		assert_eq!(state.interaction, Interaction::Idle);
	}

	#[test]
	fn zoom_at_keeps_point_fixed() {
		let mut state = FlowState::new();
		state.viewport = Viewport {
			x: 40.0,
			y: 20.0,
			zoom: 1.0,
		};
		let before = state.screen_to_graph(200.0, 100.0);
		state.zoom_at(200.0, 100.0, 2.0);
		let after = state.graph_to_screen(before);
		assert!((after.0 - 200.0).abs() < 1e-9);
		assert!((after.1 - 100.0).abs() < 1e-9);
		assert_eq!(state.viewport.zoom, 2.0);

		state.zoom_at(0.0, 0.0, 1000.0);
		assert_eq!(state.viewport.zoom, MAX_ZOOM);
	}

	#[test]
	fn zoom_out_stops_at_floor() {
		let mut state = FlowState::new();
		state.zoom_at(100.0, 100.0, 1e-4);
		assert_eq!(state.viewport.zoom, MIN_ZOOM);

		state.resize(800.0, 600.0);
		state.zoom_by(0.5);
		assert_eq!(state.viewport.zoom, MIN_ZOOM);
	}

	#[test]
	fn fit_view_frames_all_nodes() {
		let (mut state, _, _) = two_nodes();
		state.fit_view();
		// unmeasured canvas leaves the viewport alone
		assert_eq!(state.viewport, Viewport::default());

		state.resize(1200.0, 600.0);
		state.fit_view();
		let visible = state.visible_rect();
		let bounds = geometry::bounds(&state.nodes).unwrap();
		assert!(visible.x <= bounds.x && visible.right() >= bounds.right());
		assert!(visible.y <= bounds.y && visible.bottom() >= bounds.bottom());
	}
}
