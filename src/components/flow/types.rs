use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_NODE_SIZE: Size = Size {
	width: 400.0,
	height: 300.0,
};
pub const MIN_NODE_WIDTH: f64 = 300.0;
pub const MIN_NODE_HEIGHT: f64 = 200.0;
pub const COLLAPSED_HEIGHT: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

/// Which side of a node a handle sits on. Inputs are connection targets on
/// the left edge, outputs are sources on the right edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
	Input,
	Output,
}

impl HandleKind {
	pub fn prefix(self) -> &'static str {
		match self {
			HandleKind::Input => "input",
			HandleKind::Output => "output",
		}
	}

	/// DOM id of a handle, e.g. `input-2`.
	pub fn handle_id(self, index: usize) -> String {
		format!("{}-{}", self.prefix(), index)
	}
}

/// One embedded page on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode {
	pub id: NodeId,
	pub label: String,
	pub url: String,
	pub position: Position,
	pub size: Size,
	pub collapsed: bool,
	/// Size to restore when a collapsed node is expanded again.
	pub expanded_size: Option<Size>,
	pub inputs: Vec<usize>,
	pub outputs: Vec<usize>,
	pub input_labels: BTreeMap<usize, String>,
	pub output_labels: BTreeMap<usize, String>,
	pub selected: bool,
}

impl FrameNode {
	pub fn new(
		id: NodeId,
		label: impl Into<String>,
		url: impl Into<String>,
		position: Position,
	) -> Self {
		Self {
			id,
			label: label.into(),
			url: url.into(),
			position,
			size: DEFAULT_NODE_SIZE,
			collapsed: false,
			expanded_size: None,
			inputs: vec![0],
			outputs: vec![0],
			input_labels: BTreeMap::new(),
			output_labels: BTreeMap::new(),
			selected: false,
		}
	}

	pub fn handles(&self, kind: HandleKind) -> &[usize] {
		match kind {
			HandleKind::Input => &self.inputs,
			HandleKind::Output => &self.outputs,
		}
	}

	pub fn handles_mut(&mut self, kind: HandleKind) -> &mut Vec<usize> {
		match kind {
			HandleKind::Input => &mut self.inputs,
			HandleKind::Output => &mut self.outputs,
		}
	}

	pub fn labels_mut(&mut self, kind: HandleKind) -> &mut BTreeMap<usize, String> {
		match kind {
			HandleKind::Input => &mut self.input_labels,
			HandleKind::Output => &mut self.output_labels,
		}
	}

	pub fn label_for(&self, kind: HandleKind, index: usize) -> Option<&str> {
		let labels = match kind {
			HandleKind::Input => &self.input_labels,
			HandleKind::Output => &self.output_labels,
		};
		labels.get(&index).map(String::as_str)
	}

	pub fn min_height(&self) -> f64 {
		if self.collapsed {
			COLLAPSED_HEIGHT
		} else {
			MIN_NODE_HEIGHT
		}
	}
}

/// A request to join an output handle to an input handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
	pub source: NodeId,
	pub source_handle: Option<usize>,
	pub target: NodeId,
	pub target_handle: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
	pub id: String,
	pub source: NodeId,
	pub source_handle: Option<usize>,
	pub target: NodeId,
	pub target_handle: Option<usize>,
}

impl Edge {
	pub fn from_connection(conn: Connection) -> Self {
		let id = match (conn.source_handle, conn.target_handle) {
			(None, None) => format!("e{}-{}", conn.source, conn.target),
			(sh, th) => format!(
				"e{}:{}-{}:{}",
				conn.source,
				sh.unwrap_or(0),
				conn.target,
				th.unwrap_or(0)
			),
		};
		Self {
			id,
			source: conn.source,
			source_handle: conn.source_handle,
			target: conn.target,
			target_handle: conn.target_handle,
		}
	}

	pub fn touches(&self, node: NodeId) -> bool {
		self.source == node || self.target == node
	}

	/// Handle-less endpoints attach to handle 0.
	pub fn same_endpoints(&self, conn: &Connection) -> bool {
		self.source == conn.source
			&& self.target == conn.target
			&& self.source_handle.unwrap_or(0) == conn.source_handle.unwrap_or(0)
			&& self.target_handle.unwrap_or(0) == conn.target_handle.unwrap_or(0)
	}
}

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;

/// Pan offset (screen px) and zoom factor of the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub zoom: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: 1.0,
		}
	}
}
