use super::types::{FrameNode, HandleKind, Position};

/// Distance of a handle from the node border, in graph px.
pub const HANDLE_OFFSET: f64 = 16.0;
pub const LABEL_VERTICAL_OFFSET: f64 = 4.0;
pub const LABEL_WIDTH: f64 = 80.0;

/// Vertical position of handle `index` out of `total`, as a percentage of the
/// node height. Handles are centred on 50% and spread further apart while the
/// node is collapsed so they stay clickable.
pub fn handle_offset_percent(index: usize, total: usize, collapsed: bool) -> f64 {
	if total <= 1 {
		return 50.0;
	}
	let spacing = if collapsed { 24.0 } else { 12.0 };
	let total_height = (total - 1) as f64 * spacing;
	let start = 50.0 - total_height / 2.0;
	start + index as f64 * spacing
}

/// The "+" button sits just below the last handle.
pub fn add_button_percent(total: usize, collapsed: bool) -> f64 {
	handle_offset_percent(total.saturating_sub(1), total, collapsed) + 8.0
}

/// Graph-space point where edges attach to a handle.
pub fn handle_anchor(node: &FrameNode, kind: HandleKind, index: usize) -> Position {
	let total = node.handles(kind).len();
	let pct = handle_offset_percent(index, total, node.collapsed);
	let y = node.position.y + node.size.height * pct / 100.0;
	let x = match kind {
		HandleKind::Input => node.position.x - HANDLE_OFFSET,
		HandleKind::Output => node.position.x + node.size.width + HANDLE_OFFSET,
	};
	Position::new(x, y)
}

/// SVG path for an edge: a cubic bezier leaving `from` to the right and
/// entering `to` from the left.
pub fn edge_path(from: Position, to: Position) -> String {
	let dx = ((to.x - from.x).abs() * 0.5).max(40.0);
	format!(
		"M{},{} C{},{} {},{} {},{}",
		from.x,
		from.y,
		from.x + dx,
		from.y,
		to.x - dx,
		to.y,
		to.x,
		to.y
	)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn center(&self) -> Position {
		Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn union(&self, other: &Rect) -> Rect {
		let (x, y) = (self.x.min(other.x), self.y.min(other.y));
		Rect {
			x,
			y,
			width: self.right().max(other.right()) - x,
			height: self.bottom().max(other.bottom()) - y,
		}
	}
}

pub fn node_rect(node: &FrameNode) -> Rect {
	Rect {
		x: node.position.x,
		y: node.position.y,
		width: node.size.width,
		height: node.size.height,
	}
}

/// Bounding box of all nodes, `None` for an empty canvas.
pub fn bounds(nodes: &[FrameNode]) -> Option<Rect> {
	nodes
		.iter()
		.map(node_rect)
		.reduce(|acc, rect| acc.union(&rect))
}
