//! iframe-canvas-relay: fetches remote pages server-side so the canvas can
//! embed them despite their framing restrictions.
//!
//! Routes:
//!   - `GET /test`  liveness string
//!   - `GET /proxy?url=<target>`  fetch `<target>` and return it frameable

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
