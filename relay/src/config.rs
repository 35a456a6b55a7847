//! Command-line and environment configuration for the relay.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

/// Relay server settings. Every flag can also be set from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "relay")]
#[command(about = "Fetches remote pages so they can be embedded in the canvas", long_about = None)]
pub struct RelayConfig {
	/// Interface to bind
	#[arg(long, env = "RELAY_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
	pub host: IpAddr,

	/// Port to listen on
	#[arg(short, long, env = "RELAY_PORT", default_value_t = 3001)]
	pub port: u16,

	/// Give up on an upstream fetch after this many seconds (no limit when unset)
	#[arg(long, env = "RELAY_TIMEOUT_SECS")]
	pub timeout_secs: Option<u64>,
}

impl RelayConfig {
	/// Socket address the server binds to.
	pub fn addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}

	/// Upstream request timeout, if one was configured.
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout_secs.map(Duration::from_secs)
	}
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
			port: 3001,
			timeout_secs: None,
		}
	}
}
