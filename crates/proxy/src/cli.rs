use clap::Parser;

/// Hub proxy for WebDriver session traffic against provisioned simulators.
#[derive(Parser, Debug)]
#[command(name = "simhub")]
#[command(about = "WebDriver hub proxy - session negotiation and command forwarding")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Address to listen on.
	#[arg(long, default_value = "127.0.0.1")]
	pub host: String,

	/// Port the hub surface is served on.
	#[arg(long, default_value_t = 3002)]
	pub port: u16,

	/// Base URL of the provisioning collaborator.
	#[arg(long, default_value = "http://localhost:3001")]
	pub provisioner_url: String,

	/// Base URL of the backend automation driver.
	#[arg(long, default_value = "http://localhost:4723")]
	pub backend_url: String,

	/// Bound for provisioning calls. Device boot plus app install can
	/// legitimately take minutes, so this is a distinct, longer bound.
	#[arg(long, default_value_t = 300)]
	pub provision_timeout_secs: u64,

	/// Bound for backend session creation.
	#[arg(long, default_value_t = 30)]
	pub create_timeout_secs: u64,

	/// Bound for forwarded commands and backend deletion.
	#[arg(long, default_value_t = 30)]
	pub command_timeout_secs: u64,

	/// Bound for the backend health probe before session creation.
	#[arg(long, default_value_t = 5)]
	pub health_timeout_secs: u64,

	/// Sessions older than this are eligible for reaping.
	#[arg(long, default_value_t = 24)]
	pub session_max_age_hours: u64,

	/// Run the reap sweep on this interval. Off when unset.
	#[arg(long)]
	pub reap_interval_secs: Option<u64>,
}
