//! Session-aware WebDriver hub proxy.
//!
//! The hub accepts `/wd/hub`-prefixed session traffic, negotiates a concrete
//! simulator target through a provisioning collaborator, opens the session on
//! a backend automation driver, and thereafter forwards every command for
//! that session to the same backend verbatim. Failures the hub owns are
//! translated into the protocol's classified error envelope; failures the
//! backend reports during forwarding pass through untouched.

pub mod backend;
pub mod capabilities;
pub mod cli;
pub mod error;
pub mod logging;
pub mod provisioner;
pub mod server;
pub mod session;
