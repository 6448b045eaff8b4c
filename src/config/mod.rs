//! Settings for puppet-cron itself.
//!
//! Settings come from built-in defaults, optionally overlaid by a YAML file
//! (`--config`), and finally by command-line flags and their environment
//! variables. Unknown fields in the YAML are ignored for forward compatibility.
//!
//! These are not the agent's settings; those live in `puppet.conf` and are
//! reached through [`crate::puppet::ConfigPort`].

mod model;
mod operations;


// Re-export public API
pub use model::Settings;
