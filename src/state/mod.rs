//! State module for tracking crawl session progress
//!
//! # Components
//!
//! - `SessionState`: the lifecycle of one domain's crawl session
//!   (idle, running, draining, done)

mod session_state;

pub use session_state::SessionState;
