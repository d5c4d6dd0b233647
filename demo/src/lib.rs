//! High-level access to dm_26 demo recordings.
//!
//! [`Demo`] orchestrates the lower layers: it indexes the message
//! frames of a file, materializes messages into instructions on
//! demand, resolves snapshots through the assembler, and answers map
//! and timing queries from a single analysis pass.
//!
//! # Example
//!
//! ```no_run
//! use demo::Demo;
//!
//! let mut demo = Demo::new();
//! if demo.open("match.dm_26", true) {
//!     println!("{} messages, {} maps", demo.message_count(), demo.maps_count());
//!     for map in 0..demo.maps_count() {
//!         println!("  {}", demo.map_name(map).unwrap_or("?"));
//!     }
//! }
//! ```

mod analyzer;
mod demo;
mod error;

pub use analyzer::{MapSegment, MessageAnalysis};
pub use demo::Demo;
pub use error::{DemoError, DemoResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_demo_is_closed_and_empty() {
        let demo = Demo::new();
        assert!(!demo.is_open());
        assert_eq!(demo.message_count(), 0);
        assert_eq!(demo.maps_count(), 0);
        assert_eq!(demo.map_name(0), None);
    }

    #[test]
    fn open_missing_file_returns_false() {
        let mut demo = Demo::new();
        assert!(!demo.open("/nonexistent/path/match.dm_26", true));
        assert!(!demo.is_open());
    }
}
