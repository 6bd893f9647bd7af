//! tapedesk - terminal dashboard for a simulated market tape.
//!
//! The library is the headless core: snapshot fetching, schema
//! normalization, view state, pure view projections, sparkline geometry,
//! and the trade-intent composer. The `tapedesk` binary materializes the
//! projections into a terminal UI; nothing in the library touches a
//! terminal or a DOM.
pub mod config;
pub mod fetch;
pub mod normalize;
pub mod order;
pub mod sparkline;
pub mod state;
pub mod views;

// Re-export the types most callers need.
pub use config::Config;
pub use fetch::{RawSnapshots, SnapshotFetcher, SnapshotOutcome};
pub use normalize::{LeaderboardRow, NewsItem, PriceRow};
pub use order::OrderForm;
pub use state::ViewState;
