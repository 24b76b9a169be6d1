//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the track catalog,
//! selection and filter state.

mod model;

pub use model::*;
