//! Document model consumed by the renderers.
//!
//! These structures describe an already-parsed Word document: paragraphs,
//! runs and tables with merged cells. The [`grid`] module derives the
//! arena view of a table that the layout engine works on.

mod document;
pub mod grid;
mod paragraph;
mod table;

pub use document::*;
pub use grid::{Anchor, Slot, TableGrid, MAX_COLUMNS};
pub use paragraph::*;
pub use table::*;
