//! FCA Toolset - functional cost analysis workbooks as tidy tables
//!
//! This library reads positional "functional cost analysis" workbooks, where
//! main functions (H1) and their sub-functions (H2) sit in header rows with
//! weights and costs at fixed row offsets, and turns them into tables that
//! can be compared across products.
//!
//! # Features
//!
//! - Fail-soft cell access with German/English number normalization
//! - Label classification and H1 block scanning over untyped grids
//! - Weight/cost extraction driven by an explicit [`layout::SheetLayout`]
//! - Technical scores joined onto sub-functions and rolled up per H1
//! - Cross-product reconciliation ranked by absolute cost delta
//! - Comparison reports as JSON, YAML or Excel
//!
//! # Example
//!
//! ```no_run
//! use fca_toolset::layout::SheetLayout;
//! use fca_toolset::session::load_products;
//!
//! let layout = SheetLayout::default();
//! let session = load_products(&["produkt_a.xlsx", "produkt_b.xlsx"], &layout);
//!
//! for note in &session.notes {
//!     eprintln!("{}", note);
//! }
//! let selection = session.default_selection(layout.top_n)?;
//! for row in session.compare(&selection)? {
//!     println!("{} / {}: {:+}", row.h1, row.h2, row.delta);
//! }
//! # Ok::<(), fca_toolset::error::FcaError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod layout;
pub mod session;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{FcaError, FcaResult};
pub use layout::SheetLayout;
pub use types::{ComparisonRow, H1Block, H2Entry, ParseNote, Product, TechScore};
