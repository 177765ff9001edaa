//! Figures, plot builders and HTML reports.
//!
//! Plot builders turn tables and benchmark results into `plotly::Plot`s wrapped
//! in a [`Figure`], which knows how to show and save itself.
pub mod figure;
pub mod html;
pub mod plots;

pub use figure::{Backend, Figure};
