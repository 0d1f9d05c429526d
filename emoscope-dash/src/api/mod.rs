//! HTTP API handlers for emoscope-dash

pub mod analyze;
pub mod buildinfo;
pub mod health;
pub mod ui;

pub use analyze::{analyze_csv_upload, analyze_request, export_results};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use ui::{serve_app_css, serve_app_js, serve_index};
