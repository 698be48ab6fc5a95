// src/converters/mod.rs
pub mod render;
pub mod text;

// Re-export the converter entry points for convenience
pub use render::render_html_to_pdf;
pub use text::{convert_to_text, html_to_markdown};
