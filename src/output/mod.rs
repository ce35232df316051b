pub mod async_writer;
pub mod summary_text;

pub use async_writer::spawn_line_writer;
pub use summary_text::render_summary;
