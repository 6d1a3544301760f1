//! Curriculum data: the navigation tree, objective grouping and lesson formatting

pub mod format;
pub mod html;
pub mod model;
pub mod objectives;

pub use format::format_content;
pub use html::{ContentBlock, parse_fragment};
pub use model::{Grade, Lesson, NodeId, Objective, PdfDocument, Subject, Unit};
