mod event;
mod parser;
mod reader;

pub use event::KeyCode;
pub use parser::InputParser;
pub use reader::TtyReader;
