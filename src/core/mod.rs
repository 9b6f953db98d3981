pub mod cursor;
pub mod document;
pub mod engine;
pub mod index;
pub mod scan;
