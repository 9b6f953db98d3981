pub mod data_file;
pub mod filesystem;
pub mod format;

pub use data_file::MappedDataFile;
