// Size units
pub const KB: usize = 1024;
pub const MB: usize = 1024 * KB;

// Data file layout
//
// File header: init sentinel (1) + write offset (4, BE) + version counter (8, BE).
// Record header: tombstone (1) + deletion stamp (8, BE) + payload length (4, BE).
pub const FILE_HEADER_SIZE: usize = 13;
pub const RECORD_HEADER_SIZE: usize = 13;
pub const INIT_SENTINEL_AT: u32 = 0;
pub const WRITE_OFFSET_AT: u32 = 1;
pub const VERSION_AT: u32 = 5;
pub const DATA_START: u32 = FILE_HEADER_SIZE as u32;

// Sizing
pub const DEFAULT_FILE_CAPACITY: usize = 64 * MB;

// Scanning
pub const SCAN_CHANNEL_CAPACITY: usize = 50;
pub const SCAN_PAGE_SIZE: usize = 20;

// Wire protocol
pub const PROMPT: &[u8] = b"gcdb> ";
pub const GREETING: &str = "hello frand";
pub const UNRECOGNIZED: &str = "Unrecognized command.";
pub const RESPONSE_OK: &str = "OK";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:19999";

// Filesystem
pub const DATA_FILE_PREFIX: &str = "data.";
pub const DEFAULT_DATA_DIR: &str = "./gcdb_data";
