pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 500;

pub const EMBEDDING_DIMENSION: usize = 1536;
pub const TOP_K: usize = 4;
pub const MEMORY_MAX_LENGTH: usize = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const SERVER_HOST: &str = "127.0.0.1";
pub const SERVER_PORT: u16 = 8000;

pub const DB_HOST: &str = "localhost";
pub const DB_PORT: u16 = 5432;
pub const DB_NAME: &str = "ragdb";
pub const DB_USER: &str = "postgres";
pub const DB_MAX_CONNECTIONS: u32 = 4;

pub const GEMINI_EMBEDDING_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-embedding-001:embedContent";
pub const GEMINI_GENERATION_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
pub const GEMINI_EMBEDDING_MODEL: &str = "models/gemini-embedding-001";
