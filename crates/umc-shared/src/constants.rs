//! Application-wide constants

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Storage key under which the client state is persisted.
pub const PERSIST_KEY: &str = "persist:assignment";
pub const DEFAULT_STORAGE_DIR: &str = ".umc";

pub const REFRESH_PATH: &str = "/users/auth/refresh/";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SORT_BY: &str = "createdAt";
