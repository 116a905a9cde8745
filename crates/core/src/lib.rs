pub mod finance;
pub mod storage;
pub mod timestamp;
