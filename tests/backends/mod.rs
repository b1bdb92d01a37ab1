pub mod contend_sync;
pub mod contend_testing;
