pub mod page_replacement;
pub mod persistent_storage;
