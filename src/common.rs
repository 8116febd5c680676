pub mod codes;
pub mod db_utils;
pub mod error;
pub mod i18n;
pub mod storage;
#[cfg(test)]
pub mod test_support;
pub mod validation;
