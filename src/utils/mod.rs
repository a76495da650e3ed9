pub mod category_report;
pub mod db_utils;
pub mod email_cache;
pub mod sku;
