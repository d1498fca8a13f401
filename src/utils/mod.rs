pub mod db_utils;
pub mod employee_directory;
