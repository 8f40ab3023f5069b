pub mod droid;
pub mod locator;
pub mod pdf_downloader;
pub mod result_parser;
pub mod search_executor;
pub mod wait;

pub use droid::*;
pub use locator::*;
pub use pdf_downloader::*;
pub use result_parser::*;
pub use search_executor::*;
pub use wait::*;
