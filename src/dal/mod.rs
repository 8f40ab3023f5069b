pub mod pdf_store;
