pub mod artifact;
pub mod result_record;
pub mod search_criteria;
