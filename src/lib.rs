pub mod configuration;
pub mod dal;
pub mod domain;
pub mod services;
pub mod startup;

#[cfg(test)]
pub mod test_utils;
