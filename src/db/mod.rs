pub mod entities;
pub mod enums;
pub mod models;
pub mod schema;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
