pub mod database;
pub mod external_services;
