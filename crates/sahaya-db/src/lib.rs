pub mod connection;
pub use connection::Connection;

pub mod results;
pub use results::QueryError;

pub mod schema;

pub mod members;
pub mod fines;
pub mod meetings;
pub mod funerals;
pub mod common_works;
pub mod settings;
