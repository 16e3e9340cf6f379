pub mod db;
pub mod domain;

pub use domain::{GenerationRecord, InvalidTableName, TableName};
