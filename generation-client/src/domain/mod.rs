pub mod generation_record;
pub mod table_name;

pub use generation_record::GenerationRecord;
pub use table_name::{InvalidTableName, TableName};
