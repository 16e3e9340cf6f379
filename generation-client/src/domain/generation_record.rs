/// One per-type generation observation as stored in the wind/solar table.
///
/// Timestamps and the settlement date are kept in the string form the API
/// returned them in; the table stores them as TEXT.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[sqlx(rename_all = "camelCase")]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GenerationRecord {
    pub publish_time: String,
    pub business_type: String,
    pub psr_type: String,
    pub quantity: f64,
    pub start_time: String,
    pub settlement_date: String,
    pub settlement_period: i64,
}

impl GenerationRecord {
    /// Column names in table order. Inserts and the schema share this list.
    pub const COLUMNS: [&'static str; 7] = [
        "publishTime",
        "businessType",
        "psrType",
        "quantity",
        "startTime",
        "settlementDate",
        "settlementPeriod",
    ];
}
