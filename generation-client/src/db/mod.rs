pub mod generation_queries;

pub use generation_queries::{
    count_rows, daily_totals, load_all, load_series, summarize_combinations, CombinationCount,
    DailyTotal,
};
