use generation_client::db::CombinationCount;

/// Renders the combination summary as a fixed-width text table.
pub fn combinations_table(rows: &[CombinationCount]) -> String {
    const HEADERS: [&str; 3] = ["businessType", "psrType", "count"];

    let counts: Vec<String> = rows.iter().map(|r| r.count.to_string()).collect();
    let w_business = column_width(HEADERS[0], rows.iter().map(|r| r.business_type.as_str()));
    let w_psr = column_width(HEADERS[1], rows.iter().map(|r| r.psr_type.as_str()));
    let w_count = column_width(HEADERS[2], counts.iter().map(String::as_str));

    let line = |business: &str, psr: &str, count: &str| {
        format!("{business:>w_business$} {psr:>w_psr$} {count:>w_count$}\n")
    };

    let mut out = line(HEADERS[0], HEADERS[1], HEADERS[2]);
    for (row, count) in rows.iter().zip(&counts) {
        out.push_str(&line(&row.business_type, &row.psr_type, count));
    }
    out
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells.map(str::len).fold(header.len(), usize::max)
}
