//! CSV export in the layout the report screens download.
//!
//! ```text
//! data:text/csv;charset=utf-8,Hourly Sales Report
//! Period,2024-05-01 to 2024-05-31
//! Employee Filter,All Employees
//! Generated,2024-06-01 09:00:00
//!
//! Hour,Sales,Refunds,...
//! 09:00,120.00,0.00,...
//!
//! Next Section Header
//! ...
//! ```
//!
//! Amounts are written with exactly two decimals and no currency symbol.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ReportMeta;
use crate::error::CoreResult;

pub const DATA_URI_PREFIX: &str = "data:text/csv;charset=utf-8,";
pub const ALL_EMPLOYEES: &str = "All Employees";

/// A header line followed by its rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CsvSection {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvSection {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CsvSection {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CsvDocument {
    pub title: String,
    pub meta: ReportMeta,
    pub sections: Vec<CsvSection>,
}

impl CsvDocument {
    pub fn new(title: impl Into<String>, meta: &ReportMeta) -> Self {
        CsvDocument {
            title: title.into(),
            meta: meta.clone(),
            sections: Vec::new(),
        }
    }

    pub fn push_section(&mut self, section: CsvSection) {
        self.sections.push(section);
    }

    /// The CSV text itself.
    pub fn to_csv_string(&self) -> CoreResult<String> {
        let employee_filter = self
            .meta
            .employee_filter
            .as_deref()
            .unwrap_or(ALL_EMPLOYEES);
        let generated = self.meta.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let preamble: [&[&str]; 4] = [
            &[self.title.as_str()],
            &["Period", self.meta.period.as_str()],
            &["Employee Filter", employee_filter],
            &["Generated", generated.as_str()],
        ];

        let mut out = Vec::new();
        write_records(&mut out, preamble)?;
        out.push(b'\n');

        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            write_records(
                &mut out,
                std::iter::once(&section.header).chain(section.rows.iter()),
            )?;
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// `data:text/csv;charset=utf-8,` followed by the raw CSV text.
    pub fn to_data_uri(&self) -> CoreResult<String> {
        Ok(format!("{}{}", DATA_URI_PREFIX, self.to_csv_string()?))
    }
}

/// Appends records to `out`, one per line, quoting fields as needed.
fn write_records<R, F>(out: &mut Vec<u8>, records: impl IntoIterator<Item = R>) -> CoreResult<()>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
