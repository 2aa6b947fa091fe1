//! Renders report tables into an xlsx workbook.

use chrono::NaiveDate;
use rust_xlsxwriter::{Chart, ChartType, Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::error::ReportError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::pipeline::Batch;
use crate::pipeline::summary::{distinct_employees, employee_dashboard};

use super::cell::{CellValue, DataTable};
use super::tables;

pub const MAIN_SHEET: &str = "Main_Data";
pub const DASHBOARD_SHEET: &str = "Employee_Dashboard";
pub const TRENDS_SHEET: &str = "Employee_Trends";
pub const COMPARISON_SHEET: &str = "Employee_Comparison";

struct Styles {
    title: Format,
    header: Format,
    late: Format,
    absent: Format,
    normal: Format,
}

impl Styles {
    fn new() -> Self {
        let fill = |rgb| Format::new().set_align(FormatAlign::Center).set_background_color(Color::RGB(rgb));
        Self {
            title: Format::new().set_bold().set_font_size(16).set_align(FormatAlign::Center),
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x366092))
                .set_align(FormatAlign::Center),
            late: fill(0xFFE6E6),
            absent: fill(0xFFF2E6),
            normal: fill(0xE6F7E6),
        }
    }

    fn for_record(&self, record: &AttendanceRecord) -> &Format {
        if record.is_late {
            &self.late
        } else if record.status == AttendanceStatus::Absent {
            &self.absent
        } else {
            &self.normal
        }
    }
}

/// Builds the whole report in memory; nothing touches the disk here.
pub fn render_workbook(batch: &Batch, report_date: NaiveDate) -> Result<Vec<u8>, ReportError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    write_main_sheet(workbook.add_worksheet(), batch, report_date, &styles)?;
    write_dashboard_sheet(workbook.add_worksheet(), batch, &styles)?;
    write_trends_sheet(workbook.add_worksheet(), batch, &styles)?;
    write_comparison_sheet(workbook.add_worksheet(), batch, &styles)?;

    let bytes = workbook.save_to_buffer()?;
    info!(size = bytes.len(), records = batch.records.len(), "Rendered attendance workbook");
    Ok(bytes)
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &CellValue, format: Option<&Format>) -> Result<(), XlsxError> {
    match (cell, format) {
        (CellValue::Number(n), Some(f)) => ws.write_number_with_format(row, col, *n, f)?,
        (CellValue::Number(n), None) => ws.write_number(row, col, *n)?,
        (CellValue::Integer(i), Some(f)) => ws.write_number_with_format(row, col, *i as f64, f)?,
        (CellValue::Integer(i), None) => ws.write_number(row, col, *i as f64)?,
        (CellValue::Bool(b), Some(f)) => ws.write_boolean_with_format(row, col, *b, f)?,
        (CellValue::Bool(b), None) => ws.write_boolean(row, col, *b)?,
        (other, Some(f)) => ws.write_string_with_format(row, col, other.display(), f)?,
        (other, None) => ws.write_string(row, col, other.display())?,
    };
    Ok(())
}

/// Writes the table title, header and rows from `(row, col)`; returns the first row after it.
fn write_table(ws: &mut Worksheet, row: u32, col: u16, table: &DataTable, styles: &Styles) -> Result<u32, XlsxError> {
    ws.write_string_with_format(row, col, &table.title, &Format::new().set_bold())?;
    let header_row = row + 1;
    for (offset, header) in table.headers.iter().enumerate() {
        ws.write_string_with_format(header_row, col + offset as u16, *header, &styles.header)?;
    }
    for (r, cells) in table.rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            write_cell(ws, header_row + 1 + r as u32, col + c as u16, cell, None)?;
        }
    }
    Ok(header_row + 1 + table.rows.len() as u32)
}

fn write_main_sheet(ws: &mut Worksheet, batch: &Batch, report_date: NaiveDate, styles: &Styles) -> Result<(), XlsxError> {
    ws.set_name(MAIN_SHEET)?;
    let table = tables::records_table(&batch.records);
    let last_col = (table.width() - 1) as u16;

    let title = format!("Biometric Attendance Data - {}", report_date.format("%B %d, %Y"));
    ws.merge_range(0, 0, 0, last_col, &title, &styles.title)?;

    let header_row = 2;
    for (col, header) in table.headers.iter().enumerate() {
        ws.write_string_with_format(header_row, col as u16, *header, &styles.header)?;
        ws.set_column_width(col as u16, (header.len() + 4) as f64)?;
    }
    for (idx, (cells, record)) in table.rows.iter().zip(&batch.records).enumerate() {
        let row = header_row + 1 + idx as u32;
        let format = styles.for_record(record);
        for (col, cell) in cells.iter().enumerate() {
            write_cell(ws, row, col as u16, cell, Some(format))?;
        }
    }

    ws.set_column_width(1, 25)?;
    ws.autofilter(header_row, 0, header_row + table.rows.len() as u32, last_col)?;
    ws.set_freeze_panes(header_row + 1, 0)?;
    Ok(())
}

fn write_dashboard_sheet(ws: &mut Worksheet, batch: &Batch, styles: &Styles) -> Result<(), XlsxError> {
    ws.set_name(DASHBOARD_SHEET)?;
    ws.merge_range(0, 0, 0, 10, "Employee Dashboard", &styles.title)?;

    let dashboards: Vec<_> = distinct_employees(&batch.records)
        .iter()
        .filter_map(|e| employee_dashboard(&batch.records, e.employee_id.as_str()))
        .collect();

    let next = write_table(ws, 2, 0, &tables::overview_table(&batch.summary), styles)?;
    write_table(ws, next + 1, 0, &tables::dashboard_table(&dashboards), styles)?;
    ws.set_column_width(0, 26)?;
    ws.set_column_width(1, 25)?;
    Ok(())
}

fn write_trends_sheet(ws: &mut Worksheet, batch: &Batch, styles: &Styles) -> Result<(), XlsxError> {
    ws.set_name(TRENDS_SHEET)?;
    ws.merge_range(0, 0, 0, 7, "Employee Trends Analysis", &styles.title)?;

    let next = write_table(ws, 2, 0, &tables::monthly_trends_table(&batch.summary.monthly_trends), styles)?;
    write_table(
        ws,
        next + 1,
        0,
        &tables::weekly_punctuality_table(&batch.summary.weekly_punctuality),
        styles,
    )?;
    ws.set_column_width(0, 14)?;
    Ok(())
}

fn ranking_chart(title: &str, value_axis: &str, first_row: u32, last_row: u32, col: u16) -> Chart {
    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_categories((COMPARISON_SHEET, first_row, col, last_row, col))
        .set_values((COMPARISON_SHEET, first_row, col + 1, last_row, col + 1))
        .set_name(value_axis);
    chart.title().set_name(title);
    chart.x_axis().set_name("Employees");
    chart.y_axis().set_name(value_axis);
    chart
}

fn write_comparison_sheet(ws: &mut Worksheet, batch: &Batch, styles: &Styles) -> Result<(), XlsxError> {
    ws.set_name(COMPARISON_SHEET)?;
    ws.merge_range(0, 0, 0, 7, "Employee Performance Comparison", &styles.title)?;

    let summary = &batch.summary;
    let stats_end = write_table(ws, 2, 0, &tables::employee_stats_table(&summary.employees), styles)?;

    let ranking_row = stats_end + 2;
    let by_hours = tables::ranking_table(
        "Top Performers by Average Hours",
        "Avg Hours",
        &summary.rankings.by_avg_hours,
        false,
    );
    let by_punctuality = tables::ranking_table(
        "Top Performers by Punctuality Rate",
        "Punctuality Rate (%)",
        &summary.rankings.by_punctuality,
        true,
    );
    let ranking_end = write_table(ws, ranking_row, 0, &by_hours, styles)?;
    write_table(ws, ranking_row, 4, &by_punctuality, styles)?;

    if !by_hours.is_empty() {
        // data rows sit under the title and header rows
        let first = ranking_row + 2;
        let last = first + by_hours.rows.len() as u32 - 1;
        let chart_row = ranking_end + 2;
        ws.insert_chart(
            chart_row,
            0,
            &ranking_chart("Top Performers by Average Hours", "Average Hours", first, last, 0),
        )?;
        ws.insert_chart(
            chart_row,
            9,
            &ranking_chart("Top Performers by Punctuality Rate", "Punctuality Rate (%)", first, last, 4),
        )?;
    }

    ws.set_column_width(0, 16)?;
    ws.set_column_width(1, 25)?;
    ws.set_column_width(4, 16)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_batch;

    fn batch() -> Batch {
        let mut roster = vec![0x01];
        roster.extend_from_slice(b"Jane Doe\0\0");
        roster.extend_from_slice(b"007\0");
        roster.extend(std::iter::repeat_n(0u8, 60));
        let log = b"007\t2024-01-10 09:15:00\n007\t2024-01-10 17:20:00\n042\t2024-02-01 10:00:00\n";
        run_batch(&roster, log, 10).unwrap()
    }

    #[test]
    fn renders_a_zip_container() {
        let bytes = render_workbook(&batch(), NaiveDate::from_ymd_opt(2024, 2, 2).unwrap()).unwrap();

        // xlsx files are zip archives
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }
}
