//! XLSX export

use rust_xlsxwriter::{Format, Workbook};

use super::{ExportResult, ExportTable};

/// Write the table as a single-sheet workbook; missing values stay blank
pub fn write_xlsx(table: &ExportTable, sheet_name: &str) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in table.columns().into_iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let line = i as u32 + 1;
        worksheet.write_string(line, 0, row.county.as_str())?;
        for (j, value) in row.values.iter().enumerate() {
            if let Some(value) = value {
                worksheet.write_number(line, j as u16 + 1, *value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
