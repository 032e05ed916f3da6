// Exports of the responses spreadsheet (.xlsx), for drawing without access to the live store.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::survey::{io_common::rows_to_responses, *};

pub fn read_xlsx_export(
    path: &str,
    worksheet_name: Option<&str>,
    schema: SchemaVersion,
) -> SurveyResult<Vec<Response>> {
    let wrange = get_range(path, worksheet_name)?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = (idx + 1) as u64;
        let cells = row
            .iter()
            .map(|c| cell_to_string(c, lineno))
            .collect::<SurveyResult<Vec<String>>>()?;
        rows.push(cells);
    }
    let res = rows_to_responses(schema, rows, path)?;
    info!("read_xlsx_export: {:?}: {} responses", path, res.len());
    Ok(res)
}

/// Cells as they would be written in the CSV store.
///
/// Whole numbers lose their decimal part, so that ratings read back as integers. A phone
/// number typed as a number has already lost its leading zeros in the spreadsheet.
fn cell_to_string(cell: &DataType, lineno: u64) -> SurveyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok(String::new()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        x => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", x),
        }
        .fail(),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> SurveyResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }

    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => EmptyExcelSnafu { path }.fail(),
        [(name, wrange)] => {
            debug!("get_range: using the only worksheet {:?}", name);
            Ok(wrange.clone())
        }
        _ => AmbiguousWorksheetSnafu { path }.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_to_string(&DataType::Float(4.0), 2).unwrap(), "4");
        assert_eq!(cell_to_string(&DataType::Float(2.5), 2).unwrap(), "2.5");
        assert_eq!(cell_to_string(&DataType::Int(612345678), 2).unwrap(), "612345678");
        assert_eq!(cell_to_string(&DataType::Empty, 2).unwrap(), "");
        assert_eq!(
            cell_to_string(&DataType::String("0612345678".to_string()), 2).unwrap(),
            "0612345678"
        );
        assert!(matches!(
            cell_to_string(&DataType::DateTime(44000.5), 7),
            Err(SurveyError::ExcelWrongCellType { lineno: 7, .. })
        ));
    }

    #[test]
    fn missing_export() {
        assert!(matches!(
            read_xlsx_export("/nonexistent/export.xlsx", None, SchemaVersion::V2),
            Err(SurveyError::OpeningExcel { .. })
        ));
    }
}
