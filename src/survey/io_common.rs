use crate::survey::*;

/// Checks that the first row of a store is the header of the layout.
pub fn ensure_header<S: AsRef<str>>(schema: SchemaVersion, header: &[S], path: &str) -> SurveyResult<()> {
    ensure!(
        schema.is_header(header),
        SchemaMismatchSnafu {
            path,
            schema,
            found: header
                .iter()
                .map(|s| s.as_ref().to_string())
                .collect::<Vec<String>>(),
        }
    );
    Ok(())
}

/// Fits a spreadsheet row to the layout.
///
/// Spreadsheets drop or add empty cells at the end of a row: short rows are padded,
/// trailing empty cells past the last column are dropped.
fn normalize_row(schema: SchemaVersion, mut row: Vec<String>) -> Vec<String> {
    let width = schema.column_count();
    while row.len() > width && row.last().map(|s| s.is_empty()).unwrap_or(false) {
        row.pop();
    }
    while row.len() < width {
        row.push(String::new());
    }
    row
}

/// Checks the contact cells of a row read without a header.
///
/// Without a header, a row of the other layout is only padded or trimmed and its
/// columns end up shifted: the email lands in the name column and so on.
fn check_contact_cells(response: &Response) -> Result<(), RowError> {
    if !response.email.contains('@') {
        return Err(RowError::InvalidContact {
            column: "email",
            value: response.email.clone(),
        });
    }
    if response.whatsapp.is_empty() || !response.whatsapp.chars().all(|c| c.is_ascii_digit()) {
        return Err(RowError::InvalidContact {
            column: "whatsapp",
            value: response.whatsapp.clone(),
        });
    }
    Ok(())
}

/// Reads the rows of a spreadsheet (remote range or exported file).
///
/// The first row is skipped when it is the header of the layout. Otherwise all the rows
/// are responses, in the column order of the layout, and their contact cells must look
/// like an email and a phone number. Blank rows are ignored.
pub fn rows_to_responses(
    schema: SchemaVersion,
    rows: Vec<Vec<String>>,
    path: &str,
) -> SurveyResult<Vec<Response>> {
    let skip = match rows.first() {
        Some(first) if schema.is_header(&normalize_row(schema, first.clone())) => 1,
        _ => 0,
    };
    debug!(
        "rows_to_responses: {:?}: {} rows, header present: {}",
        path,
        rows.len(),
        skip == 1
    );
    let mut res: Vec<Response> = Vec::new();
    for (idx, row) in rows.into_iter().enumerate().skip(skip) {
        if row.iter().all(|s| s.is_empty()) {
            continue;
        }
        // Spreadsheet rows start at 1.
        let lineno = (idx + 1) as u64;
        let cells = normalize_row(schema, row);
        let response = Response::from_row(schema, &cells)
            .and_then(|r| {
                if skip == 0 {
                    check_contact_cells(&r)?;
                }
                Ok(r)
            })
            .context(MalformedRowSnafu { path, lineno })?;
        res.push(response);
    }
    Ok(res)
}
