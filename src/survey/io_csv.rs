// The local file store: one response per line of a CSV file.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::survey::{io_common::ensure_header, *};

pub struct CsvResponseStore {
    path: PathBuf,
    schema: SchemaVersion,
}

impl CsvResponseStore {
    pub fn new<P: AsRef<Path>>(path: P, schema: SchemaVersion) -> CsvResponseStore {
        CsvResponseStore {
            path: path.as_ref().to_path_buf(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Reads the whole file. A missing file has no responses.
    pub fn read_responses(&self) -> SurveyResult<Vec<Response>> {
        let path = self.display_path();
        if !self.path.exists() {
            debug!("read_responses: {:?} does not exist yet", path);
            return Ok(Vec::new());
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .context(OpeningCsvSnafu { path: &path })?;
        let mut records = rdr.records();

        let header = match records.next() {
            None => return Ok(Vec::new()),
            Some(line_r) => line_r.context(CsvLineParseSnafu {
                path: &path,
                lineno: 1u64,
            })?,
        };
        // Spreadsheet programs may save the file with a byte order mark.
        let header_cells: Vec<&str> = header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                if idx == 0 {
                    cell.trim_start_matches('\u{feff}')
                } else {
                    cell
                }
            })
            .collect();
        ensure_header(self.schema, &header_cells, &path)?;

        let mut res: Vec<Response> = Vec::new();
        for (idx, line_r) in records.enumerate() {
            // Responses may span several lines (quoted line breaks in the feedback).
            let record_no = (idx + 2) as u64;
            let line = line_r.context(CsvLineParseSnafu {
                path: &path,
                lineno: record_no,
            })?;
            let lineno = line.position().map(|p| p.line()).unwrap_or(record_no);
            let cells: Vec<&str> = line.iter().collect();
            let response = Response::from_row(self.schema, &cells)
                .context(MalformedRowSnafu { path: &path, lineno })?;
            res.push(response);
        }
        debug!("read_responses: {:?}: {} responses", path, res.len());
        Ok(res)
    }

    /// Appends one line. The header is written first when the file is new or empty.
    pub fn append_response(&self, response: &Response) -> SurveyResult<()> {
        let path = self.display_path();
        let needs_header = match fs::metadata(&self.path) {
            Ok(m) => m.len() == 0,
            Err(_) => true,
        };
        let needs_newline = !needs_header
            && missing_final_newline(&self.path).context(WritingFileSnafu { path: &path })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(WritingFileSnafu { path: &path })?;
        if needs_newline {
            debug!("append_response: {:?} does not end with a line break", path);
            file.write_all(b"\n")
                .context(WritingFileSnafu { path: &path })?;
        }
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            info!("append_response: creating {:?} ({} layout)", path, self.schema);
            wtr.write_record(self.schema.header())
                .context(WritingCsvSnafu { path: &path })?;
        }
        wtr.write_record(response.to_row(self.schema))
            .context(WritingCsvSnafu { path: &path })?;
        wtr.flush().context(WritingFileSnafu { path: &path })?;
        Ok(())
    }
}

/// True if the last line of a non-empty file is not terminated.
fn missing_final_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl ResponseStore for CsvResponseStore {
    fn list_all(&self) -> Result<Vec<Response>, StorageError> {
        self.read_responses().map_err(StorageError::new)
    }

    fn append(&mut self, response: &Response) -> Result<(), StorageError> {
        self.append_response(response).map_err(StorageError::new)
    }
}
