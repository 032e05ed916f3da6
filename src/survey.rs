use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_core::builder::SubmissionBuilder;
use survey_core::messages;
use survey_core::*;

use std::fs;
use std::io::Write;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use serde::{Deserialize, Serialize};

use crate::args::{Command, DrawArgs, QrArgs, SubmitArgs};
use crate::survey::config_reader::*;
use crate::survey::io_csv::CsvResponseStore;
use crate::survey::io_sheets::{SheetsResponseStore, SheetsSettings};

pub mod config_reader;
mod io_common;
pub mod io_csv;
pub mod io_sheets;
pub mod io_xlsx;
pub mod qr;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Error writing to {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing to {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The header of {path} does not match the {schema} layout, found: {found:?}"))]
    SchemaMismatch {
        path: String,
        schema: SchemaVersion,
        found: Vec<String>,
    },
    #[snafu(display("Malformed response on line {lineno} of {path}"))]
    MalformedRow {
        source: RowError,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Invalid choice on the command line"))]
    InvalidChoice { source: RowError },

    #[snafu(display("Invalid endpoint for the spreadsheet service: {endpoint}"))]
    SheetsEndpoint { endpoint: String },
    #[snafu(display("Request to the spreadsheet service failed"))]
    SheetsRequest { source: reqwest::Error },
    #[snafu(display("The spreadsheet service answered with status {status}: {body}"))]
    SheetsStatus { status: u16, body: String },
    #[snafu(display(
        "No access token for the spreadsheet service (set store.accessToken or {})",
        io_sheets::ACCESS_TOKEN_ENV
    ))]
    MissingAccessToken {},

    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("No worksheet named {name} in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("{path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Cannot read cell on row {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error with json content"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(display("Cannot encode {url} as a QR code"))]
    QrEncode {
        source: qrcode::types::QrError,
        url: String,
    },
    #[snafu(display("Error writing image {path}"))]
    QrImage {
        source: image::ImageError,
        path: String,
    },

    #[snafu(display("{}", source.user_message()))]
    Submission { source: SubmitError },
    #[snafu(display("{}", source.user_message()))]
    Draw { source: DrawError },
    #[snafu(display("{}", messages::STORAGE_FAILURE))]
    Storage { source: StorageError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

// ********* Stores ***********

/// Opens the store described by the configuration.
pub fn open_store(config: &SurveyConfig) -> SurveyResult<Box<dyn ResponseStore>> {
    let schema = config.schema()?;
    let source = &config.store;
    info!(
        "open_store: provider {:?} with the {} layout",
        source.provider, schema
    );
    match source.provider.as_str() {
        "csv" => {
            let path = source
                .file_path
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSES_PATH.to_string());
            let store = CsvResponseStore::new(path, schema);
            debug!("open_store: csv file {:?}", store.path());
            Ok(Box::new(store))
        }
        "sheets" => {
            let spreadsheet_id = match source.spreadsheet_id.clone() {
                Some(id) if !id.is_empty() => id,
                _ => whatever!("The sheets store requires store.spreadsheetId"),
            };
            let access_token = source
                .access_token
                .clone()
                .or_else(|| std::env::var(io_sheets::ACCESS_TOKEN_ENV).ok())
                .context(MissingAccessTokenSnafu {})?;
            let settings = SheetsSettings {
                endpoint: source
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| io_sheets::DEFAULT_ENDPOINT.to_string()),
                spreadsheet_id,
                sheet_name: source.sheet_name.clone(),
                access_token,
            };
            Ok(Box::new(SheetsResponseStore::new(settings, schema)))
        }
        x => whatever!("Store provider not implemented {:?}", x),
    }
}

// ********* Submissions ***********

fn parse_choices<L: Label>(values: &[String]) -> SurveyResult<Vec<L>> {
    let mut res: Vec<L> = Vec::new();
    for s in values {
        let c = L::parse_choice(s)
            .ok_or_else(|| RowError::UnknownLabel { label: s.clone() })
            .context(InvalidChoiceSnafu {})?;
        res.push(c);
    }
    Ok(res)
}

/// Fills in the form with the values of the command line.
pub fn submission_from_args(args: &SubmitArgs) -> SurveyResult<builder::RawSubmission> {
    let workshops: Vec<Workshop> = parse_choices(&args.workshop)?;
    let interests: Vec<Interest> = parse_choices(&args.interest)?;
    Ok(SubmissionBuilder::new()
        .workshops(&workshops)
        .massage_oil(args.massage_oil)
        .muscle_spray(args.muscle_spray)
        .interests(&interests)
        .name(&args.name)
        .email(&args.email)
        .whatsapp(&args.whatsapp)
        .feedback(&args.feedback)
        .build())
}

pub fn run_submit<S: ResponseStore>(
    service: &mut SurveyService<S>,
    args: &SubmitArgs,
) -> SurveyResult<()> {
    let raw = submission_from_args(args)?;
    debug!("run_submit: raw submission: {:?}", raw);
    let mut session = Session::new();
    match service.submit(&mut session, &raw) {
        Ok(_) => {
            debug!("run_submit: session state {:?}", session.state());
            println!("{}", messages::THANK_YOU);
            Ok(())
        }
        Err(e) => {
            if let SubmitError::Storage(inner) = &e {
                warn!("run_submit: storage failure: {}", inner);
            }
            Err(e).context(SubmissionSnafu {})
        }
    }
}

// ********* Participants and draw ***********

pub fn run_list<S: ResponseStore>(service: &SurveyService<S>) -> SurveyResult<()> {
    let participants = service.participants().context(StorageSnafu {})?;
    info!("run_list: {} participants", participants.len());
    println!("{}", messages::PARTICIPANTS_HEADING);
    for p in participants.iter() {
        println!("{}\t{}", p.email, p.whatsapp);
    }
    Ok(())
}

/// Shows the spinning wheel, then draws the winner.
///
/// The frames of the wheel are independent picks, for show only: the winner is a
/// separate pick and may differ from the last frame.
pub fn spin_wheel<R, W>(
    participants: &[Response],
    spins: u32,
    delay: Duration,
    rng: &mut R,
    out: &mut W,
) -> SurveyResult<Response>
where
    R: Rng + ?Sized,
    W: Write,
{
    if participants.is_empty() {
        return Err(DrawError::NoParticipants).context(DrawSnafu {});
    }
    for _ in 0..spins {
        if let Some(p) = participants.choose(rng) {
            writeln!(out, "{}", messages::spin_frame(&p.email))
                .context(WritingFileSnafu { path: "stdout" })?;
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    let winner = draw_winner(participants, rng).context(DrawSnafu {})?;
    writeln!(out, "{}", messages::winner_announcement(&winner.email))
        .context(WritingFileSnafu { path: "stdout" })?;
    Ok(winner.clone())
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DrawSummary {
    pub participants: usize,
    pub winner: WinnerSummary,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct WinnerSummary {
    pub name: Option<String>,
    pub email: String,
    pub whatsapp: String,
}

fn write_summary(summary: &DrawSummary, out: &str) -> SurveyResult<()> {
    let pretty_js = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("write_summary: writing draw summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingFileSnafu { path: out })?;
    }
    Ok(())
}

pub fn run_draw<S: ResponseStore>(
    service: &SurveyService<S>,
    settings: &DrawSettings,
    args: &DrawArgs,
) -> SurveyResult<()> {
    let participants = match &args.input {
        Some(path) => io_xlsx::read_xlsx_export(
            path,
            args.excel_worksheet_name.as_deref(),
            service.schema(),
        )?,
        None => service.participants().context(StorageSnafu {})?,
    };
    info!("run_draw: {} participants", participants.len());

    let seed = args.seed.or(settings.random_seed);
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let spins = args.spins.or(settings.spin_count).unwrap_or(DEFAULT_SPIN_COUNT);
    let delay = Duration::from_millis(settings.spin_delay_ms.unwrap_or(DEFAULT_SPIN_DELAY_MS));

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let winner = spin_wheel(&participants, spins, delay, &mut rng, &mut handle)?;

    if let Some(out) = &args.out {
        let summary = DrawSummary {
            participants: participants.len(),
            winner: WinnerSummary {
                name: winner.name.clone(),
                email: winner.email.clone(),
                whatsapp: winner.whatsapp.clone(),
            },
            random_seed: seed,
        };
        write_summary(&summary, out)?;
    }
    Ok(())
}

// ********* QR code ***********

pub fn run_qr(config: &SurveyConfig, args: &QrArgs) -> SurveyResult<()> {
    let url = qr::resolve_survey_url(
        args.url.clone(),
        config.survey_url.clone(),
        qr::url_from_env(|name| std::env::var(name).ok()),
    );
    info!("run_qr: encoding {:?}", url);
    let code = qr::encode(&url)?;
    println!("{}", messages::QR_INSTRUCTIONS);
    println!("{}", qr::render_terminal(&code));
    println!("{}", url);
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| qr::DEFAULT_QR_PATH.to_string());
    qr::write_png(&code, &out)
}

// ********* Entry point ***********

fn open_service(config: &SurveyConfig) -> SurveyResult<SurveyService<Box<dyn ResponseStore>>> {
    let store = open_store(config)?;
    Ok(SurveyService::new(store, config.schema()?))
}

pub fn run(config: &SurveyConfig, command: &Command) -> SurveyResult<()> {
    match command {
        Command::Submit(submit_args) => run_submit(&mut open_service(config)?, submit_args),
        Command::List => run_list(&open_service(config)?),
        Command::Draw(draw_args) => run_draw(
            &open_service(config)?,
            &config.draw.clone().unwrap_or_default(),
            draw_args,
        ),
        Command::Qr(qr_args) => run_qr(config, qr_args),
    }
}
