use clap::{Parser, Subcommand};

/// Survey collection and prize draw for the workshop attendees.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the store, the schema and the draw settings.
    /// The flags below override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The local CSV file holding the responses. Setting this option selects the csv
    /// store, regardless of the store in the configuration file.
    #[clap(short, long, value_parser)]
    pub responses: Option<String>,

    /// (v1 or v2, default v2) The column layout of the store. v1 has no name column.
    #[clap(long, value_parser)]
    pub schema: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fills in the survey.
    Submit(SubmitArgs),
    /// Lists the participants of the draw.
    List,
    /// Draws the winner among all the respondents.
    Draw(DrawArgs),
    /// Generates the QR code pointing to the survey.
    Qr(QrArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct SubmitArgs {
    /// (repeatable) A workshop attended, by label or slug: klepon, pitjit, spectator.
    #[clap(short, long, value_parser)]
    pub workshop: Vec<String>,

    /// (1 to 5, default 3) Rating of the massage oil.
    #[clap(long, value_parser, default_value_t = 3)]
    pub massage_oil: u8,

    /// (1 to 5, default 3) Rating of the muscle spray.
    #[clap(long, value_parser, default_value_t = 3)]
    pub muscle_spray: u8,

    /// (repeatable) An interest for future workshops, by label or slug: jamu, pitjit-course,
    /// cooking, none.
    #[clap(short, long, value_parser)]
    pub interest: Vec<String>,

    #[clap(short, long, value_parser, default_value = "")]
    pub name: String,

    #[clap(short, long, value_parser, default_value = "")]
    pub email: String,

    /// Digits only.
    #[clap(long, value_parser, default_value = "")]
    pub whatsapp: String,

    #[clap(short, long, value_parser, default_value = "")]
    pub feedback: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DrawArgs {
    /// (file path, optional) Draw among the responses of a spreadsheet export (.xlsx) instead of
    /// the configured store.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. Only required when
    /// the file has several worksheets.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) If specified, a summary of the draw will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (integer, optional) Seed of the random generator, to replay a draw.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// Number of frames of the spinning wheel shown before the winner. 0 disables it.
    #[clap(long, value_parser)]
    pub spins: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct QrArgs {
    /// The URL encoded in the QR code. Defaults to the configured URL, then to the SURVEY_URL
    /// (or STREAMLIT_URL) environment variable.
    #[clap(short, long, value_parser)]
    pub url: Option<String>,

    /// (file path, default enquete_qr.png) Where to write the PNG image.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,
}
