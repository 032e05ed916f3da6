// ********* Form choices ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// Separator between the selected labels of a multi-value field, as stored.
pub const LABEL_SEPARATOR: &str = ", ";

/// A fixed choice offered by the form.
///
/// The (Dutch) label is what gets stored. The slug is a short ASCII alias,
/// convenient on the command line.
pub trait Label: Sized + Copy + Eq + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;

    fn slug(&self) -> &'static str;

    /// Accepts the stored label or the slug (case-insensitive for the slug).
    fn parse_choice(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label() == s || c.slug().eq_ignore_ascii_case(s))
    }
}

/// The workshops of the day.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Workshop {
    KleponMaken,
    PitjitMassage,
    /// Did not take part, only watched.
    Spectator,
}

impl Label for Workshop {
    const ALL: &'static [Workshop] = &[
        Workshop::KleponMaken,
        Workshop::PitjitMassage,
        Workshop::Spectator,
    ];

    fn label(&self) -> &'static str {
        match self {
            Workshop::KleponMaken => "Klepon maken",
            Workshop::PitjitMassage => "Pitjit massage",
            Workshop::Spectator => "Geen van beide, ik was toeschouwer",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Workshop::KleponMaken => "klepon",
            Workshop::PitjitMassage => "pitjit",
            Workshop::Spectator => "spectator",
        }
    }
}

/// Topics for future workshops.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Interest {
    JamuWorkshop,
    PitjitCourse,
    IndonesianCooking,
    NoInterest,
}

impl Label for Interest {
    const ALL: &'static [Interest] = &[
        Interest::JamuWorkshop,
        Interest::PitjitCourse,
        Interest::IndonesianCooking,
        Interest::NoInterest,
    ];

    fn label(&self) -> &'static str {
        match self {
            Interest::JamuWorkshop => "Workshop Jamu maken",
            Interest::PitjitCourse => "Cursus Pitjit massage",
            Interest::IndonesianCooking => "Indonesische kookcursus",
            Interest::NoInterest => "Geen interesse op dit moment",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Interest::JamuWorkshop => "jamu",
            Interest::PitjitCourse => "pitjit-course",
            Interest::IndonesianCooking => "cooking",
            Interest::NoInterest => "none",
        }
    }
}

impl FromStr for Workshop {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workshop::parse_choice(s).ok_or_else(|| RowError::UnknownLabel {
            label: s.to_string(),
        })
    }
}

impl FromStr for Interest {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interest::parse_choice(s).ok_or_else(|| RowError::UnknownLabel {
            label: s.to_string(),
        })
    }
}

/// Joins the labels of the selected choices, in selection order.
pub fn join_labels<L: Label>(choices: &[L]) -> String {
    choices
        .iter()
        .map(|c| c.label())
        .collect::<Vec<&str>>()
        .join(LABEL_SEPARATOR)
}

/// Inverse of `join_labels`.
///
/// Some labels contain the separator themselves, so the known labels are matched
/// (longest first) instead of splitting on the separator.
pub fn split_labels<L: Label>(s: &str) -> Result<Vec<L>, RowError> {
    let mut res: Vec<L> = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let found = L::ALL
            .iter()
            .copied()
            .filter(|c| match rest.strip_prefix(c.label()) {
                Some(tail) => tail.is_empty() || tail.starts_with(LABEL_SEPARATOR),
                None => false,
            })
            .max_by_key(|c| c.label().len());
        match found {
            Some(c) => {
                res.push(c);
                rest = &rest[c.label().len()..];
                rest = rest.strip_prefix(LABEL_SEPARATOR).unwrap_or(rest);
            }
            None => {
                let label = rest.split(LABEL_SEPARATOR).next().unwrap_or(rest);
                return Err(RowError::UnknownLabel {
                    label: label.to_string(),
                });
            }
        }
    }
    Ok(res)
}

/// Drops repeated selections, keeping the first occurence.
pub fn dedup_choices<L: Label>(choices: &[L]) -> Vec<L> {
    let mut res: Vec<L> = Vec::new();
    for c in choices {
        if !res.contains(c) {
            res.push(*c);
        }
    }
    res
}

// ********* Ratings ***********

/// A product rating on the 1 to 5 scale of the form.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Where the sliders start.
    pub const DEFAULT: Rating = Rating(3);

    pub fn new(value: u8) -> Option<Rating> {
        if (Rating::MIN..=Rating::MAX).contains(&value) {
            Some(Rating(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::DEFAULT
    }
}

// ********* Storage schema ***********

/// The column layout of a store.
///
/// The layout is chosen explicitly. A store whose header does not match the
/// configured version is rejected, nothing is inferred from the number of columns.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SchemaVersion {
    /// The first layout, without a name column.
    V1,
    /// `name` inserted before `email`.
    V2,
}

const HEADER_V1: [&str; 7] = [
    "workshops",
    "massage_oil_rating",
    "muscle_spray_rating",
    "future_interests",
    "email",
    "whatsapp",
    "feedback",
];

const HEADER_V2: [&str; 8] = [
    "workshops",
    "massage_oil_rating",
    "muscle_spray_rating",
    "future_interests",
    "name",
    "email",
    "whatsapp",
    "feedback",
];

impl SchemaVersion {
    pub const CANONICAL: SchemaVersion = SchemaVersion::V2;

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            SchemaVersion::V1 => &HEADER_V1,
            SchemaVersion::V2 => &HEADER_V2,
        }
    }

    pub fn column_count(&self) -> usize {
        self.header().len()
    }

    pub fn has_name(&self) -> bool {
        matches!(self, SchemaVersion::V2)
    }

    /// The spreadsheet columns covered by this layout.
    pub fn column_range(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "A:G",
            SchemaVersion::V2 => "A:H",
        }
    }

    /// True if the given row is exactly the header of this layout.
    pub fn is_header<S: AsRef<str>>(&self, row: &[S]) -> bool {
        row.len() == self.column_count()
            && row
                .iter()
                .zip(self.header().iter())
                .all(|(cell, name)| cell.as_ref() == *name)
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        SchemaVersion::CANONICAL
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            x => Err(format!("unknown schema version {:?} (expected v1 or v2)", x)),
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

// ********* Responses ***********

/// One stored survey submission. Never modified once appended.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Response {
    pub workshops_attended: Vec<Workshop>,
    pub massage_oil_rating: Rating,
    pub muscle_spray_rating: Rating,
    pub future_interests: Vec<Interest>,
    pub name: Option<String>,
    pub email: String,
    pub whatsapp: String,
    pub feedback: Option<String>,
}

impl Response {
    /// The cells of this response, in the column order of the schema.
    pub fn to_row(&self, schema: SchemaVersion) -> Vec<String> {
        let mut row = vec![
            join_labels(&self.workshops_attended),
            self.massage_oil_rating.value().to_string(),
            self.muscle_spray_rating.value().to_string(),
            join_labels(&self.future_interests),
        ];
        if schema.has_name() {
            row.push(self.name.clone().unwrap_or_default());
        }
        row.push(self.email.clone());
        row.push(self.whatsapp.clone());
        row.push(self.feedback.clone().unwrap_or_default());
        row
    }

    pub fn from_row<S: AsRef<str>>(schema: SchemaVersion, cells: &[S]) -> Result<Response, RowError> {
        if cells.len() != schema.column_count() {
            return Err(RowError::WrongColumnCount {
                expected: schema.column_count(),
                found: cells.len(),
            });
        }
        let cell = |idx: usize| cells[idx].as_ref();
        let (name, offset) = if schema.has_name() {
            (non_empty(cell(4)), 1)
        } else {
            (None, 0)
        };
        Ok(Response {
            workshops_attended: split_labels(cell(0))?,
            massage_oil_rating: parse_rating("massage_oil_rating", cell(1))?,
            muscle_spray_rating: parse_rating("muscle_spray_rating", cell(2))?,
            future_interests: split_labels(cell(3))?,
            name,
            email: cell(4 + offset).to_string(),
            whatsapp: cell(5 + offset).to_string(),
            feedback: non_empty(cell(6 + offset)),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_rating(column: &'static str, s: &str) -> Result<Rating, RowError> {
    s.trim()
        .parse::<u8>()
        .ok()
        .and_then(Rating::new)
        .ok_or_else(|| RowError::InvalidRating {
            column,
            value: s.to_string(),
        })
}

/// The two contact fields that must each be unique across the store.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum DedupField {
    Email,
    Whatsapp,
}

impl Display for DedupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupField::Email => write!(f, "email"),
            DedupField::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

/// A stored row that cannot be read back as a response.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RowError {
    WrongColumnCount { expected: usize, found: usize },
    UnknownLabel { label: String },
    InvalidRating { column: &'static str, value: String },
    /// A contact cell that cannot hold that field, usually from a row with shifted columns.
    InvalidContact { column: &'static str, value: String },
}

impl Error for RowError {}

impl Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::WrongColumnCount { expected, found } => {
                write!(f, "expected {} columns, found {}", expected, found)
            }
            RowError::UnknownLabel { label } => write!(f, "unknown choice {:?}", label),
            RowError::InvalidRating { column, value } => {
                write!(f, "invalid rating {:?} in column {}", value, column)
            }
            RowError::InvalidContact { column, value } => {
                write!(f, "unexpected value {:?} in column {}", value, column)
            }
        }
    }
}
