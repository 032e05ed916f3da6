mod config;
mod error;
use log::{debug, info};

use rand::seq::SliceRandom;
use rand::Rng;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::store::*;

pub mod builder;
pub mod manual;
pub mod messages;
pub mod store;

use crate::builder::RawSubmission;

// ********* Session ***********

/// Where the attendee is in the form.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum SessionState {
    /// The form is shown.
    #[default]
    Idle,
    /// A response was recorded, the thank-you message is shown.
    Submitted,
}

/// Per-attendee state, owned by the caller and passed to the service.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn thank_you_shown(&self) -> bool {
        self.state == SessionState::Submitted
    }

    /// Shows the form again, for a new submission.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

// ********* Validation ***********

/// Runs the format checks on a raw submission and builds the response to store.
///
/// The checks run in order and the first failure is returned:
/// * the contact fields are filled in (the name only if the schema has a name column)
/// * the email contains an `@`
/// * the whatsapp number only has digits
/// * the ratings are on the 1 to 5 scale
pub fn validate_submission(
    raw: &RawSubmission,
    schema: SchemaVersion,
) -> Result<Response, ValidationError> {
    let missing = |field: ContactField| ValidationError::MissingRequiredField { field, schema };
    if schema.has_name() && raw.name.is_empty() {
        return Err(missing(ContactField::Name));
    }
    if raw.email.is_empty() {
        return Err(missing(ContactField::Email));
    }
    if raw.whatsapp.is_empty() {
        return Err(missing(ContactField::Whatsapp));
    }

    if !raw.email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }

    if !raw.whatsapp.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPhone);
    }

    let rating = |value: u8| Rating::new(value).ok_or(ValidationError::InvalidRating { value });

    Ok(Response {
        workshops_attended: dedup_choices(&raw.workshops),
        massage_oil_rating: rating(raw.massage_oil_rating)?,
        muscle_spray_rating: rating(raw.muscle_spray_rating)?,
        future_interests: dedup_choices(&raw.future_interests),
        name: if schema.has_name() {
            Some(raw.name.clone())
        } else {
            None
        },
        email: raw.email.clone(),
        whatsapp: raw.whatsapp.clone(),
        feedback: if raw.feedback.is_empty() {
            None
        } else {
            Some(raw.feedback.clone())
        },
    })
}

// ********* Draw ***********

/// Picks the winner of the draw, uniformly at random.
///
/// Nothing is recorded: calling it again may return another entry, and past
/// winners stay in the running.
pub fn draw_winner<'a, T, R>(entries: &'a [T], rng: &mut R) -> Result<&'a T, DrawError>
where
    R: Rng + ?Sized,
{
    let winner = entries.choose(rng).ok_or(DrawError::NoParticipants)?;
    debug!("draw_winner: picked among {} entries", entries.len());
    Ok(winner)
}

// ********* Service ***********

/// Accepts submissions into a store and runs the draw over it.
pub struct SurveyService<S: ResponseStore> {
    store: S,
    schema: SchemaVersion,
}

impl<S: ResponseStore> SurveyService<S> {
    pub fn new(store: S, schema: SchemaVersion) -> SurveyService<S> {
        SurveyService { store, schema }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates the submission and checks that its contact fields are not on file yet.
    ///
    /// Nothing is written. Between this check and the append of `submit`, another
    /// session may record the same contact.
    pub fn prepare(&self, raw: &RawSubmission) -> Result<Response, SubmitError> {
        let response = validate_submission(raw, self.schema)?;
        if let Some(field) = self.store.exists(&response.email, &response.whatsapp)? {
            info!("prepare: {} already used by a previous submission", field);
            return Err(SubmitError::Duplicate(field));
        }
        Ok(response)
    }

    /// Records a submission and moves the session to the thank-you state.
    pub fn submit(
        &mut self,
        session: &mut Session,
        raw: &RawSubmission,
    ) -> Result<Response, SubmitError> {
        let response = self.prepare(raw)?;
        self.store.append(&response)?;
        session.state = SessionState::Submitted;
        info!(
            "submit: recorded response for {} (schema {})",
            response.email, self.schema
        );
        Ok(response)
    }

    /// Everyone taking part in the draw, in storage order.
    pub fn participants(&self) -> Result<Vec<Response>, StorageError> {
        self.store.list_all()
    }

    /// Reads all the stored responses and draws one of them.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Response, DrawError> {
        let entries = self.participants()?;
        info!("draw: {} participants", entries.len());
        draw_winner(&entries, rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::builder::SubmissionBuilder;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn form(email: &str, whatsapp: &str) -> RawSubmission {
        SubmissionBuilder::new()
            .workshops(&[Workshop::KleponMaken, Workshop::PitjitMassage])
            .massage_oil(4)
            .muscle_spray(5)
            .interest(Interest::JamuWorkshop)
            .name("Sari")
            .email(email)
            .whatsapp(whatsapp)
            .feedback("Heerlijke klepon!")
            .build()
    }

    fn service() -> SurveyService<MemoryStore> {
        SurveyService::new(MemoryStore::new(), SchemaVersion::V2)
    }

    struct UnavailableStore {}

    impl ResponseStore for UnavailableStore {
        fn list_all(&self) -> Result<Vec<Response>, StorageError> {
            Err(StorageError::new("connection refused"))
        }

        fn append(&mut self, _response: &Response) -> Result<(), StorageError> {
            Err(StorageError::new("connection refused"))
        }
    }

    #[test]
    fn accepted_submission_is_listed_once() {
        init();
        let mut svc = service();
        let mut session = Session::new();
        let res = svc.submit(&mut session, &form("sari@example.com", "0612345678"));
        assert!(res.is_ok());
        assert!(session.thank_you_shown());

        let all = svc.participants().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "sari@example.com");
        assert_eq!(all[0].name.as_deref(), Some("Sari"));
        assert_eq!(all[0].massage_oil_rating.value(), 4);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        init();
        let mut svc = service();
        let mut session = Session::new();
        svc.submit(&mut session, &form("sari@example.com", "0612345678"))
            .unwrap();
        session.reset();

        let res = svc.submit(&mut session, &form("sari@example.com", "0687654321"));
        assert!(matches!(res, Err(SubmitError::Duplicate(DedupField::Email))));
        assert_eq!(
            res.unwrap_err().user_message(),
            messages::DUPLICATE_EMAIL
        );
        assert_eq!(svc.store().len(), 1);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn duplicate_whatsapp_is_rejected() {
        init();
        let mut svc = service();
        let mut session = Session::new();
        svc.submit(&mut session, &form("sari@example.com", "0612345678"))
            .unwrap();

        let res = svc.submit(&mut session, &form("budi@example.com", "0612345678"));
        assert!(matches!(
            res,
            Err(SubmitError::Duplicate(DedupField::Whatsapp))
        ));
        assert_eq!(svc.store().len(), 1);
    }

    #[test]
    fn email_conflict_reported_before_whatsapp_conflict() {
        let stored = vec![
            validate_submission(&form("a@example.com", "111"), SchemaVersion::V2).unwrap(),
            validate_submission(&form("b@example.com", "222"), SchemaVersion::V2).unwrap(),
        ];
        assert_eq!(
            find_conflict(&stored, "b@example.com", "111"),
            Some(DedupField::Email)
        );
        assert_eq!(find_conflict(&stored, "c@example.com", "222"), Some(DedupField::Whatsapp));
        assert_eq!(find_conflict(&stored, "c@example.com", "333"), None);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let mut svc = service();
        let mut session = Session::new();
        svc.submit(&mut session, &form("sari@example.com", "0612345678"))
            .unwrap();
        let res = svc.submit(&mut session, &form("Sari@Example.com", "0600000000"));
        assert!(res.is_ok());
        assert_eq!(svc.store().len(), 2);
    }

    #[test]
    fn phone_with_letters_is_rejected_first() {
        let mut svc = service();
        let mut session = Session::new();
        let res = svc.submit(&mut session, &form("sari@example.com", "123abc"));
        assert!(matches!(
            res,
            Err(SubmitError::Validation(ValidationError::InvalidPhone))
        ));
        assert!(!session.thank_you_shown());
        assert!(svc.store().is_empty());

        // Invalid regardless of the duplicate check.
        svc.submit(&mut session, &form("sari@example.com", "0612345678"))
            .unwrap();
        let res = svc.submit(&mut session, &form("sari@example.com", "123abc"));
        assert!(matches!(
            res,
            Err(SubmitError::Validation(ValidationError::InvalidPhone))
        ));
    }

    #[test]
    fn email_without_at_is_rejected() {
        let res = validate_submission(&form("nouser.example.com", "0612345678"), SchemaVersion::V2);
        assert_eq!(res, Err(ValidationError::InvalidEmail));
        // The email check comes before the phone check.
        let res = validate_submission(&form("nouser.example.com", "12ab"), SchemaVersion::V2);
        assert_eq!(res, Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn missing_fields_come_first() {
        let res = validate_submission(&form("", "12ab"), SchemaVersion::V2);
        assert_eq!(
            res,
            Err(ValidationError::MissingRequiredField {
                field: ContactField::Email,
                schema: SchemaVersion::V2
            })
        );
        let res = validate_submission(&form("nouser", ""), SchemaVersion::V2);
        assert!(matches!(
            res,
            Err(ValidationError::MissingRequiredField {
                field: ContactField::Whatsapp,
                ..
            })
        ));
    }

    #[test]
    fn name_required_only_with_name_column() {
        let raw = SubmissionBuilder::new()
            .email("sari@example.com")
            .whatsapp("0612345678")
            .build();
        let err = validate_submission(&raw, SchemaVersion::V2).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                field: ContactField::Name,
                schema: SchemaVersion::V2
            }
        );
        assert_eq!(err.user_message(), messages::MISSING_CONTACT_WITH_NAME);

        let res = validate_submission(&raw, SchemaVersion::V1).unwrap();
        assert_eq!(res.name, None);
        assert_eq!(res.feedback, None);
        assert_eq!(res.massage_oil_rating, Rating::DEFAULT);
    }

    #[test]
    fn out_of_scale_rating_is_rejected() {
        let raw = SubmissionBuilder::new()
            .name("Budi")
            .email("budi@example.com")
            .whatsapp("0612345678")
            .muscle_spray(6)
            .build();
        assert_eq!(
            validate_submission(&raw, SchemaVersion::V2),
            Err(ValidationError::InvalidRating { value: 6 })
        );
    }

    #[test]
    fn repeated_choices_are_dropped() {
        let raw = SubmissionBuilder::new()
            .workshops(&[Workshop::PitjitMassage, Workshop::KleponMaken, Workshop::PitjitMassage])
            .name("Budi")
            .email("budi@example.com")
            .whatsapp("0612345678")
            .build();
        let res = validate_submission(&raw, SchemaVersion::V2).unwrap();
        assert_eq!(
            res.workshops_attended,
            vec![Workshop::PitjitMassage, Workshop::KleponMaken]
        );
    }

    #[test]
    fn storage_failure_is_surfaced() {
        let mut svc = SurveyService::new(UnavailableStore {}, SchemaVersion::V2);
        let mut session = Session::new();
        let res = svc.submit(&mut session, &form("sari@example.com", "0612345678"));
        let err = res.unwrap_err();
        assert!(matches!(err, SubmitError::Storage(_)));
        assert_eq!(err.user_message(), messages::STORAGE_FAILURE);
        assert!(!session.thank_you_shown());

        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(svc.draw(&mut rng), Err(DrawError::Storage(_))));
    }

    // Known gap: nothing serializes the uniqueness check and the append.
    #[test]
    fn check_then_append_race_allows_duplicates() {
        let mut svc = service();
        let raw = form("sari@example.com", "0612345678");
        let first = svc.prepare(&raw).unwrap();
        let second = svc.prepare(&raw).unwrap();
        svc.store.append(&first).unwrap();
        svc.store.append(&second).unwrap();
        assert_eq!(svc.store().len(), 2);
    }

    #[test]
    fn session_stays_submitted_until_reset() {
        let mut svc = service();
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        svc.submit(&mut session, &form("sari@example.com", "0612345678"))
            .unwrap();
        let _ = svc.submit(&mut session, &form("sari@example.com", "0612345678"));
        assert_eq!(session.state(), SessionState::Submitted);
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn draw_over_nobody() {
        let mut rng = StdRng::seed_from_u64(42);
        let entries: Vec<Response> = vec![];
        let res = draw_winner(&entries, &mut rng);
        assert!(matches!(res, Err(DrawError::NoParticipants)));
        assert_eq!(
            res.unwrap_err().user_message(),
            messages::NO_PARTICIPANTS
        );

        let svc = service();
        assert!(matches!(svc.draw(&mut rng), Err(DrawError::NoParticipants)));
    }

    #[test]
    fn draw_returns_a_member() {
        init();
        let entries = vec!["a@example.com", "b@example.com", "c@example.com"];
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen: HashSet<&str> = HashSet::new();
        for _ in 0..300 {
            let w = draw_winner(&entries, &mut rng).unwrap();
            assert!(entries.contains(w));
            seen.insert(*w);
        }
        // Picks are with replacement: every entry keeps its chances.
        assert_eq!(seen.len(), entries.len());
    }

    #[test]
    fn draw_single_entry() {
        let mut svc = service();
        let mut session = Session::new();
        svc.submit(&mut session, &form("sari@example.com", "0612345678"))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..5 {
            assert_eq!(svc.draw(&mut rng).unwrap().email, "sari@example.com");
        }
    }

    #[test]
    fn row_round_trip() {
        let response = validate_submission(&form("sari@example.com", "0612345678"), SchemaVersion::V2)
            .unwrap();
        let row = response.to_row(SchemaVersion::V2);
        assert_eq!(row[0], "Klepon maken, Pitjit massage");
        assert_eq!(row[4], "Sari");
        assert_eq!(Response::from_row(SchemaVersion::V2, &row), Ok(response));
    }

    #[test]
    fn v1_rows_have_no_name() {
        let row = [
            "Geen van beide, ik was toeschouwer",
            "2",
            "3",
            "",
            "budi@example.com",
            "0612345678",
            "",
        ];
        let r = Response::from_row(SchemaVersion::V1, &row).unwrap();
        assert_eq!(r.workshops_attended, vec![Workshop::Spectator]);
        assert!(r.future_interests.is_empty());
        assert_eq!(r.name, None);
        assert_eq!(r.feedback, None);
        assert_eq!(r.to_row(SchemaVersion::V1), row.to_vec());

        assert_eq!(
            Response::from_row(SchemaVersion::V2, &row),
            Err(RowError::WrongColumnCount {
                expected: 8,
                found: 7
            })
        );
    }

    #[test]
    fn labels_containing_the_separator() {
        let choices = vec![
            Workshop::Spectator,
            Workshop::KleponMaken,
        ];
        let joined = join_labels(&choices);
        assert_eq!(joined, "Geen van beide, ik was toeschouwer, Klepon maken");
        assert_eq!(split_labels::<Workshop>(&joined), Ok(choices));
        assert_eq!(split_labels::<Interest>(""), Ok(vec![]));
        assert_eq!(
            split_labels::<Interest>("Workshop Jamu maken, Breien"),
            Err(RowError::UnknownLabel {
                label: "Breien".to_string()
            })
        );
    }

    #[test]
    fn invalid_stored_rating() {
        let row = ["", "zes", "3", "", "a@example.com", "1", ""];
        assert!(matches!(
            Response::from_row(SchemaVersion::V1, &row),
            Err(RowError::InvalidRating {
                column: "massage_oil_rating",
                ..
            })
        ));
    }

    #[test]
    fn choices_from_slug_or_label() {
        assert_eq!("klepon".parse::<Workshop>(), Ok(Workshop::KleponMaken));
        assert_eq!("Pitjit massage".parse::<Workshop>(), Ok(Workshop::PitjitMassage));
        assert_eq!("COOKING".parse::<Interest>(), Ok(Interest::IndonesianCooking));
        assert!("yoga".parse::<Interest>().is_err());
        assert_eq!("v1".parse::<SchemaVersion>(), Ok(SchemaVersion::V1));
        assert!(SchemaVersion::V2.is_header(SchemaVersion::V2.header()));
        assert!(!SchemaVersion::V1.is_header(SchemaVersion::V2.header()));
    }
}
