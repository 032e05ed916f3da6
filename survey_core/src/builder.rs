pub use crate::config::*;

/// A submission as entered on the form, before any check.
///
/// Text fields are kept verbatim: an empty string means the field was left
/// blank. Ratings are the raw slider values.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawSubmission {
    pub workshops: Vec<Workshop>,
    pub massage_oil_rating: u8,
    pub muscle_spray_rating: u8,
    pub future_interests: Vec<Interest>,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub feedback: String,
}

impl Default for RawSubmission {
    fn default() -> Self {
        RawSubmission {
            workshops: Vec::new(),
            massage_oil_rating: Rating::DEFAULT.value(),
            muscle_spray_rating: Rating::DEFAULT.value(),
            future_interests: Vec::new(),
            name: String::new(),
            email: String::new(),
            whatsapp: String::new(),
            feedback: String::new(),
        }
    }
}

/// A builder for filling in the form.
///
/// ```
/// use survey_core::builder::SubmissionBuilder;
/// use survey_core::Workshop;
///
/// let raw = SubmissionBuilder::new()
///     .workshop(Workshop::KleponMaken)
///     .massage_oil(4)
///     .email("sari@example.com")
///     .whatsapp("0612345678")
///     .build();
///
/// assert_eq!(raw.muscle_spray_rating, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubmissionBuilder {
    raw: RawSubmission,
}

impl SubmissionBuilder {
    pub fn new() -> SubmissionBuilder {
        SubmissionBuilder::default()
    }

    pub fn workshop(mut self, workshop: Workshop) -> SubmissionBuilder {
        self.raw.workshops.push(workshop);
        self
    }

    pub fn workshops(mut self, workshops: &[Workshop]) -> SubmissionBuilder {
        self.raw.workshops.extend_from_slice(workshops);
        self
    }

    pub fn massage_oil(mut self, rating: u8) -> SubmissionBuilder {
        self.raw.massage_oil_rating = rating;
        self
    }

    pub fn muscle_spray(mut self, rating: u8) -> SubmissionBuilder {
        self.raw.muscle_spray_rating = rating;
        self
    }

    pub fn interest(mut self, interest: Interest) -> SubmissionBuilder {
        self.raw.future_interests.push(interest);
        self
    }

    pub fn interests(mut self, interests: &[Interest]) -> SubmissionBuilder {
        self.raw.future_interests.extend_from_slice(interests);
        self
    }

    pub fn name(mut self, name: &str) -> SubmissionBuilder {
        self.raw.name = name.to_string();
        self
    }

    pub fn email(mut self, email: &str) -> SubmissionBuilder {
        self.raw.email = email.to_string();
        self
    }

    pub fn whatsapp(mut self, whatsapp: &str) -> SubmissionBuilder {
        self.raw.whatsapp = whatsapp.to_string();
        self
    }

    pub fn feedback(mut self, feedback: &str) -> SubmissionBuilder {
        self.raw.feedback = feedback.to_string();
        self
    }

    pub fn build(self) -> RawSubmission {
        self.raw
    }
}
