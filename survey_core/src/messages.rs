//! The fixed (Dutch) texts shown to attendees and organisers.

pub const SURVEY_TITLE: &str = "Javaanse Rituelen en Recepten - Enquête";

pub const INTRODUCTION: &str = "Bedankt voor je deelname aan onze workshop(s)! Vul deze korte enquête in en maak kans op een wellnesspakket.";

pub const THANK_YOU: &str = "Bedankt voor je deelname! Je maakt nu kans op het wellnesspakket.";

pub const MISSING_CONTACT: &str = "Vul alstublieft uw e-mailadres en WhatsApp-nummer in.";

pub const MISSING_CONTACT_WITH_NAME: &str =
    "Vul alstublieft uw naam, e-mailadres en WhatsApp-nummer in.";

pub const INVALID_EMAIL: &str = "Vul alstublieft een geldig e-mailadres in.";

pub const INVALID_PHONE: &str = "Vul alstublieft een geldig telefoonnummer in (alleen cijfers).";

pub const INVALID_RATING: &str = "Geef alstublieft een beoordeling van 1 tot en met 5.";

pub const DUPLICATE_EMAIL: &str = "Dit e-mailadres is al gebruikt voor een eerdere inzending.";

pub const DUPLICATE_WHATSAPP: &str =
    "Dit WhatsApp-nummer is al gebruikt voor een eerdere inzending.";

pub const STORAGE_FAILURE: &str =
    "Er is iets misgegaan bij het opslaan of ophalen van de gegevens. Probeer het later opnieuw.";

pub const NO_PARTICIPANTS: &str = "Geen deelnemers beschikbaar voor de trekking.";

pub const PARTICIPANTS_HEADING: &str = "Deelnemers:";

pub const QR_INSTRUCTIONS: &str = "Scan deze QR code om de enquête in te vullen:";

/// The announcement of the draw result.
pub fn winner_announcement(winner: &str) -> String {
    format!("🎉 Winnaar: {}", winner)
}

/// One frame of the spinning wheel.
pub fn spin_frame(candidate: &str) -> String {
    format!("🎯 {}", candidate)
}
