// QR code pointing attendees to the survey form.

use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;

use crate::survey::*;

pub const DEFAULT_SURVEY_URL: &str = "http://localhost:8501";
pub const SURVEY_URL_ENV: &str = "SURVEY_URL";
/// Name of the variable in earlier deployments of the form.
pub const STREAMLIT_URL_ENV: &str = "STREAMLIT_URL";
pub const DEFAULT_QR_PATH: &str = "enquete_qr.png";

/// The first non-empty of `SURVEY_URL`, then `STREAMLIT_URL`.
pub fn url_from_env<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    [SURVEY_URL_ENV, STREAMLIT_URL_ENV]
        .iter()
        .filter_map(|name| lookup(*name))
        .find(|s| !s.trim().is_empty())
}

/// The command line flag, then the configuration file, then the environment.
pub fn resolve_survey_url(
    flag: Option<String>,
    config: Option<String>,
    env: Option<String>,
) -> String {
    flag.into_iter()
        .chain(config)
        .chain(env)
        .find(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SURVEY_URL.to_string())
}

pub fn encode(url: &str) -> SurveyResult<QrCode> {
    QrCode::new(url.as_bytes()).context(QrEncodeSnafu { url })
}

/// Two modules per character, light on dark for terminals with a dark background.
pub fn render_terminal(code: &QrCode) -> String {
    code.render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .quiet_zone(true)
        .build()
}

pub fn write_png(code: &QrCode, path: &str) -> SurveyResult<()> {
    let img = code
        .render::<image::Luma<u8>>()
        .min_dimensions(200, 200)
        .build();
    img.save(path).context(QrImageSnafu { path })?;
    info!("write_png: QR code written to {:?}", path);
    Ok(())
}
