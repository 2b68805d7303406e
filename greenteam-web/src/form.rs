//! Multipart form decoding.

use axum::extract::Multipart;
use greenteam::prelude::{Error, RequestForm, Result, Route, Specialist, Upload};
use greenteam::prompt::{DEFAULT_MONTHS, MODE_SPECIALIST};

/// Raw fields of one form post, before validation.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Routing-mode label.
    pub mode: String,
    /// Specialist selection.
    pub specialist: Option<String>,
    /// City text.
    pub city: String,
    /// Lookback window, as sent.
    pub months: Option<String>,
    /// Prompt text.
    pub prompt: String,
    /// CSV file, when one was chosen.
    pub upload: Option<Upload>,
}

impl Submission {
    /// Read every field of a multipart body.
    ///
    /// Unknown fields are skipped. An empty file part (no file chosen) is not
    /// an upload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body is not valid multipart data.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "csv" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await.map_err(malformed)?;
                    if !file_name.is_empty() {
                        submission.upload = Some(Upload::new(file_name, bytes.to_vec()));
                    }
                }
                "mode" => submission.mode = field.text().await.map_err(malformed)?,
                "specialist" => {
                    submission.specialist = Some(field.text().await.map_err(malformed)?);
                }
                "city" => submission.city = field.text().await.map_err(malformed)?,
                "months" => submission.months = Some(field.text().await.map_err(malformed)?),
                "prompt" => submission.prompt = field.text().await.map_err(malformed)?,
                _ => {}
            }
        }

        Ok(submission)
    }

    /// The requested route. A blank mode means the coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown mode or specialist.
    pub fn route(&self) -> Result<Route> {
        if self.mode.trim().is_empty() {
            return Ok(Route::Coordinator);
        }
        Route::parse(&self.mode, self.specialist.as_deref())
    }

    /// The lookback window: 1 to 12, 12 when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for anything else.
    pub fn months(&self) -> Result<u8> {
        let Some(raw) = self.months.as_deref().map(str::trim).filter(|m| !m.is_empty()) else {
            return Ok(DEFAULT_MONTHS);
        };
        raw.parse::<u8>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| Error::validation(format!("months must be between 1 and 12, got '{raw}'")))
    }

    /// Convert into a dispatchable request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the route or lookback window is
    /// invalid. The prompt itself is checked by the dispatcher.
    pub fn into_request(self) -> Result<RequestForm> {
        let route = self.route()?;
        let months = self.months()?;

        let mut form = RequestForm::new(route, self.prompt)
            .city(self.city)
            .months(months);
        if let Some(upload) = self.upload {
            form = form.upload(upload);
        }
        Ok(form)
    }

    /// The specialist shown in the selector, valid or not.
    pub(crate) fn selected_specialist(&self) -> Option<Specialist> {
        self.specialist.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// Whether single-specialist mode was asked for.
    pub(crate) fn wants_specialist(&self) -> bool {
        self.mode.trim() == MODE_SPECIALIST
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> Error {
    Error::validation(format!("malformed form data: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenteam::prelude::ErrorKind;

    fn submission(mode: &str, specialist: Option<&str>) -> Submission {
        Submission {
            mode: mode.into(),
            specialist: specialist.map(str::to_owned),
            prompt: "What changed?".into(),
            ..Submission::default()
        }
    }

    #[test]
    fn builds_a_specialist_request() {
        let mut sub = submission("Single Specialist", Some("Policy Reviewer"));
        sub.city = "Karachi".into();
        sub.months = Some("6".into());
        sub.upload = Some(Upload::new("air.csv", "a,b\n"));

        let form = sub.into_request().unwrap();
        assert_eq!(form.route, Route::Specialist(Specialist::Policy));
        assert_eq!(form.city, "Karachi");
        assert_eq!(form.months, Some(6));
        assert_eq!(form.upload.unwrap().file_name, "air.csv");
    }

    #[test]
    fn coordinator_ignores_the_selector() {
        let sub = submission("Team Coordinator", Some("News Analyst"));
        assert_eq!(sub.route().unwrap(), Route::Coordinator);
        assert_eq!(submission("", None).route().unwrap(), Route::Coordinator);
    }

    #[test]
    fn months_default_and_bounds() {
        let mut sub = submission("Team Coordinator", None);
        assert_eq!(sub.months().unwrap(), 12);

        sub.months = Some(" ".into());
        assert_eq!(sub.months().unwrap(), 12);

        sub.months = Some("1".into());
        assert_eq!(sub.months().unwrap(), 1);

        for bad in ["0", "13", "-1", "six"] {
            sub.months = Some(bad.into());
            assert_eq!(sub.months().unwrap_err().kind(), ErrorKind::InvalidRequest);
        }
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let err = submission("Single Specialist", Some("Hackernews Team"))
            .into_request()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = submission("Solo", None).into_request().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }
}
