//! Product contribution: form assembly and multipart upload.
//!
//! A [`ContributionDraft`] is validated, flattened into the bracketed field
//! names the write API expects, and posted as `multipart/form-data`.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info, warn};

use foodscan_model::{ContributionDraft, ImageAttachment, TagField};

use crate::config::{AppInfo, LookupSettings};
use crate::error::ContributionError;
use crate::identity::InstallationId;

/// Nutri-Score algorithm version the form fields are filed under.
const FORM_NUTRISCORE_VERSION: &str = "2023";

/// One multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField<'a> {
    Text { name: String, value: String },
    File { name: String, image: &'a ImageAttachment },
}

impl FormField<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }

    fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Flatten a draft into form fields, in submission order.
///
/// Tag lists use repeated `<field>_tags[]` keys; Nutri-Score inputs go under
/// `nutriscore[2023][data][<key>]`; images are `images[<n>]` file parts.
#[must_use]
pub fn form_fields<'a>(
    draft: &'a ContributionDraft,
    app: &AppInfo,
    installation_id: InstallationId,
) -> Vec<FormField<'a>> {
    let mut fields = vec![
        FormField::text("code", draft.code.as_str()),
        FormField::text("product_name", draft.product_name.trim()),
        FormField::text("creator", draft.creator.trim()),
    ];

    for field in TagField::ALL {
        let key = format!("{}[]", field.form_key());
        fields.extend(
            draft
                .tags(field)
                .iter()
                .map(|tag| FormField::text(key.clone(), tag.clone())),
        );
    }
    fields.push(FormField::text("informers_tags[]", draft.creator.trim()));

    let data_key = |key: &str| format!("nutriscore[{FORM_NUTRISCORE_VERSION}][data][{key}]");
    for (key, value) in draft.nutrients.entries() {
        fields.push(FormField::text(data_key(key), value.to_string()));
    }
    for (key, value) in draft.flags.entries() {
        fields.push(FormField::text(data_key(key), value.to_string()));
    }
    if draft.grade.is_known() {
        fields.push(FormField::text(
            format!("nutriscore[{FORM_NUTRISCORE_VERSION}][grade]"),
            draft.grade.as_str(),
        ));
    }
    fields.push(FormField::text(
        format!("nutriscore[{FORM_NUTRISCORE_VERSION}][score]"),
        draft.score.to_string(),
    ));

    fields.extend(
        draft
            .images()
            .iter()
            .enumerate()
            .map(|(index, image)| FormField::File {
                name: format!("images[{index}]"),
                image,
            }),
    );

    fields.push(FormField::text("app_name", app.name.as_str()));
    fields.push(FormField::text("app_version", app.version.as_str()));
    fields.push(FormField::text("app_uuid", installation_id.to_string()));
    fields
}

/// What the service said about an accepted contribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContributionReceipt {
    pub status_verbose: Option<String>,
}

/// Remote contribution endpoint.
pub trait ContributionService {
    fn submit(&self, fields: &[FormField<'_>]) -> Result<ContributionReceipt, ContributionError>;
}

/// Blocking multipart client for `POST /cgi/product_jqm2.pl`.
#[derive(Debug, Clone)]
pub struct ContributionClient {
    client: Client,
    url: String,
}

impl ContributionClient {
    pub fn new(settings: &LookupSettings) -> Result<Self, ContributionError> {
        let user_agent = HeaderValue::from_str(&settings.app.user_agent())
            .map_err(|e| ContributionError::Submit(format!("invalid user agent: {e}")))?;
        let client = Client::builder()
            .timeout(settings.contribution_timeout())
            .default_headers([(USER_AGENT, user_agent)].into_iter().collect())
            .build()
            .map_err(|e| {
                ContributionError::Submit(format!("failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            url: settings.contribution_url(),
        })
    }
}

impl ContributionService for ContributionClient {
    fn submit(&self, fields: &[FormField<'_>]) -> Result<ContributionReceipt, ContributionError> {
        let mut form = Form::new();
        for field in fields {
            form = match field {
                FormField::Text { name, value } => form.text(name.clone(), value.clone()),
                FormField::File { name, image } => {
                    let part = Part::bytes(image.bytes.clone())
                        .file_name(image.file_name.clone())
                        .mime_str(&image.media_type)?;
                    form.part(name.clone(), part)
                }
            };
        }

        debug!("Posting contribution to {}", self.url);
        let response = self.client.post(&self.url).multipart(form).send()?;
        let status = response.status();
        let body = response.bytes()?;
        interpret_contribution_response(status, &body)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map a status and body onto a receipt or a typed error.
pub fn interpret_contribution_response(
    status: StatusCode,
    body: &[u8],
) -> Result<ContributionReceipt, ContributionError> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body).unwrap_or_default());
    }
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message);
    Err(ContributionError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Validate, submit, and reset the draft on success.
///
/// The draft is left untouched on failure so the user can correct it.
pub fn submit_contribution(
    draft: &mut ContributionDraft,
    service: &impl ContributionService,
    app: &AppInfo,
    installation_id: InstallationId,
) -> Result<ContributionReceipt, ContributionError> {
    draft.validate().map_err(ContributionError::Validation)?;

    let fields = form_fields(draft, app, installation_id);
    let receipt = match service.submit(&fields) {
        Ok(receipt) => receipt,
        Err(err) => {
            warn!(code = %draft.code, error = %err, "contribution failed");
            return Err(err);
        }
    };

    info!(code = %draft.code, images = draft.images().len(), "contribution accepted");
    draft.reset();
    Ok(receipt)
}
