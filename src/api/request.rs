//! API request helpers

use axum::Json;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum_extra::headers::ContentType;
use axum_extra::headers::HeaderMapExt;
use chrono::DateTime;
use chrono::Utc;
use mime::Mime;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::notes::Attachment;
use crate::notes::NewNote;

use super::Error;

/// Parse an expiry moment, RFC 3339 formatted
///
/// ```rust
/// let expires_at = "2026-10-18T12:00:00Z";
/// assert!(parse_expires_at(expires_at).is_ok())
/// ```
pub fn parse_expires_at(expires_at: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(expires_at.trim())
        .map(|expires_at| expires_at.with_timezone(&Utc))
        .map_err(|err| Error::bad_request("Invalid `expires_at`").with_description(err))
}

/// Parse a form checkbox or boolean field
pub fn parse_bool(value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "on" => Ok(true),
        "" | "0" | "f" | "false" | "off" => Ok(false),
        _ => Err(Error::bad_request("Invalid `destroy_after_read`")
            .with_description(format!(r#"Expected "true" or "false", got "{value}""#))),
    }
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(Error::payload_too_large("Request body too large"))
        }
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            JsonRejection::JsonSyntaxError(err) => {
                let description = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string);

                Err(Error::bad_request("JSON syntax error").with_description(description))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_description(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::payload_too_large("Request body too large")
    } else {
        Error::bad_request("Invalid multipart form").with_description(err.body_text())
    }
}

/// JSON flavour of the create note form
///
/// The snake case field names of the multipart form are accepted as well
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteJson {
    /// Text of the note
    #[serde(default)]
    contents: String,

    /// RFC 3339 moment the note expires
    #[serde(alias = "expires_at")]
    expires_at: DateTime<Utc>,

    /// Remove the note once it has been read
    #[serde(default, alias = "destroy_after_read")]
    destroy_after_read: bool,

    /// Name of the attached file
    #[serde(alias = "file_name")]
    file_name: Option<String>,

    /// Base64 encoded contents of the attached file
    #[serde(default, alias = "file_contents", with = "crate::base64_bytes")]
    file_contents: Option<Vec<u8>>,
}

impl CreateNoteJson {
    fn into_new_note(self) -> NewNote {
        NewNote {
            contents: self.contents,
            expires_at: self.expires_at,
            destroy_after_read: self.destroy_after_read,
            file: self.file_contents.map(|contents| Attachment {
                name: self.file_name.unwrap_or_default(),
                contents,
            }),
        }
    }
}

/// Read the create note form from a multipart body
///
/// Fields: `contents`, `expires_at`, `destroy_after_read`, `file_name` and the file part
/// `file_contents`, unknown fields are skipped
async fn parse_multipart(mut multipart: Multipart) -> Result<NewNote, Error> {
    let mut contents = String::new();
    let mut expires_at = None;
    let mut destroy_after_read = false;
    let mut file_name = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "contents" => contents = field.text().await.map_err(multipart_error)?,
            "expires_at" => {
                let value = field.text().await.map_err(multipart_error)?;
                expires_at = Some(parse_expires_at(&value)?);
            }
            "destroy_after_read" => {
                let value = field.text().await.map_err(multipart_error)?;
                destroy_after_read = parse_bool(&value)?;
            }
            "file_name" => file_name = Some(field.text().await.map_err(multipart_error)?),
            "file_contents" => {
                let part_name = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // an empty file input is still sent along by browsers
                if part_name.as_deref().unwrap_or_default().is_empty() && bytes.is_empty() {
                    continue;
                }

                file = Some((part_name, bytes.to_vec()));
            }
            _ => tracing::debug!("Skipping unknown form field: {name}"),
        }
    }

    let expires_at = expires_at.ok_or_else(|| Error::bad_request("Missing `expires_at`"))?;

    // an explicit `file_name` field wins over the name of the file part
    let file = file.map(|(part_name, contents)| Attachment {
        name: file_name.or(part_name).unwrap_or_default(),
        contents,
    });

    Ok(NewNote {
        contents,
        expires_at,
        destroy_after_read,
        file,
    })
}

/// Create note form, from either a multipart or a JSON body
pub struct NoteForm(pub NewNote);

impl<S> FromRequest<S> for NoteForm
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req.headers().typed_get::<ContentType>().map(Mime::from);

        match content_type {
            Some(content_type)
                if content_type.type_() == mime::MULTIPART
                    && content_type.subtype() == mime::FORM_DATA =>
            {
                let multipart = Multipart::from_request(req, state).await.map_err(|err| {
                    Error::bad_request("Invalid multipart form").with_description(err.body_text())
                })?;

                parse_multipart(multipart).await.map(NoteForm)
            }
            Some(content_type)
                if content_type.subtype() == mime::JSON
                    || content_type.suffix() == Some(mime::JSON) =>
            {
                let json = Json::<CreateNoteJson>::from_request(req, state).await;

                parse_json(json).map(|form| NoteForm(form.into_new_note()))
            }
            _ => Err(Error::bad_request(
                "Missing `multipart/form-data` or `application/json` content type",
            )),
        }
    }
}

fn parse_note_identifier(path: Result<Path<String>, PathRejection>) -> Result<String, Error> {
    match path {
        Ok(Path(identifier)) => Ok(identifier),
        Err(err) => match err {
            // not decodable, so it can never be an identifier
            PathRejection::FailedToDeserializePathParams(_err) => {
                Err(Error::not_found("Note not found"))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

/// Note identifier from the path, whether it is a valid one is left to the lifecycle
pub struct NoteIdentifier(pub String);

impl<S> FromRequestParts<S> for NoteIdentifier
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<String>::from_request_parts(parts, state).await;

        parse_note_identifier(path).map(NoteIdentifier)
    }
}

fn parse_query<Q>(query: Result<Query<Q>, QueryRejection>) -> Result<Q, Error> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(err) => match err {
            QueryRejection::FailedToDeserializeQueryString(err) => {
                Err(Error::bad_request("Invalid query string").with_description(err.body_text()))
            }
            err => Err(Error::bad_request("Unknown query error").with_description(err)),
        },
    }
}

/// Wrapper for the query extractor
pub struct QueryParameters<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryParameters<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<Q>::from_request_parts(parts, state).await;

        parse_query(query).map(QueryParameters)
    }
}
