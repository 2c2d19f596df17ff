//! Request extractors.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Multipart},
    http::{StatusCode, request::Parts},
};
use galeria_common::{AppError, AppResult};
use galeria_core::UploadFile;
use galeria_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// A drained multipart form: uploaded files plus text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read every part of the form.
    ///
    /// Parts named `file`, `files` or `photo` are collected as files. Anything
    /// else is read as text.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "file" | "files" | "photo" => {
                    let file_name = field.file_name().unwrap_or("unnamed").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !data.is_empty() {
                        form.files.push(UploadFile {
                            file_name,
                            content_type,
                            data,
                        });
                    }
                }
                _ => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// A non-blank text field.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && *v != "null")
            .map(ToString::to_string)
    }

    /// The `price` field. Missing means free.
    pub fn price(&self) -> AppResult<f64> {
        match self.text("price") {
            None => Ok(0.0),
            Some(raw) => match raw.parse::<f64>() {
                Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
                _ => Err(AppError::BadRequest(format!("Invalid price: {raw}"))),
            },
        }
    }

    /// Take the first uploaded file, if any.
    pub fn take_file(&mut self) -> Option<UploadFile> {
        if self.files.is_empty() {
            None
        } else {
            Some(self.files.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            files: Vec::new(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_price_defaults_to_free() {
        assert_eq!(form(&[]).price().unwrap_or(-1.0), 0.0);
        assert_eq!(form(&[("price", "")]).price().unwrap_or(-1.0), 0.0);
    }

    #[test]
    fn test_price_rejects_garbage() {
        assert!(form(&[("price", "abc")]).price().is_err());
        assert!(form(&[("price", "-3")]).price().is_err());
        assert_eq!(form(&[("price", "150.5")]).price().unwrap_or(0.0), 150.5);
    }

    #[test]
    fn test_text_skips_blank_and_null() {
        let form = form(&[("title", "  "), ("description", "null"), ("currency", "usd")]);
        assert_eq!(form.text("title"), None);
        assert_eq!(form.text("description"), None);
        assert_eq!(form.text("currency").as_deref(), Some("usd"));
    }
}
