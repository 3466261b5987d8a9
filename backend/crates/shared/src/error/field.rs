//! Field errors - per-field validation failures
//!
//! Request bodies are validated field by field and every failure is reported
//! at once as `errorsMessages: [{ message, field }]`.

use serde::Serialize;

use super::app_error::{AppError, AppResult};

/// 入力項目ごとの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub field: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: field.into(),
        }
    }
}

/// 検証エラーの収集器
///
/// 最初の失敗で止まらず、すべての項目を検証してからまとめて返します。
///
/// ## Examples
/// ```rust
/// use kernel::error::app_error::AppError;
/// use kernel::error::field::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// let name = errors.check("name", Ok::<_, AppError>("Rust notes"));
/// let url = errors.check("websiteUrl", Err::<&str, _>(AppError::bad_request("must be https")));
///
/// let err = errors.finish(name.zip(url)).unwrap_err();
/// assert_eq!(err.field_errors()[0].field, "websiteUrl");
/// ```
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 検証結果を記録し、成功した値を返す
    ///
    /// 失敗した場合はエラーメッセージを `field` に紐づけて保持します。
    pub fn check<T>(&mut self, field: &str, result: AppResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, err.message());
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(message, field));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 収集したエラーがあれば 400 を返し、なければ値を返す
    pub fn finish<T>(self, value: Option<T>) -> AppResult<T> {
        if !self.errors.is_empty() {
            return Err(AppError::validation(self.errors));
        }
        value.ok_or_else(|| AppError::internal("Validation produced no value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_collects_every_failed_field() {
        let mut errors = FieldErrors::new();
        let login = errors.check("login", Err::<String, _>(AppError::bad_request("too short")));
        let email = errors.check("email", Err::<String, _>(AppError::bad_request("invalid")));
        let password = errors.check("password", Ok::<_, AppError>("secret1".to_string()));
        assert!(password.is_some());

        let err = errors.finish(login.zip(email).zip(password)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(
            err.field_errors(),
            &[FieldError::new("too short", "login"), FieldError::new("invalid", "email")]
        );
    }

    #[test]
    fn test_finish_returns_value_when_clean() {
        let mut errors = FieldErrors::new();
        let title = errors.check("title", Ok::<_, AppError>("Hello"));
        assert!(errors.is_empty());
        assert_eq!(errors.finish(title).unwrap(), "Hello");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(FieldError::new("required", "code")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "required", "field": "code" }));
    }
}
