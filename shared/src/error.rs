use aws_sdk_cognitoidentityprovider::error::ProvideErrorMetadata;
use lambda_http::http::StatusCode;

/// Closed set of failure kinds the identity backend can report.
///
/// Cognito signals these as modeled exception types on each operation; the
/// SDK exposes the exception name through `ProvideErrorMetadata::code()`, so
/// every operation error funnels through [`IdentityError::classify`] and the
/// handlers match one enum instead of per-operation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    NotAuthorized,
    UserNotConfirmed,
    UserNotFound,
    UsernameExists,
    CodeMismatch,
    ExpiredCode,
    TooManyRequests,
    LimitExceeded,
    InvalidParameter,
    InvalidPassword,
    ResourceNotFound,
    InternalError,
    Unknown(String),
}

impl IdentityError {
    pub fn classify<E: ProvideErrorMetadata>(err: &E) -> Self {
        match err.code() {
            Some("NotAuthorizedException") => Self::NotAuthorized,
            Some("UserNotConfirmedException") => Self::UserNotConfirmed,
            Some("UserNotFoundException") => Self::UserNotFound,
            Some("UsernameExistsException") => Self::UsernameExists,
            Some("CodeMismatchException") => Self::CodeMismatch,
            Some("ExpiredCodeException") => Self::ExpiredCode,
            Some("TooManyRequestsException") => Self::TooManyRequests,
            Some("LimitExceededException") => Self::LimitExceeded,
            Some("InvalidParameterException") => Self::InvalidParameter,
            Some("InvalidPasswordException") => Self::InvalidPassword,
            Some("ResourceNotFoundException") => Self::ResourceNotFound,
            Some("InternalErrorException") => Self::InternalError,
            _ => Self::Unknown(
                err.message()
                    .unwrap_or("An unexpected error occurred")
                    .to_string(),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotAuthorized => StatusCode::UNAUTHORIZED,
            Self::UserNotConfirmed => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::UsernameExists => StatusCode::CONFLICT,
            Self::CodeMismatch | Self::InvalidParameter | Self::InvalidPassword => {
                StatusCode::BAD_REQUEST
            }
            Self::ExpiredCode => StatusCode::GONE,
            Self::TooManyRequests | Self::LimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError | Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code string, mirroring the backend exception name.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "NotAuthorizedException",
            Self::UserNotConfirmed => "UserNotConfirmedException",
            Self::UserNotFound => "UserNotFoundException",
            Self::UsernameExists => "UsernameExistsException",
            Self::CodeMismatch => "CodeMismatchException",
            Self::ExpiredCode => "ExpiredCodeException",
            Self::TooManyRequests => "TooManyRequestsException",
            Self::LimitExceeded => "LimitExceededException",
            Self::InvalidParameter => "InvalidParameterException",
            Self::InvalidPassword => "InvalidPasswordException",
            Self::ResourceNotFound => "ResourceNotFoundException",
            Self::InternalError => "InternalErrorException",
            Self::Unknown(_) => "UnknownError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotAuthorized => "Not authorized to perform this operation",
            Self::UserNotConfirmed => "User not confirmed",
            Self::UserNotFound => "User does not exist",
            Self::UsernameExists => "A user with this username already exists",
            Self::CodeMismatch => "Invalid verification code",
            Self::ExpiredCode => "Verification code has expired. Please request a new one.",
            Self::TooManyRequests | Self::LimitExceeded => {
                "Too many requests, please try again later"
            }
            Self::InvalidParameter => "Invalid parameter provided",
            Self::InvalidPassword => "Password does not satisfy the password policy",
            Self::ResourceNotFound => "User pool or user does not exist",
            Self::InternalError => "An internal error occurred",
            Self::Unknown(text) => text,
        }
    }
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Failure kinds for the data gateway dispatcher.
#[derive(Debug)]
pub enum DataError {
    MissingAction,
    MissingData,
    UnknownAction(String),
    MissingField(&'static str),
    InvalidField(&'static str),
    NotFound(&'static str),
    /// Failure inside the assignment read-check-write sequence, after rollback.
    Assignment(String),
    Db(sqlx::Error),
}

impl DataError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingAction
            | Self::MissingData
            | Self::UnknownAction(_)
            | Self::MissingField(_)
            | Self::InvalidField(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Assignment(_) | Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingAction => "Missing required parameter 'action'".to_string(),
            Self::MissingData => "Missing required parameter 'data'".to_string(),
            Self::UnknownAction(name) => format!("Invalid action: '{name}'"),
            Self::MissingField(field) => format!("Missing required field '{field}'"),
            Self::InvalidField(field) => format!("Invalid value for field '{field}'"),
            Self::NotFound(message) => (*message).to_string(),
            Self::Assignment(message) => message.clone(),
            Self::Db(err) => err.to_string(),
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err)
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_error_status_table() {
        assert_eq!(IdentityError::NotAuthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(IdentityError::UserNotConfirmed.status(), StatusCode::FORBIDDEN);
        assert_eq!(IdentityError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(IdentityError::UsernameExists.status(), StatusCode::CONFLICT);
        assert_eq!(IdentityError::CodeMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(IdentityError::ExpiredCode.status(), StatusCode::GONE);
        assert_eq!(
            IdentityError::LimitExceeded.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            IdentityError::Unknown("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_error_keeps_backend_text() {
        let err = IdentityError::Unknown("connection reset".to_string());
        assert_eq!(err.code(), "UnknownError");
        assert_eq!(err.message(), "connection reset");
    }

    #[test]
    fn data_error_messages() {
        assert_eq!(
            DataError::MissingField("username").message(),
            "Missing required field 'username'"
        );
        assert_eq!(
            DataError::UnknownAction("drop_tables".to_string()).message(),
            "Invalid action: 'drop_tables'"
        );
        assert_eq!(
            DataError::UnknownAction("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DataError::NotFound("User not found").status(),
            StatusCode::NOT_FOUND
        );
    }
}
