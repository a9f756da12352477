use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid tire `{id}`: {reason}")]
    InvalidTire { id: String, reason: String },
    #[error("malformed race `{slug}`: {reason}")]
    MalformedRace { slug: String, reason: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("input failure: {0}")]
    Input(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad input: {message}")]
    BadInput { message: String, race_slug: String },
    #[error("input unavailable: {message}")]
    Unavailable { message: String, race_slug: String },
    #[error("internal error: {message}")]
    Internal { message: String, race_slug: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadInput { .. } => "The race data could not be interpreted. Check the race file.",
            Self::Unavailable { .. } => {
                "The race data could not be read. Check that the file exists and is valid JSON."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn race_slug(&self) -> &str {
        match self {
            Self::BadInput { race_slug, .. }
            | Self::Unavailable { race_slug, .. }
            | Self::Internal { race_slug, .. } => race_slug,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, race_slug: impl Into<String>) -> InterfaceError {
        let race_slug = race_slug.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadInput { race_slug: slug, .. }
            | InterfaceError::Unavailable { race_slug: slug, .. }
            | InterfaceError::Internal { race_slug: slug, .. } => *slug = race_slug,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => {
                Self::BadInput { message: error.to_string(), race_slug: "unassigned".to_owned() }
            }
            ApplicationError::Input(message) => {
                Self::Unavailable { message, race_slug: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, race_slug: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn malformed_race_maps_to_bad_input_with_slug() {
        let interface = ApplicationError::from(DomainError::MalformedRace {
            slug: "unbound-200".to_owned(),
            reason: "race document root must be a JSON object".to_owned(),
        })
        .into_interface("unbound-200");

        assert!(matches!(
            interface,
            InterfaceError::BadInput { ref race_slug, ref message }
                if race_slug == "unbound-200" && message.contains("JSON object")
        ));
    }

    #[test]
    fn bad_input_has_user_safe_message() {
        let interface =
            ApplicationError::from(DomainError::InvariantViolation("empty catalog".to_owned()))
                .into_interface("mid-south");

        assert_eq!(
            interface.user_message(),
            "The race data could not be interpreted. Check the race file."
        );
        assert_eq!(interface.race_slug(), "mid-south");
    }

    #[test]
    fn input_error_maps_to_unavailable() {
        let interface =
            ApplicationError::Input("race file not found".to_owned()).into_interface("bwr");

        assert!(matches!(interface, InterfaceError::Unavailable { .. }));
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("bad scoring table".to_owned()).into_interface("sbt");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
