use serde::Serialize;
use talkplan_core_types::Sensitive;

/// A speaker of one or more submissions
///
/// The e-mail address is redacted in `Debug` and serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Speaker {
    pub id: String,
    pub name: String,
    pub email: Sensitive<String>,
    pub locale: String,
}

impl Speaker {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: Sensitive::new(email.into()),
            locale: "en".to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}
