use serde::Deserialize;

/// Body of `POST /faqs` and `PUT /faqs/{id}`. Both fields are optional here
/// so a missing field is reported as a 400 rather than a rejection.
#[derive(Debug, Deserialize)]
pub struct FaqRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl FaqRequest {
    pub fn fields(&self) -> Option<(&str, &str)> {
        Some((self.question.as_deref()?, self.answer.as_deref()?))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub lang: Option<String>,
}
