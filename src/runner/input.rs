use crate::graph::MediaKind;

/// An event that resumes a suspended run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunInput {
    /// The contact answered.
    Reply {
        text: String,
        attachment: Option<Attachment>,
    },
    /// The contact stayed silent until an external inactivity timer fired.
    Timeout,
}

impl RunInput {
    pub fn reply(text: impl Into<String>) -> Self {
        RunInput::Reply {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn reply_with_attachment(text: impl Into<String>, attachment: Attachment) -> Self {
        RunInput::Reply {
            text: text.into(),
            attachment: Some(attachment),
        }
    }
}

/// Metadata of a file the contact sent along with a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub kind: MediaKind,
    /// URL or transport-specific id of the stored file.
    pub reference: String,
    pub mime_type: Option<String>,
}
