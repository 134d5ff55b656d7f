//! Typed side-attachments carried by a topic.

use super::uri::MmUri;
use std::fmt;

/// Kind of an [`Extra`]. The declaration order is the emission order every exporter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtraType {
    File,
    Link,
    TopicJump,
    Note,
}

impl ExtraType {
    pub const ALL: [ExtraType; 4] = [
        ExtraType::File,
        ExtraType::Link,
        ExtraType::TopicJump,
        ExtraType::Note,
    ];

    /// Keyword used by the native document format.
    pub fn keyword(self) -> &'static str {
        match self {
            ExtraType::File => "FILE",
            ExtraType::Link => "LINK",
            ExtraType::TopicJump => "TOPIC",
            ExtraType::Note => "NOTE",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim() {
            "FILE" => Some(ExtraType::File),
            "LINK" => Some(ExtraType::Link),
            "TOPIC" => Some(ExtraType::TopicJump),
            "NOTE" => Some(ExtraType::Note),
            _ => None,
        }
    }
}

impl fmt::Display for ExtraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Free text note. Encrypted notes hold cipher text and are never exported as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Note {
    pub text: String,
    pub encrypted: bool,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            encrypted: false,
            hint: None,
        }
    }

    pub fn encrypted(cipher: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            text: cipher.into(),
            encrypted: true,
            hint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extra {
    Note(Note),
    Link(MmUri),
    File(MmUri),
    /// Reference by UID to another topic of the same map.
    TopicJump(String),
}

impl Extra {
    pub fn note(text: impl Into<String>) -> Self {
        Extra::Note(Note::new(text))
    }

    pub fn link(uri: &str) -> Self {
        Extra::Link(MmUri::parse(uri))
    }

    pub fn file(uri: &str) -> Self {
        Extra::File(MmUri::parse(uri))
    }

    pub fn jump(uid: impl Into<String>) -> Self {
        Extra::TopicJump(uid.into())
    }

    pub fn extra_type(&self) -> ExtraType {
        match self {
            Extra::Note(_) => ExtraType::Note,
            Extra::Link(_) => ExtraType::Link,
            Extra::File(_) => ExtraType::File,
            Extra::TopicJump(_) => ExtraType::TopicJump,
        }
    }

    /// Whether the referenced location is absolute. Notes and jumps are never absolute.
    pub fn is_absolute(&self) -> bool {
        match self {
            Extra::Link(uri) | Extra::File(uri) => uri.is_absolute(),
            _ => false,
        }
    }

    /// Payload as a single string, the way the native format stores it.
    pub fn value_string(&self) -> String {
        match self {
            Extra::Note(note) => note.text.clone(),
            Extra::Link(uri) | Extra::File(uri) => uri.as_string(false, true),
            Extra::TopicJump(uid) => uid.clone(),
        }
    }

    pub fn from_value(kind: ExtraType, value: &str) -> Self {
        match kind {
            ExtraType::File => Extra::file(value),
            ExtraType::Link => Extra::link(value),
            ExtraType::TopicJump => Extra::jump(value.trim()),
            ExtraType::Note => Extra::note(value),
        }
    }
}
