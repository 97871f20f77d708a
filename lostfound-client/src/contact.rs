use crate::notice::Notice;

/// What the "Contact Owner" action does with a piece of contact info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactAction {
    /// Open the mail client on a `mailto:` link.
    Email { uri: String },
    /// Open the dialer on a `tel:` link.
    Phone { uri: String },
    /// Copy the raw text to the clipboard.
    Copy { text: String },
}

impl ContactAction {
    /// Heuristic dispatch on the shape of the contact string: anything with an
    /// `@` is mail, a non-empty run of ASCII digits is a phone number, and the
    /// rest is copied verbatim.
    pub fn classify(contact_info: &str) -> Self {
        if contact_info.contains('@') {
            ContactAction::Email {
                uri: format!("mailto:{contact_info}"),
            }
        } else if !contact_info.is_empty() && contact_info.bytes().all(|b| b.is_ascii_digit()) {
            ContactAction::Phone {
                uri: format!("tel:{contact_info}"),
            }
        } else {
            ContactAction::Copy {
                text: contact_info.to_string(),
            }
        }
    }

    /// Link to hand to the platform opener, if any.
    pub fn uri(&self) -> Option<&str> {
        match self {
            ContactAction::Email { uri } | ContactAction::Phone { uri } => Some(uri.as_str()),
            ContactAction::Copy { .. } => None,
        }
    }

    /// Confirmation shown after a successful action.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            ContactAction::Copy { .. } => Some(Notice::contact_copied()),
            _ => None,
        }
    }
}
