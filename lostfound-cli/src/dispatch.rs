use lostfound_client::{ContactAction, Notice};
use tracing::warn;

/// Carries out a contact action on the local machine.
///
/// Returns the confirmation to show, if any. When no opener or clipboard is
/// available the contact details are printed instead so the user can still
/// reach the poster.
pub fn run(action: &ContactAction) -> Option<Notice> {
    match action {
        ContactAction::Email { uri } | ContactAction::Phone { uri } => {
            if let Err(e) = open::that(uri) {
                warn!(%uri, "failed to open handler: {}", e);
                println!("Open {uri} to get in touch.");
            }
            None
        }
        ContactAction::Copy { text } => {
            match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.clone())) {
                Ok(()) => action.notice(),
                Err(e) => {
                    warn!("clipboard unavailable: {}", e);
                    println!("Contact: {text}");
                    None
                }
            }
        }
    }
}
