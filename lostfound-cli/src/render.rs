use lostfound_client::{CardContact, EmptyState, NavState, Notice, NoticeKind, PostCard, PostFilter};
use std::fmt::Write;

pub fn card(card: &PostCard) -> String {
    let mut out = String::new();

    let _ = write!(out, "[{}]", card.category_badge);
    if let Some(status) = &card.status_badge {
        let _ = write!(out, " [{status}]");
    }
    let _ = writeln!(out, " {}", card.title);
    let _ = writeln!(out, "  id: {}", card.id);
    let _ = writeln!(out, "  {}", card.description);

    if let Some(poster) = &card.poster {
        let _ = writeln!(out, "  by {poster}");
    }
    if let Some(location) = &card.location {
        let _ = writeln!(out, "  at {location}");
    }
    let _ = writeln!(out, "  {}", card.posted);
    if let Some(on) = &card.lost_found_on {
        let _ = writeln!(out, "  {on}");
    }
    if let Some(url) = &card.image_url {
        let _ = writeln!(out, "  image: {url}");
    }

    match &card.contact {
        CardContact::Reveal(info) => {
            let _ = writeln!(out, "  contact: {info}");
        }
        CardContact::SignInPrompt => {
            let _ = writeln!(out, "  Sign in to view contact information");
        }
        CardContact::Hidden => {}
    }
    if card.can_delete {
        let _ = writeln!(out, "  (your post: `lostfound delete {}` removes it)", card.id);
    }

    out
}

pub fn notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Info => format!("{} {}", notice.title, notice.description),
        NoticeKind::Destructive => format!("error: {} {}", notice.title, notice.description),
    }
}

pub fn empty(state: &EmptyState) -> String {
    let mut out = format!("{}\n{}", state.title, state.message);
    if state.offer_first_post {
        out.push_str("\nPost the first item with `lostfound post`.");
    }
    out
}

pub fn nav(state: &NavState) -> String {
    match state {
        NavState::SignedIn { email } => format!("Signed in as {email}"),
        NavState::SignedOut => "Not signed in. Run `lostfound sign-in` to post items.".to_string(),
    }
}

pub fn filter_summary(filter: &PostFilter, shown: usize, total: usize) -> String {
    let mut out = format!("Showing {shown} of {total} posts");
    if filter.is_active() {
        let _ = write!(
            out,
            " (search: {:?}, category: {}, status: {})",
            filter.search, filter.category, filter.status
        );
    }
    out
}
