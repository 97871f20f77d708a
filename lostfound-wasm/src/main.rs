use crate::client::LostFoundClientWeb;
use chrono::Utc;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use lostfound_client::draft::check_size;
use lostfound_client::{
    empty_state, publish, CardContact, Category, ClientConfig, ContactAction, ImageFile,
    LostFoundClientTrait, NavState, Notice, NoticeQueue, MASKED_CONTACT, Post, PostCard, PostDraft, PostFilter, Selection,
    Session, Status,
};
use uuid::Uuid;

mod client;
mod error;

const SUPABASE_URL: &str = match option_env!("SUPABASE_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:54321",
};
const SUPABASE_ANON_KEY: &str = match option_env!("SUPABASE_ANON_KEY") {
    Some(key) => key,
    None => "",
};
const TOAST_MILLIS: u32 = 5_000;

const MAIN_CSS: Asset = asset!("/assets/main.css");

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Navbar)]
        #[route("/")]
        Home {},
        #[route("/auth")]
        Auth {},
}

/// Whether the "Post Item" dialog is open. Shared by the navbar and the feed.
#[derive(Clone, Copy)]
struct FormOpen(Signal<bool>);

fn main() {
    dioxus::launch(App);
}

fn web_client(session: Option<Session>) -> LostFoundClientWeb {
    LostFoundClientWeb::new(ClientConfig::new(SUPABASE_URL, SUPABASE_ANON_KEY), session)
}

fn notify(mut toasts: Signal<NoticeQueue>, notice: Notice) {
    let id = toasts.write().push(notice);
    spawn(async move {
        TimeoutFuture::new(TOAST_MILLIS).await;
        toasts.write().dismiss(id);
    });
}

/// The client may have refreshed or dropped an expired session.
fn sync_session(mut session: Signal<Option<Session>>, client: &LostFoundClientWeb) {
    if session.peek().as_ref() != client.session() {
        session.set(client.session().cloned());
    }
}

fn open_uri(uri: &str) {
    let target = serde_json::to_string(uri).unwrap_or_default();
    document::eval(&format!("window.open({target}, '_blank')"));
}

fn copy_text(text: &str) {
    let text = serde_json::to_string(text).unwrap_or_default();
    document::eval(&format!("navigator.clipboard.writeText({text})"));
}

#[component]
fn App() -> Element {
    let session = use_signal(LostFoundClientWeb::stored_session);
    let toasts = use_signal(NoticeQueue::default);
    let form_open = use_signal(|| false);

    provide_context(session);
    provide_context(toasts);
    provide_context(FormOpen(form_open));

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        document::Script { src: "https://cdn.tailwindcss.com" }
        Router::<Route> {}
        Toasts {}
    }
}

#[component]
fn Toasts() -> Element {
    let mut toasts = use_context::<Signal<NoticeQueue>>();
    let shown: Vec<(u64, Notice)> = toasts
        .read()
        .iter()
        .map(|(id, notice)| (id, notice.clone()))
        .collect();

    rsx! {
        div { class: "fixed bottom-4 right-4 z-50 flex flex-col gap-3 w-80",
            for (id, notice) in shown {
                div {
                    key: "{id}",
                    class: if notice.is_destructive() {
                        "rounded-xl shadow-lg p-4 bg-red-600 text-white"
                    } else {
                        "rounded-xl shadow-lg p-4 bg-white text-gray-900 border border-gray-200"
                    },
                    div { class: "flex justify-between items-start gap-2",
                        div {
                            p { class: "font-semibold", "{notice.title}" }
                            p { class: "text-sm opacity-90", "{notice.description}" }
                        }
                        button {
                            class: "text-sm opacity-70 hover:opacity-100",
                            onclick: move |_| toasts.write().dismiss(id),
                            "✕"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Navbar() -> Element {
    let mut session = use_context::<Signal<Option<Session>>>();
    let FormOpen(mut form_open) = use_context::<FormOpen>();
    let navigator = use_navigator();

    let nav = NavState::from_session(session.read().as_ref());

    let on_sign_out = move |_| async move {
        let mut client = web_client(session.read().clone());
        let _ = client.sign_out().await;
        session.set(None);
        navigator.push(Route::Home {});
    };

    rsx! {
        nav { class: "bg-white/80 backdrop-blur-md border-b border-gray-200 sticky top-0 z-40 shadow-sm",
            div { class: "max-w-7xl mx-auto px-6 py-4 flex justify-between items-center",
                Link { to: Route::Home {}, class: "text-2xl font-bold text-indigo-600 hover:text-indigo-700 transition", "Lost & Found" }

                div { class: "flex items-center space-x-4",
                    match nav {
                        NavState::SignedIn { email } => rsx! {
                            span { class: "hidden md:inline text-sm text-gray-600", "{email}" }
                            button {
                                onclick: move |_| {
                                    navigator.push(Route::Home {});
                                    form_open.set(true);
                                },
                                class: "px-5 py-2.5 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md",
                                "Post Item"
                            }
                            button {
                                onclick: on_sign_out,
                                class: "px-5 py-2.5 border border-gray-300 text-gray-700 rounded-xl hover:bg-gray-50 transition",
                                "Sign Out"
                            }
                        },
                        NavState::SignedOut => rsx! {
                            Link {
                                to: Route::Auth {},
                                class: "px-5 py-2.5 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md",
                                "Sign In"
                            }
                        },
                    }
                }
            }
        }
        Outlet::<Route> {}
    }
}

#[component]
fn Home() -> Element {
    let session = use_context::<Signal<Option<Session>>>();
    let toasts = use_context::<Signal<NoticeQueue>>();
    let FormOpen(mut form_open) = use_context::<FormOpen>();

    let mut posts = use_signal(Vec::<Post>::new);
    let mut loading = use_signal(|| true);
    let mut reload = use_signal(|| 0u32);
    let mut filter = use_signal(PostFilter::default);

    // Лента перечитывается при смене сессии и после публикации
    let _feed = use_resource(move || async move {
        let _ = reload();
        let mut client = web_client(session.read().clone());
        match client.list_posts().await {
            Ok(rows) => posts.set(rows),
            Err(e) => {
                tracing::error!("error fetching posts: {}", e);
                notify(toasts, Notice::load_failed());
            }
        }
        sync_session(session, &client);
        loading.set(false);
    });

    let on_contact = move |id: Uuid| {
        let viewer = session.read().as_ref().map(|s| s.user_id());
        let Some(post) = posts.read().iter().find(|p| p.id == id).cloned() else {
            return;
        };
        match PostCard::new(&post, viewer, Utc::now()).contact {
            CardContact::Reveal(info) => {
                let action = ContactAction::classify(&info);
                match &action {
                    ContactAction::Copy { text } => copy_text(text),
                    other => {
                        if let Some(uri) = other.uri() {
                            open_uri(uri);
                        }
                    }
                }
                if let Some(notice) = action.notice() {
                    notify(toasts, notice);
                }
            }
            CardContact::SignInPrompt => notify(toasts, Notice::sign_in_required()),
            CardContact::Hidden => {}
        }
    };

    let on_delete = move |id: Uuid| async move {
        let mut client = web_client(session.read().clone());
        let result = client.delete_post(id).await;
        sync_session(session, &client);
        match result {
            Ok(()) => {
                posts.write().retain(|p| p.id != id);
                notify(toasts, Notice::deleted());
            }
            Err(e) => {
                tracing::error!(post_id = %id, "failed to delete post: {}", e);
                notify(toasts, Notice::for_delete_error(&e));
            }
        }
    };

    let signed_in = session.read().is_some();
    let viewer = session.read().as_ref().map(|s| s.user_id());
    let now = Utc::now();
    let cards: Vec<PostCard> = filter
        .read()
        .apply(posts.read().iter())
        .into_iter()
        .map(|post| PostCard::new(post, viewer, now))
        .collect();
    let empty = empty_state(posts.read().len(), cards.len(), signed_in);

    rsx! {
        div { class: "max-w-7xl mx-auto px-6 py-12",
            div { class: "text-center mb-10",
                h1 { class: "text-4xl font-bold text-gray-900 mb-3", "Lost & Found Community Board" }
                p { class: "text-gray-600 text-lg", "Help reunite lost items with their owners." }
                if !signed_in {
                    Link {
                        to: Route::Auth {},
                        class: "inline-block mt-6 px-8 py-3 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md",
                        "Sign In to Post Items"
                    }
                }
            }

            SearchFilters {
                filter: filter.read().clone(),
                on_search: move |term: String| filter.write().set_search(term),
                on_category: move |c: Selection<Category>| filter.write().set_category(c),
                on_status: move |s: Selection<Status>| filter.write().set_status(s),
                on_clear: move |_| filter.write().clear(),
            }

            if loading() {
                div { class: "flex justify-center items-center py-24",
                    div { class: "animate-spin rounded-full h-16 w-16 border-4 border-indigo-600 border-t-transparent" }
                }
            } else if let Some(empty) = empty {
                div { class: "text-center py-24",
                    h2 { class: "text-2xl font-semibold text-gray-900 mb-2", "{empty.title}" }
                    p { class: "text-gray-500 mb-6", "{empty.message}" }
                    if empty.offer_first_post {
                        button {
                            onclick: move |_| form_open.set(true),
                            class: "px-8 py-3 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md",
                            "Post First Item"
                        }
                    }
                }
            } else {
                div { class: "grid gap-8 md:grid-cols-2 lg:grid-cols-3",
                    for card in cards {
                        PostCardView {
                            key: "{card.id}",
                            card: card.clone(),
                            on_contact: on_contact,
                            on_delete: on_delete,
                        }
                    }
                }
            }

            if form_open() {
                PostForm {
                    on_success: move |_| {
                        form_open.set(false);
                        reload += 1;
                    },
                    on_cancel: move |_| form_open.set(false),
                }
            }
        }
    }
}

#[component]
fn SearchFilters(
    filter: PostFilter,
    on_search: EventHandler<String>,
    on_category: EventHandler<Selection<Category>>,
    on_status: EventHandler<Selection<Status>>,
    on_clear: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "bg-white rounded-2xl shadow-md p-6 mb-10 flex flex-col md:flex-row gap-4 items-stretch md:items-center",
            input {
                r#type: "text",
                placeholder: "Search by title or description...",
                value: "{filter.search}",
                oninput: move |evt| on_search.call(evt.value()),
                class: "flex-1 px-5 py-3 border border-gray-300 rounded-xl shadow-sm focus:outline-none focus:ring-2 focus:ring-indigo-500 text-black"
            }
            select {
                value: "{filter.category}",
                onchange: move |evt| {
                    if let Ok(category) = evt.value().parse() {
                        on_category.call(category);
                    }
                },
                class: "px-4 py-3 border border-gray-300 rounded-xl text-black",
                option { value: "all", "All Items" }
                option { value: "lost", "Lost" }
                option { value: "found", "Found" }
            }
            select {
                value: "{filter.status}",
                onchange: move |evt| {
                    if let Ok(status) = evt.value().parse() {
                        on_status.call(status);
                    }
                },
                class: "px-4 py-3 border border-gray-300 rounded-xl text-black",
                option { value: "all", "All Status" }
                option { value: "active", "Active" }
                option { value: "resolved", "Resolved" }
                option { value: "closed", "Closed" }
            }
            if filter.is_active() {
                button {
                    onclick: move |_| on_clear.call(()),
                    class: "px-5 py-3 border border-gray-300 text-gray-700 rounded-xl hover:bg-gray-50 transition",
                    "Clear Filters"
                }
            }
        }
    }
}

#[component]
fn PostCardView(card: PostCard, on_contact: EventHandler<Uuid>, on_delete: EventHandler<Uuid>) -> Element {
    let id = card.id;
    let badge = if card.is_lost {
        "px-3 py-1 text-xs font-bold rounded-full bg-red-100 text-red-700"
    } else {
        "px-3 py-1 text-xs font-bold rounded-full bg-green-100 text-green-700"
    };

    rsx! {
        article { class: "bg-white rounded-2xl shadow-lg hover:shadow-2xl transition overflow-hidden flex flex-col",
            if let Some(src) = &card.image_url {
                img { src: "{src}", alt: "{card.title}", class: "w-full h-48 object-cover" }
            }
            div { class: "p-6 flex flex-col flex-1",
                div { class: "flex items-center gap-2 mb-3",
                    span { class: badge, "{card.category_badge}" }
                    if let Some(status) = &card.status_badge {
                        span { class: "px-3 py-1 text-xs font-bold rounded-full bg-gray-200 text-gray-700", "{status}" }
                    }
                }
                h2 { class: "text-xl font-bold text-gray-900 mb-2 line-clamp-2", "{card.title}" }
                p { class: "text-gray-600 line-clamp-3 mb-4", "{card.description}" }

                div { class: "text-sm text-gray-500 space-y-1 mb-4",
                    if let Some(poster) = &card.poster {
                        p { "By {poster}" }
                    }
                    if let Some(location) = &card.location {
                        p { "📍 {location}" }
                    }
                    p { "{card.posted}" }
                    if let Some(on) = &card.lost_found_on {
                        p { "{on}" }
                    }
                }

                div { class: "mt-auto flex gap-3",
                    match &card.contact {
                        CardContact::Reveal(_) => rsx! {
                            button {
                                onclick: move |_| on_contact.call(id),
                                class: "flex-1 px-4 py-2.5 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md",
                                "Contact Owner"
                            }
                        },
                        CardContact::SignInPrompt => rsx! {
                            Link {
                                to: Route::Auth {},
                                class: "flex-1 text-center px-4 py-2.5 border border-indigo-600 text-indigo-600 rounded-xl hover:bg-indigo-50 transition",
                                "{MASKED_CONTACT}"
                            }
                        },
                        CardContact::Hidden => rsx! {},
                    }
                    if card.can_delete {
                        button {
                            onclick: move |_| on_delete.call(id),
                            class: "px-4 py-2.5 bg-red-600 text-white rounded-xl hover:bg-red-700 transition shadow-md",
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn PostForm(on_success: EventHandler<()>, on_cancel: EventHandler<()>) -> Element {
    let session = use_context::<Signal<Option<Session>>>();
    let toasts = use_context::<Signal<NoticeQueue>>();

    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut category = use_signal(|| None::<Category>);
    let mut location = use_signal(String::new);
    let mut contact_info = use_signal(String::new);
    let mut date_lost_found = use_signal(String::new);
    let mut image = use_signal(|| None::<ImageFile>);
    let mut submitting = use_signal(|| false);

    let on_image = move |evt: FormEvent| async move {
        let Some(file) = evt.files().into_iter().next() else {
            return;
        };
        if check_size(file.size()).is_err() {
            notify(toasts, Notice::file_too_large());
            return;
        }
        match file.read_bytes().await {
            Ok(bytes) => match ImageFile::new(file.name(), bytes.to_vec()) {
                Ok(picked) => image.set(Some(picked)),
                Err(_) => notify(toasts, Notice::file_too_large()),
            },
            Err(e) => {
                tracing::error!("failed to read image: {}", e);
                notify(toasts, Notice::unexpected());
            }
        }
    };

    let on_submit = move |evt: FormEvent| async move {
        evt.prevent_default();
        let draft = PostDraft {
            title: title.read().clone(),
            description: description.read().clone(),
            category: *category.read(),
            location: location.read().clone(),
            contact_info: contact_info.read().clone(),
            date_lost_found: date_lost_found.read().clone(),
        };
        let picked = image.read().clone();
        let mut client = web_client(session.read().clone());

        submitting.set(true);
        let result = publish(&mut client, draft, picked.as_ref(), Utc::now().timestamp_millis()).await;
        sync_session(session, &client);
        submitting.set(false);

        match result {
            Ok(notice) => {
                notify(toasts, notice);
                on_success.call(());
            }
            Err(notice) => notify(toasts, notice),
        }
    };

    let field = "w-full px-5 py-3 border border-gray-300 rounded-xl shadow-sm focus:outline-none focus:ring-2 focus:ring-indigo-500 focus:border-indigo-500 transition text-black";

    rsx! {
        div { class: "fixed inset-0 z-40 bg-black/50 flex items-center justify-center px-4",
            div { class: "w-full max-w-2xl max-h-[90vh] overflow-y-auto bg-white rounded-2xl shadow-xl p-8",
                h1 { class: "text-3xl font-bold text-gray-900 mb-6 text-center", "Post an Item" }

                form { onsubmit: on_submit, class: "space-y-5",
                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Title *" }
                        input {
                            r#type: "text",
                            placeholder: "e.g. Black leather wallet",
                            value: "{title}",
                            oninput: move |evt| title.set(evt.value()),
                            class: field,
                        }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Category *" }
                        select {
                            onchange: move |evt| category.set(evt.value().parse().ok()),
                            class: field,
                            option { value: "", "Select category" }
                            option { value: "lost", "Lost" }
                            option { value: "found", "Found" }
                        }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Description *" }
                        textarea {
                            placeholder: "Describe the item...",
                            value: "{description}",
                            oninput: move |evt| description.set(evt.value()),
                            class: "{field} h-32 resize-none",
                        }
                    }

                    div { class: "grid md:grid-cols-2 gap-5",
                        div {
                            label { class: "block text-sm font-medium text-gray-700 mb-2", "Location" }
                            input {
                                r#type: "text",
                                placeholder: "Where was it lost or found?",
                                value: "{location}",
                                oninput: move |evt| location.set(evt.value()),
                                class: field,
                            }
                        }
                        div {
                            label { class: "block text-sm font-medium text-gray-700 mb-2", "Date" }
                            input {
                                r#type: "date",
                                value: "{date_lost_found}",
                                oninput: move |evt| date_lost_found.set(evt.value()),
                                class: field,
                            }
                        }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Contact information *" }
                        input {
                            r#type: "text",
                            placeholder: "Email or phone number",
                            value: "{contact_info}",
                            oninput: move |evt| contact_info.set(evt.value()),
                            class: field,
                        }
                    }

                    div {
                        label { class: "block text-sm font-medium text-gray-700 mb-2", "Image (max 10MB)" }
                        match image.read().as_ref() {
                            Some(picked) => rsx! {
                                div { class: "flex items-center justify-between px-5 py-3 border border-gray-300 rounded-xl",
                                    span { class: "text-gray-700 truncate", "{picked.name}" }
                                    button {
                                        r#type: "button",
                                        onclick: move |_| image.set(None),
                                        class: "text-red-600 hover:text-red-800",
                                        "Remove"
                                    }
                                }
                            },
                            None => rsx! {
                                input {
                                    r#type: "file",
                                    accept: "image/*",
                                    onchange: on_image,
                                    class: field,
                                }
                            },
                        }
                    }

                    div { class: "flex justify-end gap-4 pt-4",
                        button {
                            r#type: "button",
                            onclick: move |_| on_cancel.call(()),
                            class: "px-8 py-3 border border-gray-300 text-gray-700 rounded-xl hover:bg-gray-50 transition font-medium",
                            "Cancel"
                        }
                        button {
                            r#type: "submit",
                            disabled: submitting(),
                            class: "px-10 py-3 bg-indigo-600 text-white rounded-xl hover:bg-indigo-700 transition shadow-md font-medium disabled:opacity-50 disabled:cursor-not-allowed",
                            if submitting() { "Posting..." } else { "Post Item" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Auth() -> Element {
    let mut session = use_context::<Signal<Option<Session>>>();
    let toasts = use_context::<Signal<NoticeQueue>>();
    let navigator = use_navigator();

    let mut signing_up = use_signal(|| false);
    let mut full_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut pending = use_signal(|| false);

    let on_submit = move |evt: FormEvent| async move {
        evt.prevent_default();
        let address = email.read().clone();
        let secret = password.read().clone();
        let name = Some(full_name.read().trim().to_string()).filter(|n| !n.is_empty());
        let mut client = web_client(None);
        pending.set(true);

        let result = if signing_up() {
            client.sign_up(address, secret, name).await
        } else {
            client.sign_in(address, secret).await.map(Some)
        };
        pending.set(false);

        match result {
            Ok(Some(signed_in)) => {
                session.set(Some(signed_in));
                navigator.push(Route::Home {});
            }
            Ok(None) => notify(
                toasts,
                Notice::info("Check your email", "Confirm your address to finish signing up."),
            ),
            Err(e) => notify(toasts, Notice::destructive("Authentication failed", e.user_message())),
        }
    };

    let field = "w-full px-5 py-4 text-lg border border-gray-300 rounded-xl shadow-sm focus:outline-none focus:ring-2 focus:ring-indigo-500 focus:border-indigo-500 transition placeholder-gray-500 text-black";

    rsx! {
        div { class: "min-h-screen flex items-center justify-center bg-gray-50 px-4",
            div { class: "w-full max-w-md bg-white rounded-2xl shadow-xl p-8 md:p-10",
                h1 { class: "text-3xl font-bold text-center text-gray-900 mb-8",
                    if signing_up() { "Create Account" } else { "Sign In" }
                }

                form { onsubmit: on_submit, class: "space-y-6",
                    if signing_up() {
                        input {
                            class: field,
                            r#type: "text",
                            placeholder: "Full name",
                            value: "{full_name}",
                            oninput: move |evt| full_name.set(evt.value()),
                        }
                    }
                    input {
                        class: field,
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                        required: true,
                    }
                    input {
                        class: field,
                        r#type: "password",
                        placeholder: "Password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                        minlength: 6,
                        required: true,
                    }

                    button {
                        class: "w-full py-4 bg-indigo-600 hover:bg-indigo-700 text-white font-semibold rounded-xl shadow-md transition disabled:opacity-50 disabled:cursor-not-allowed",
                        r#type: "submit",
                        disabled: pending() || email.read().trim().is_empty() || password.read().len() < 6,
                        if signing_up() { "Sign Up" } else { "Sign In" }
                    }

                    div { class: "text-center mt-6",
                        button {
                            r#type: "button",
                            onclick: move |_| signing_up.toggle(),
                            class: "text-indigo-600 hover:text-indigo-800 font-medium transition",
                            if signing_up() { "Already have an account? Sign in" } else { "Don't have an account? Sign up" }
                        }
                    }
                }
            }
        }
    }
}
