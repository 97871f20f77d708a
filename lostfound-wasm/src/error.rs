use lostfound_client::LostFoundError;

/// Browser fetch failures never reach the backend, so they are transport errors.
pub fn transport(e: gloo_net::Error) -> LostFoundError {
    LostFoundError::Transport(e.to_string())
}
