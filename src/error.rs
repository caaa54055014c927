//! Top-level error taxonomy for the gallery binary.

use crate::config::ConfigError;
use crate::display::{DisplayError, SurfaceError};
use crate::state::StateError;

/// Convenience result type used by the gallery layer.
pub type GalleryResult<T> = Result<T, GalleryError>;

#[derive(thiserror::Error, Debug)]
pub enum GalleryError {
    /// Framebuffer access or allocation failed.
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Invalid state machine wiring or event.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Unreadable or invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Playlist names an effect that is not registered.
    #[error("unknown effect '{0}'")]
    UnknownEffect(String),

    /// Window, renderer or texture failure reported by SDL.
    #[error("display error: {0}")]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateEvent;

    #[test]
    fn test_display_prefixes_are_stable() {
        let surface: GalleryError = SurfaceError::Misaligned { cursor: 3 }.into();
        assert!(surface.to_string().starts_with("surface error:"));

        let state: GalleryError = StateError::RunningTransition.into();
        assert!(state.to_string().starts_with("state error:"));

        let display: GalleryError = DisplayError::Init("no video device".into()).into();
        assert_eq!(
            display.to_string(),
            "display error: SDL init failed: no video device"
        );
        assert_eq!(
            GalleryError::UnknownEffect("nope".into()).to_string(),
            "unknown effect 'nope'"
        );
    }

    #[test]
    fn test_missing_transition_message_names_event() {
        let err: GalleryError = StateError::MissingTransition {
            event: StateEvent::Pause,
            from: "plasma#0".into(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("PAUSE"));
        assert!(msg.contains("plasma#0"));
    }

    #[test]
    fn test_io_is_transparent() {
        let err: GalleryError = std::io::Error::other("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
