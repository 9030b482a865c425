use std::fmt;

use thiserror::Error;

use crate::egl::{ffi, EGL_FUNCTIONS};
use crate::ClientApi;

/// Error code reported by `eglGetError` after a failed native call.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EglErrorCode(pub u32);

impl EglErrorCode {
    /// Reads the error of the most recent EGL call on this thread.
    pub(crate) fn last() -> Self {
        let egl = &EGL_FUNCTIONS.0;
        EglErrorCode(unsafe { egl.GetError() } as u32)
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            ffi::SUCCESS => "EGL_SUCCESS",
            ffi::NOT_INITIALIZED => "EGL_NOT_INITIALIZED",
            ffi::BAD_ACCESS => "EGL_BAD_ACCESS",
            ffi::BAD_ALLOC => "EGL_BAD_ALLOC",
            ffi::BAD_ATTRIBUTE => "EGL_BAD_ATTRIBUTE",
            ffi::BAD_CONFIG => "EGL_BAD_CONFIG",
            ffi::BAD_CONTEXT => "EGL_BAD_CONTEXT",
            ffi::BAD_CURRENT_SURFACE => "EGL_BAD_CURRENT_SURFACE",
            ffi::BAD_DISPLAY => "EGL_BAD_DISPLAY",
            ffi::BAD_MATCH => "EGL_BAD_MATCH",
            ffi::BAD_NATIVE_PIXMAP => "EGL_BAD_NATIVE_PIXMAP",
            ffi::BAD_NATIVE_WINDOW => "EGL_BAD_NATIVE_WINDOW",
            ffi::BAD_PARAMETER => "EGL_BAD_PARAMETER",
            ffi::BAD_SURFACE => "EGL_BAD_SURFACE",
            ffi::CONTEXT_LOST => "EGL_CONTEXT_LOST",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for EglErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown EGL error {:#06x}", self.0),
        }
    }
}

impl fmt::Debug for EglErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no EGL display available")]
    DisplayUnavailable,
    #[error("eglInitialize failed: {0}")]
    InitializeFailed(EglErrorCode),
    #[error("no EGL config matches the requested attributes")]
    NoSuitableConfig,
    #[error("window handle is not usable as an EGL native window")]
    IncompatibleWindowHandle,
    #[error("eglCreateWindowSurface failed: {0}")]
    SurfaceCreation(EglErrorCode),
    #[error("eglBindAPI({0:?}) failed: {1}")]
    BindApi(ClientApi, EglErrorCode),
    #[error("eglCreateContext failed: {0}")]
    ContextCreation(EglErrorCode),
    #[error("eglMakeCurrent failed: {0}")]
    MakeCurrent(EglErrorCode),
    #[error("eglSwapBuffers failed: {0}")]
    SwapBuffers(EglErrorCode),
    #[error("screen handle must not be null")]
    NullScreenHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_render_by_name() {
        assert_eq!(EglErrorCode(0x3000).to_string(), "EGL_SUCCESS");
        assert_eq!(EglErrorCode(0x3005).to_string(), "EGL_BAD_CONFIG");
        assert_eq!(EglErrorCode(0x300e).to_string(), "EGL_CONTEXT_LOST");
    }

    #[test]
    fn unknown_codes_render_as_hex() {
        assert_eq!(EglErrorCode(0x9999).name(), None);
        assert_eq!(EglErrorCode(0x9999).to_string(), "unknown EGL error 0x9999");
    }

    #[test]
    fn errors_carry_the_egl_code() {
        let err = Error::ContextCreation(EglErrorCode(0x3005));
        assert!(err.to_string().contains("EGL_BAD_CONFIG"));

        let err = Error::BindApi(ClientApi::OpenGlEs, EglErrorCode(0x300c));
        assert!(err.to_string().contains("OpenGlEs"));
        assert!(err.to_string().contains("EGL_BAD_PARAMETER"));
    }
}
