//! EGL context adapter binding a windowing plugin to a GPU rendering
//! context.
//!
//! [`Screen`] owns the display connection and config, [`Window`] owns the
//! drawable surface, and [`GlContext`] is the adapter tying the two
//! together: make-current, swap, and extension resolution.

#[macro_use]
extern crate lazy_static;

mod egl;
mod error;
mod screen;
mod window;
mod context;

pub use context::{ContextState, GlContext};
pub use egl::{EGLConfig, EGLContext, EGLDisplay, EGLSurface, EGLint};
pub use error::{EglErrorCode, Error};
pub use screen::Screen;
pub use window::Window;

use egl::ffi;

/// Client API a context renders through, chosen per context rather than per
/// build.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientApi {
    /// Desktop OpenGL.
    OpenGl = 0,
    /// OpenGL ES.
    OpenGlEs = 1,
}

impl ClientApi {
    pub(crate) fn egl_api(self) -> ffi::types::EGLenum {
        match self {
            ClientApi::OpenGl => ffi::OPENGL_API,
            ClientApi::OpenGlEs => ffi::OPENGL_ES_API,
        }
    }

    pub(crate) fn renderable_type(self) -> EGLint {
        match self {
            ClientApi::OpenGl => ffi::OPENGL_BIT as EGLint,
            ClientApi::OpenGlEs => ffi::OPENGL_ES2_BIT as EGLint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_api_maps_to_the_egl_enums() {
        assert_eq!(ClientApi::OpenGl.egl_api(), ffi::OPENGL_API);
        assert_eq!(ClientApi::OpenGlEs.egl_api(), ffi::OPENGL_ES_API);
    }

    #[test]
    fn renderable_type_follows_the_client_api() {
        assert_eq!(ClientApi::OpenGl.renderable_type(), ffi::OPENGL_BIT as EGLint);
        assert_eq!(
            ClientApi::OpenGlEs.renderable_type(),
            ffi::OPENGL_ES2_BIT as EGLint
        );
    }
}
