use std::ffi::CString;
use std::os::raw::{c_char, c_void};
use std::sync::atomic::{AtomicBool, Ordering};

use glow::HasContext;
use pi_share::Share;

use crate::egl::{ffi, EGLContext, EGLDisplay, EGLint, EGL_FUNCTIONS};
use crate::error::{EglErrorCode, Error};
use crate::screen::Screen;
use crate::window::Window;
use crate::ClientApi;

/// Client version requested for every context.
const CLIENT_VERSION: EGLint = 2;

/// Renderer prefix reported by the Android emulator, whose GL is a thin
/// wrapper around the host's desktop drivers.
const EMULATOR_RENDERER_PREFIX: &str = "Android Emulator";

/// State shared with the toolkit-level context object.
pub struct ContextState {
    missing_precision_qualifiers: AtomicBool,
}

impl ContextState {
    fn new() -> Self {
        ContextState {
            missing_precision_qualifiers: AtomicBool::new(false),
        }
    }

    /// Whether shader sources must avoid precision qualifiers on this
    /// context.
    pub fn missing_precision_qualifiers(&self) -> bool {
        self.missing_precision_qualifiers.load(Ordering::Relaxed)
    }

    fn set_missing_precision_qualifiers(&self) {
        self.missing_precision_qualifiers.store(true, Ordering::Relaxed);
    }
}

/// Process-scoped latch: `take` is true exactly once, no matter how many
/// threads race on it.
pub(crate) struct OnceFlag(AtomicBool);

impl OnceFlag {
    pub(crate) const fn new() -> Self {
        OnceFlag(AtomicBool::new(false))
    }

    pub(crate) fn take(&self) -> bool {
        !self.0.swap(true, Ordering::Relaxed)
    }
}

static GL_INFO_LOGGED: OnceFlag = OnceFlag::new();

/// The context adapter: one native EGL context tied to a screen's display
/// and config.
///
/// A context is bound to at most one thread at a time through
/// [`make_current`](GlContext::make_current) and released with
/// [`done_current`](GlContext::done_current). `swap_buffers` and
/// `get_proc_address` only need the context to exist, not to be current.
pub struct GlContext {
    display: EGLDisplay,
    context: EGLContext,
    api: ClientApi,
    gl: Option<glow::Context>,
    state: Share<ContextState>,
}

unsafe impl Send for GlContext {}
unsafe impl Sync for GlContext {}

impl GlContext {
    /// Creates a context against `screen`, optionally sharing GPU resources
    /// with `share`.
    pub fn new(screen: &Screen, api: ClientApi, share: Option<&GlContext>) -> Result<Self, Error> {
        bind_api(api)?;

        let egl = &EGL_FUNCTIONS.0;
        let context_attributes = context_attributes();
        let share_context = share.map_or(ffi::NO_CONTEXT, |share| share.context);

        let context = unsafe {
            egl.CreateContext(
                screen.display(),
                screen.config(),
                share_context,
                context_attributes.as_ptr(),
            )
        };
        if context == ffi::NO_CONTEXT {
            return Err(Error::ContextCreation(EglErrorCode::last()));
        }

        Ok(GlContext {
            display: screen.display(),
            context,
            api,
            gl: None,
            state: Share::new(ContextState::new()),
        })
    }

    #[inline]
    pub fn egl_context(&self) -> EGLContext {
        self.context
    }

    #[inline]
    pub fn api(&self) -> ClientApi {
        self.api
    }

    /// State shared with the toolkit's context object; carries the
    /// precision-qualifier workaround flag.
    #[inline]
    pub fn state(&self) -> &Share<ContextState> {
        &self.state
    }

    /// Binds the context to `window`'s surface as both read and draw target
    /// for the calling thread.
    ///
    /// On first success the GL entry points are loaded and the GPU
    /// capability strings are logged once per process. Running on an
    /// emulated renderer flags the shared state so shader compilation can
    /// drop precision qualifiers.
    pub fn make_current(&mut self, window: &Window) -> Result<(), Error> {
        bind_api(self.api)?;

        let egl = &EGL_FUNCTIONS.0;
        let surface = window.egl_surface();
        let result = unsafe { egl.MakeCurrent(self.display, surface, surface, self.context) };
        if result == ffi::FALSE {
            return Err(Error::MakeCurrent(EglErrorCode::last()));
        }

        let gl = self
            .gl
            .get_or_insert_with(|| unsafe { glow::Context::from_loader_function(get_gl_address) });

        if GL_INFO_LOGGED.take() {
            log_gl_strings(gl);
        }

        let renderer = unsafe { gl.get_parameter_string(glow::RENDERER) };
        if is_emulated_renderer(&renderer) {
            self.state.set_missing_precision_qualifiers();
        }

        Ok(())
    }

    /// Unbinds any context and surface from the calling thread.
    pub fn done_current(&self) -> Result<(), Error> {
        bind_api(self.api)?;

        let egl = &EGL_FUNCTIONS.0;
        let result = unsafe {
            egl.MakeCurrent(self.display, ffi::NO_SURFACE, ffi::NO_SURFACE, ffi::NO_CONTEXT)
        };
        if result == ffi::FALSE {
            return Err(Error::MakeCurrent(EglErrorCode::last()));
        }
        Ok(())
    }

    /// Presents the back buffer of `window`'s surface, then reports the
    /// dimensions of the buffer actually presented back to the window.
    ///
    /// The buffer may have been resized between the window's last resize
    /// notification and this call, so only a fresh query is trusted.
    pub fn swap_buffers(&self, window: &Window) -> Result<(), Error> {
        bind_api(self.api)?;

        let egl = &EGL_FUNCTIONS.0;
        let surface = window.egl_surface();
        let result = unsafe { egl.SwapBuffers(self.display, surface) };
        if result == ffi::FALSE {
            return Err(Error::SwapBuffers(EglErrorCode::last()));
        }

        let (mut width, mut height) = (-1, -1);
        unsafe {
            egl.QuerySurface(self.display, surface, ffi::WIDTH as EGLint, &mut width);
            egl.QuerySurface(self.display, surface, ffi::HEIGHT as EGLint, &mut height);
        }
        window.on_buffers_swapped(width, height);

        Ok(())
    }

    /// Resolves a GL entry point by name. A null pointer is a valid result
    /// for names the driver does not export.
    pub fn get_proc_address(&self, name: &str) -> Result<*const c_void, Error> {
        bind_api(self.api)?;
        Ok(get_gl_address(name))
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        let egl = &EGL_FUNCTIONS.0;
        unsafe {
            if egl.GetCurrentContext() == self.context {
                egl.MakeCurrent(self.display, ffi::NO_SURFACE, ffi::NO_SURFACE, ffi::NO_CONTEXT);
            }
            let result = egl.DestroyContext(self.display, self.context);
            if result == ffi::FALSE {
                log::warn!("eglDestroyContext failed: {}", EglErrorCode::last());
            }
        }
        self.context = ffi::NO_CONTEXT;
    }
}

fn context_attributes() -> [EGLint; 3] {
    [
        ffi::CONTEXT_CLIENT_VERSION as EGLint,
        CLIENT_VERSION,
        ffi::NONE as EGLint,
    ]
}

fn bind_api(api: ClientApi) -> Result<(), Error> {
    let egl = &EGL_FUNCTIONS.0;
    let result = unsafe { egl.BindAPI(api.egl_api()) };
    if result == ffi::FALSE {
        return Err(Error::BindApi(api, EglErrorCode::last()));
    }
    Ok(())
}

fn get_gl_address(symbol_name: &str) -> *const c_void {
    let egl = &EGL_FUNCTIONS.0;
    match CString::new(symbol_name) {
        Ok(symbol_name) => unsafe {
            egl.GetProcAddress(symbol_name.as_ptr() as *const c_char) as *const c_void
        },
        Err(_) => std::ptr::null(),
    }
}

fn is_emulated_renderer(renderer: &str) -> bool {
    renderer.starts_with(EMULATOR_RENDERER_PREFIX)
}

fn log_gl_strings(gl: &glow::Context) {
    unsafe {
        log::info!("OpenGL vendor: {}", gl.get_parameter_string(glow::VENDOR));
        log::info!("OpenGL renderer: {}", gl.get_parameter_string(glow::RENDERER));
        log::info!("OpenGL version: {}", gl.get_parameter_string(glow::VERSION));
        log::info!(
            "OpenGL shading language version: {}",
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
        );
    }
    let extensions: Vec<&str> = gl
        .supported_extensions()
        .iter()
        .map(String::as_str)
        .collect();
    log::info!("OpenGL extensions: {}", extensions.join(" "));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn emulator_quirk_matches_on_prefix_only() {
        assert!(is_emulated_renderer("Android Emulator"));
        assert!(is_emulated_renderer("Android Emulator OpenGL ES Translator"));

        assert!(!is_emulated_renderer(""));
        assert!(!is_emulated_renderer("Mali-G78"));
        assert!(!is_emulated_renderer("android emulator"));
        assert!(!is_emulated_renderer("Android Emu"));
        assert!(!is_emulated_renderer(" Android Emulator"));
    }

    #[test]
    fn context_attributes_request_client_version_2() {
        let attributes = context_attributes();
        assert_eq!(attributes[0], ffi::CONTEXT_CLIENT_VERSION as EGLint);
        assert_eq!(attributes[1], 2);
        assert_eq!(attributes[2], ffi::NONE as EGLint);
    }

    #[test]
    fn context_state_starts_without_the_workaround() {
        let state = ContextState::new();
        assert!(!state.missing_precision_qualifiers());
        state.set_missing_precision_qualifiers();
        assert!(state.missing_precision_qualifiers());
    }

    #[test]
    fn once_flag_fires_exactly_once() {
        let _ = env_logger::builder().is_test(true).try_init();

        let flag = OnceFlag::new();
        assert!(flag.take());
        assert!(!flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn once_flag_fires_exactly_once_across_threads() {
        let flag = Arc::new(OnceFlag::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flag = Arc::clone(&flag);
                std::thread::spawn(move || flag.take())
            })
            .collect();

        let fired = handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .filter(|fired| *fired)
            .count();
        assert_eq!(fired, 1);
    }
}
