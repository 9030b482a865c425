use crate::egl::{ffi, EGLConfig, EGLDisplay, EGLint, EGL_FUNCTIONS};
use crate::error::{EglErrorCode, Error};
use crate::ClientApi;

/// The display-side collaborator: one EGL display connection plus the config
/// every context and surface created against it will use.
pub struct Screen {
    display: EGLDisplay,
    config: EGLConfig,
    owns_display: bool,
}

unsafe impl Send for Screen {}
unsafe impl Sync for Screen {}

impl Screen {
    /// Connects to the default display, initializes EGL and picks a config
    /// renderable through `api`.
    pub fn new(api: ClientApi) -> Result<Self, Error> {
        let egl = &EGL_FUNCTIONS.0;
        unsafe {
            let display = egl.GetDisplay(ffi::DEFAULT_DISPLAY);
            if display == ffi::NO_DISPLAY {
                return Err(Error::DisplayUnavailable);
            }

            let (mut major_version, mut minor_version) = (0, 0);
            let result = egl.Initialize(display, &mut major_version, &mut minor_version);
            if result == ffi::FALSE {
                return Err(Error::InitializeFailed(EglErrorCode::last()));
            }
            log::debug!("initialized EGL {}.{}", major_version, minor_version);

            let config = choose_config(display, api)?;

            Ok(Screen {
                display,
                config,
                owns_display: true,
            })
        }
    }

    /// Wraps display/config handles owned by the embedding toolkit. The
    /// handles are borrowed: dropping the screen does not terminate the
    /// display.
    pub fn from_raw(display: EGLDisplay, config: EGLConfig) -> Result<Self, Error> {
        if display.is_null() || config.is_null() {
            return Err(Error::NullScreenHandle);
        }
        Ok(Screen {
            display,
            config,
            owns_display: false,
        })
    }

    #[inline]
    pub fn display(&self) -> EGLDisplay {
        self.display
    }

    #[inline]
    pub fn config(&self) -> EGLConfig {
        self.config
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if !self.owns_display {
            return;
        }
        let egl = &EGL_FUNCTIONS.0;
        let result = unsafe { egl.Terminate(self.display) };
        if result == ffi::FALSE {
            log::warn!("eglTerminate failed: {}", EglErrorCode::last());
        }
        self.display = ffi::NO_DISPLAY;
    }
}

/// RGB888 with a 24-bit depth buffer, window-renderable.
fn choose_config(display: EGLDisplay, api: ClientApi) -> Result<EGLConfig, Error> {
    let config_attributes = [
        ffi::RENDERABLE_TYPE as EGLint,
        api.renderable_type(),
        ffi::SURFACE_TYPE as EGLint,
        ffi::WINDOW_BIT as EGLint,
        ffi::BLUE_SIZE as EGLint,
        8,
        ffi::GREEN_SIZE as EGLint,
        8,
        ffi::RED_SIZE as EGLint,
        8,
        ffi::DEPTH_SIZE as EGLint,
        24,
        ffi::NONE as EGLint,
    ];

    let egl = &EGL_FUNCTIONS.0;
    let (mut config, mut config_count) = (std::ptr::null(), 0);
    let result = unsafe {
        egl.ChooseConfig(
            display,
            config_attributes.as_ptr(),
            &mut config,
            1,
            &mut config_count,
        )
    };
    if result == ffi::FALSE || config_count == 0 {
        return Err(Error::NoSuitableConfig);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_null_display() {
        let config = 0x1 as EGLConfig;
        assert!(matches!(
            Screen::from_raw(std::ptr::null(), config),
            Err(Error::NullScreenHandle)
        ));
    }

    #[test]
    fn from_raw_rejects_null_config() {
        let display = 0x1 as EGLDisplay;
        assert!(matches!(
            Screen::from_raw(display, std::ptr::null()),
            Err(Error::NullScreenHandle)
        ));
    }

    #[test]
    fn from_raw_keeps_the_handles_it_was_given() {
        let display = 0x10 as EGLDisplay;
        let config = 0x20 as EGLConfig;
        let screen = Screen::from_raw(display, config).unwrap();
        assert_eq!(screen.display(), display);
        assert_eq!(screen.config(), config);
        // Borrowed handles: dropping must not call into EGL.
        drop(screen);
    }
}
