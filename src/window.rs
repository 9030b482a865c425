use std::os::raw::c_void;
use std::sync::atomic::{AtomicU64, Ordering};

use raw_window_handle::{HasWindowHandle, RawWindowHandle, XlibWindowHandle};

use crate::egl::{ffi, EGLDisplay, EGLSurface, EGLint, EGL_FUNCTIONS};
use crate::error::{EglErrorCode, Error};
use crate::screen::Screen;

/// The window-side collaborator: owns the drawable EGL surface and the last
/// buffer size the rendering thread reported after a swap.
pub struct Window {
    surface: EGLSurface,
    display: EGLDisplay,
    buffer_size: SizeSlot,
}

unsafe impl Send for Window {}
unsafe impl Sync for Window {}

impl Window {
    /// Creates the drawable surface for a native window on `screen`.
    pub fn new<W: HasWindowHandle>(screen: &Screen, window: &W) -> Result<Self, Error> {
        let handle = window
            .window_handle()
            .map_err(|_| Error::IncompatibleWindowHandle)?;
        let native_window = match handle.as_raw() {
            RawWindowHandle::AndroidNdk(handle) => handle.a_native_window.as_ptr(),
            RawWindowHandle::Xlib(XlibWindowHandle { window, .. }) => window as *mut c_void,
            _ => return Err(Error::IncompatibleWindowHandle),
        };

        let egl = &EGL_FUNCTIONS.0;
        let display = screen.display();
        unsafe {
            let attributes = [ffi::NONE as EGLint];
            let surface = egl.CreateWindowSurface(
                display,
                screen.config(),
                native_window,
                attributes.as_ptr(),
            );
            if surface == ffi::NO_SURFACE {
                return Err(Error::SurfaceCreation(EglErrorCode::last()));
            }

            let (mut width, mut height) = (0, 0);
            egl.QuerySurface(display, surface, ffi::WIDTH as EGLint, &mut width);
            egl.QuerySurface(display, surface, ffi::HEIGHT as EGLint, &mut height);

            Ok(Window {
                surface,
                display,
                buffer_size: SizeSlot::new(width, height),
            })
        }
    }

    #[inline]
    pub fn egl_surface(&self) -> EGLSurface {
        self.surface
    }

    /// Called from the rendering thread with the dimensions actually queried
    /// after a swap. Safe to call while another thread reads `buffer_size`.
    pub fn on_buffers_swapped(&self, width: i32, height: i32) {
        self.buffer_size.store(width, height);
    }

    /// Last (width, height) pair the rendering thread reported. The pair is
    /// always consistent: both values come from the same notification.
    pub fn buffer_size(&self) -> (i32, i32) {
        self.buffer_size.load()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let egl = &EGL_FUNCTIONS.0;
        let result = unsafe { egl.DestroySurface(self.display, self.surface) };
        if result == ffi::FALSE {
            log::warn!("eglDestroySurface failed: {}", EglErrorCode::last());
        }
        self.surface = ffi::NO_SURFACE;
    }
}

/// Both halves of the pair live in one word, so a load never mixes the width
/// of one store with the height of another.
pub(crate) struct SizeSlot(AtomicU64);

impl SizeSlot {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        SizeSlot(AtomicU64::new(pack(width, height)))
    }

    pub(crate) fn store(&self, width: i32, height: i32) {
        self.0.store(pack(width, height), Ordering::Release);
    }

    pub(crate) fn load(&self) -> (i32, i32) {
        unpack(self.0.load(Ordering::Acquire))
    }
}

fn pack(width: i32, height: i32) -> u64 {
    ((width as u32 as u64) << 32) | height as u32 as u64
}

fn unpack(packed: u64) -> (i32, i32) {
    ((packed >> 32) as u32 as i32, packed as u32 as i32)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn pack_round_trips() {
        for &pair in &[
            (0, 0),
            (1024, 768),
            (-1, -1),
            (i32::MAX, i32::MIN),
            (1, i32::MAX),
        ] {
            assert_eq!(unpack(pack(pair.0, pair.1)), pair);
        }
    }

    #[test]
    fn last_store_wins() {
        let slot = SizeSlot::new(100, 200);
        assert_eq!(slot.load(), (100, 200));
        slot.store(300, 400);
        slot.store(500, 600);
        assert_eq!(slot.load(), (500, 600));
    }

    #[test]
    fn readers_never_observe_a_torn_pair() {
        // Writers only ever store pairs with height == width + 1; any torn
        // read would break that relation.
        let slot = Arc::new(SizeSlot::new(0, 1));
        let mut writers = Vec::new();
        for t in 0..4 {
            let slot = Arc::clone(&slot);
            writers.push(std::thread::spawn(move || {
                for i in 0..10_000 {
                    let w = t * 10_000 + i;
                    slot.store(w, w + 1);
                }
            }));
        }

        let reader = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for _ in 0..40_000 {
                    let (w, h) = slot.load();
                    assert_eq!(h, w + 1);
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
    }
}
