//! Lazily loaded EGL entry points.
//!
//! The bindings are generated into OUT_DIR by the build script and resolved
//! out of the system EGL library on first use.

use std::ffi::CString;
use std::os::raw::c_void;

use libc::{dlopen, dlsym, RTLD_LAZY};

#[allow(
    clippy::all,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    unused
)]
pub(crate) mod ffi {
    pub type khronos_utime_nanoseconds_t = khronos_uint64_t;
    pub type khronos_uint64_t = u64;
    pub type khronos_ssize_t = libc::c_long;
    pub type EGLint = i32;
    pub type EGLNativeDisplayType = *const std::os::raw::c_void;
    pub type EGLNativePixmapType = *const std::os::raw::c_void;
    pub type EGLNativeWindowType = *const std::os::raw::c_void;
    pub type NativeDisplayType = EGLNativeDisplayType;
    pub type NativePixmapType = EGLNativePixmapType;
    pub type NativeWindowType = EGLNativeWindowType;

    include!(concat!(env!("OUT_DIR"), "/egl_bindings.rs"));
}

pub use ffi::types::{EGLConfig, EGLContext, EGLDisplay, EGLSurface, EGLint};

pub(crate) struct EglLibraryWrapper(*mut c_void);

unsafe impl Send for EglLibraryWrapper {}
unsafe impl Sync for EglLibraryWrapper {}

pub(crate) struct EglFuncWrapper(pub ffi::Egl);

unsafe impl Send for EglFuncWrapper {}
unsafe impl Sync for EglFuncWrapper {}

lazy_static! {
    pub(crate) static ref EGL_LIBRARY: EglLibraryWrapper = unsafe {
        // The versioned soname is what exists on systems without the dev package.
        let mut handle = dlopen(&b"libEGL.so.1\0"[0] as *const u8 as *const _, RTLD_LAZY);
        if handle.is_null() {
            handle = dlopen(&b"libEGL.so\0"[0] as *const u8 as *const _, RTLD_LAZY);
        }
        EglLibraryWrapper(handle)
    };
    pub(crate) static ref EGL_FUNCTIONS: EglFuncWrapper =
        EglFuncWrapper(ffi::Egl::load_with(get_egl_address));
}

fn get_egl_address(symbol_name: &str) -> *const c_void {
    match CString::new(symbol_name) {
        Ok(symbol_name) => unsafe {
            dlsym(EGL_LIBRARY.0, symbol_name.as_ptr()) as *const c_void
        },
        Err(_) => std::ptr::null(),
    }
}
