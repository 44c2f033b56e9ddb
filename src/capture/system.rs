//! Live cursor position from CoreGraphics.
//!
//! Positions are reported with the origin at the bottom-left of the main
//! display, matching AppKit mouse events.

use anyhow::Result;

use crate::models::CursorPosition;

use super::source::CursorSource;

#[cfg(target_os = "macos")]
mod ffi {
    use std::ffi::c_void;

    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct CGPoint {
        pub x: f64,
        pub y: f64,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct CGSize {
        pub width: f64,
        pub height: f64,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct CGRect {
        pub origin: CGPoint,
        pub size: CGSize,
    }

    pub type CGEventRef = *mut c_void;
    pub type CGDirectDisplayID = u32;

    #[link(name = "CoreGraphics", kind = "framework")]
    extern "C" {
        pub fn CGEventCreate(source: *const c_void) -> CGEventRef;
        pub fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
        pub fn CGMainDisplayID() -> CGDirectDisplayID;
        pub fn CGDisplayBounds(display: CGDirectDisplayID) -> CGRect;
    }

    #[link(name = "CoreFoundation", kind = "framework")]
    extern "C" {
        pub fn CFRelease(cf: *const c_void);
    }
}

/// The real system pointer. Only available on macOS.
pub struct SystemCursor {
    #[cfg(target_os = "macos")]
    main_display_height: f64,
}

impl SystemCursor {
    #[cfg(target_os = "macos")]
    pub fn new() -> Result<Self> {
        let bounds = unsafe { ffi::CGDisplayBounds(ffi::CGMainDisplayID()) };
        if bounds.size.height <= 0.0 {
            anyhow::bail!("main display reports no height");
        }
        Ok(Self {
            main_display_height: bounds.size.height,
        })
    }

    #[cfg(not(target_os = "macos"))]
    pub fn new() -> Result<Self> {
        anyhow::bail!("system cursor capture is only available on macOS; use --simulate")
    }
}

impl CursorSource for SystemCursor {
    #[cfg(target_os = "macos")]
    fn position(&mut self) -> Result<CursorPosition> {
        unsafe {
            let event = ffi::CGEventCreate(std::ptr::null());
            if event.is_null() {
                anyhow::bail!("CGEventCreate returned null");
            }
            let location = ffi::CGEventGetLocation(event);
            ffi::CFRelease(event as *const _);

            Ok(CursorPosition {
                x: location.x,
                y: self.main_display_height - location.y,
            })
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn position(&mut self) -> Result<CursorPosition> {
        anyhow::bail!("system cursor capture is only available on macOS")
    }
}
