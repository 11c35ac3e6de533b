use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::sync::Once;

/// Route whisper.cpp's log lines into `tracing` at `trace` level.
///
/// whisper.cpp prints model-loading chatter straight to stderr by default, which would end up
/// interleaved with the CLI's JSON output.
unsafe extern "C" fn whisper_log_callback(
    level: u32,
    c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    if c_msg.is_null() {
        return;
    }

    // SAFETY: whisper.cpp passes a NUL-terminated string that lives for the callback's duration.
    let msg = unsafe { CStr::from_ptr(c_msg) }.to_string_lossy();
    let msg = msg.trim_end();
    if !msg.is_empty() {
        tracing::trace!(target: "whisper_cpp", whisper_level = level, "{msg}");
    }
}

/// Ensure whisper logging is configured exactly once for the lifetime of the process.
pub fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}
