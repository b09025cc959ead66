//! FFI bindings to DragonFly BSD system APIs.
//!
//! This module centralizes the `sysctl(3)` plumbing used throughout the
//! crate: the kernel structures read out of the MIB tree and small safe
//! wrappers over `libc::sysctl` / `libc::sysctlbyname`. Callers own every
//! buffer handed to the kernel, so release on all exit paths is guaranteed
//! by ordinary `Vec` ownership.

use std::ffi::CStr;
use std::io;
use std::mem;
use std::ptr;

use libc::{c_int, c_uint, c_void};

use crate::error::{Error, Result};

/// Per-CPU time accounting record, from `sys/kinfo.h`.
///
/// The statclock bumps one of the five leading accumulators on every tick,
/// attributed to whatever the CPU was doing when the interrupt fired.
#[allow(non_camel_case_types)]
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct kinfo_cputime {
    pub cp_user: u64,
    pub cp_nice: u64,
    pub cp_sys: u64,
    pub cp_intr: u64,
    pub cp_idle: u64,
    pub cp_sample_pc: u64,
    pub cp_stallpc: u64,
    pub cp_msg: [u8; 32],
}

/// Maps the current errno to a crate error for a failed sysctl on `name`.
fn sysctl_error(name: &str) -> Error {
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EPERM) | Some(libc::EACCES) => {
            Error::permission_denied(format!("sysctl {name}"))
        }
        _ => Error::system(format!("sysctl {name} failed: {err}")),
    }
}

/// Reads a single `c_int` from a numeric MIB, e.g. `[CTL_HW, HW_NCPU]`.
pub fn sysctl_i32(mib: &[c_int], name: &str) -> Result<i32> {
    let mut value: c_int = 0;
    let mut len = mem::size_of::<c_int>();

    let rc = unsafe {
        libc::sysctl(
            mib.as_ptr(),
            mib.len() as c_uint,
            &mut value as *mut c_int as *mut c_void,
            &mut len,
            ptr::null_mut(),
            0,
        )
    };

    if rc != 0 {
        return Err(sysctl_error(name));
    }
    if len != mem::size_of::<c_int>() {
        return Err(Error::system(format!("sysctl {name}: short read ({len} bytes)")));
    }
    Ok(value)
}

/// Reads a single `c_long` by sysctl node name.
pub fn sysctl_long_by_name(name: &CStr) -> Result<i64> {
    let mut value: libc::c_long = 0;
    let mut len = mem::size_of::<libc::c_long>();

    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            &mut value as *mut libc::c_long as *mut c_void,
            &mut len,
            ptr::null_mut(),
            0,
        )
    };

    let display = name.to_string_lossy();
    if rc != 0 {
        return Err(sysctl_error(&display));
    }
    if len != mem::size_of::<libc::c_long>() {
        return Err(Error::system(format!("sysctl {display}: short read ({len} bytes)")));
    }
    Ok(value as i64)
}

/// Reads an array of `count` kernel structures by sysctl node name.
///
/// The buffer is sized by the caller from the CPU count reported in the same
/// cycle; the kernel rejecting it (ENOMEM on growth between queries) or
/// returning a byte count that is not a whole number of records both fail
/// the query. The returned length is whatever the kernel actually filled,
/// which the caller must still check against its expectation.
pub fn sysctl_array_by_name<T: Copy>(name: &CStr, count: usize) -> Result<Vec<T>> {
    let elem = mem::size_of::<T>();
    let mut buf: Vec<T> = Vec::with_capacity(count);
    let mut len = elem * count;

    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            buf.as_mut_ptr() as *mut c_void,
            &mut len,
            ptr::null_mut(),
            0,
        )
    };

    let display = name.to_string_lossy();
    if rc != 0 {
        return Err(sysctl_error(&display));
    }
    if len % elem != 0 {
        return Err(Error::system(format!(
            "sysctl {display}: short read ({len} bytes, record size {elem})"
        )));
    }

    let filled = len / elem;
    if filled > count {
        return Err(Error::system(format!(
            "sysctl {display}: kernel filled {filled} records into a buffer sized for {count}"
        )));
    }
    // Every byte up to `len` was written by the kernel.
    unsafe { buf.set_len(filled) };
    Ok(buf)
}
