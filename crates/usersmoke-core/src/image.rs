//! Process-image state the loader is responsible for, and the handle through
//! which probes observe it.
//!
//! The cells under test live at process/thread scope on purpose: the property
//! being checked is that the *platform* initialized them, not the program.
//! Probes never reach for them ambiently; they go through [`SuiteEnv`].
//!
//! On `linux-gnu` a real `.init_array` entry captures `argc`/`argv`/`envp`
//! (glibc passes them to every initializer) and sets the constructor-run flag
//! before `main`, so both the argument probe and the constructor-ordering
//! probe exercise the actual loader contract. Elsewhere the orchestrator's
//! explicit pre-suite step stands in, and argument capture falls back to
//! `std::env`.

use libc::{c_char, c_int};
use std::cell::Cell;
use std::ffi::CStr;
use std::sync::atomic::{AtomicPtr, AtomicU8, AtomicUsize, Ordering};

use crate::register_load;

/// Compiled-in pattern the loader must deliver in the initialized data segment.
pub const DATA_CELL_PATTERN: u32 = 0xDEAD_BEEF;

/// Initial value of the per-thread cell.
pub const TLS_SEED: u32 = 12345;

/// Maximum argv/envp entries scanned during pre-main capture.
pub const MAX_STARTUP_SCAN: usize = 4096;

// Lives in `.data`: reads must observe the compiled-in constant.
static DATA_CELL: u32 = DATA_CELL_PATTERN;

// Zero-initialized and never written: lands in `.bss`, so a read checks the
// loader's zero-fill contract. Declared `mut` to keep it out of `.rodata`.
static mut ZERO_CELL: u32 = 0;

thread_local! {
    static TLS_CELL: Cell<u32> = const { Cell::new(TLS_SEED) };
}

const PREMAIN_NOT_RUN: u8 = 0;
const PREMAIN_BY_LOADER: u8 = 1;
const PREMAIN_BY_ORCHESTRATOR: u8 = 2;

static PREMAIN_STATE: AtomicU8 = AtomicU8::new(PREMAIN_NOT_RUN);
static CAPTURED_ARGC: AtomicUsize = AtomicUsize::new(0);
static CAPTURED_ARGV: AtomicPtr<*const c_char> = AtomicPtr::new(core::ptr::null_mut());
static CAPTURED_ENVP: AtomicPtr<*const c_char> = AtomicPtr::new(core::ptr::null_mut());

#[cfg_attr(
    not(all(target_os = "linux", target_env = "gnu")),
    allow(dead_code)
)]
extern "C" fn premain_capture(
    argc: c_int,
    argv: *const *const c_char,
    envp: *const *const c_char,
) {
    let argc = if argc < 0 { 0 } else { argc as usize };
    CAPTURED_ARGC.store(argc, Ordering::Release);
    CAPTURED_ARGV.store(argv.cast_mut(), Ordering::Release);
    CAPTURED_ENVP.store(envp.cast_mut(), Ordering::Release);
    PREMAIN_STATE.store(PREMAIN_BY_LOADER, Ordering::Release);
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[used]
#[unsafe(link_section = ".init_array")]
static PREMAIN_HOOK: extern "C" fn(c_int, *const *const c_char, *const *const c_char) =
    premain_capture;

/// Which mechanism set the constructor-run flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremainMechanism {
    /// Flag never set: the loader skipped (or mis-ordered) initializers.
    NotRun,
    /// Set by the `.init_array` entry before the program entry point.
    Loader,
    /// Set by the orchestrator's explicit pre-suite step (non-linux targets).
    Orchestrator,
}

/// Observe the constructor-run flag.
#[must_use]
pub fn premain_state() -> PremainMechanism {
    match PREMAIN_STATE.load(Ordering::Acquire) {
        PREMAIN_BY_LOADER => PremainMechanism::Loader,
        PREMAIN_BY_ORCHESTRATOR => PremainMechanism::Orchestrator,
        _ => PremainMechanism::NotRun,
    }
}

/// Explicit pre-suite hook step. On `linux-gnu` this must not mask a loader
/// that failed to run `.init_array`, so it is a no-op there.
pub fn run_premain_fallback() {
    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    {
        let _ = PREMAIN_STATE.compare_exchange(
            PREMAIN_NOT_RUN,
            PREMAIN_BY_ORCHESTRATOR,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Read the initialized-data cell. Volatile so the check is a real load from
/// the mapped segment, not a compile-time constant fold.
#[must_use]
pub fn data_cell() -> u32 {
    unsafe { core::ptr::read_volatile(&raw const DATA_CELL) }
}

/// Read the zero-fill cell (first and only read site outside tests).
#[must_use]
pub fn zero_cell() -> u32 {
    unsafe { core::ptr::read_volatile(&raw const ZERO_CELL) }
}

/// Increment this thread's TLS cell; returns (before, after).
#[must_use]
pub fn tls_increment() -> (u32, u32) {
    TLS_CELL.with(|cell| {
        let before = cell.get();
        cell.set(before.wrapping_add(1));
        (before, cell.get())
    })
}

/// Argument/environment view of the process, captured once at bootstrap.
#[derive(Debug, Clone)]
pub struct ProcessImage {
    /// Argument count as reported by the loader (clamped at zero).
    pub argc: usize,
    /// One entry per argument below `argc`; `None` marks a null pointer.
    pub args: Vec<Option<String>>,
    /// Number of environment entries present.
    pub env_count: usize,
    /// First environment entry, when any exists.
    pub first_env: Option<String>,
}

impl ProcessImage {
    /// Capture from the pre-main snapshot when available, else from `std::env`.
    #[must_use]
    pub fn capture() -> Self {
        let argv = CAPTURED_ARGV.load(Ordering::Acquire);
        if premain_state() == PremainMechanism::Loader && !argv.is_null() {
            let argc = CAPTURED_ARGC.load(Ordering::Acquire);
            let envp = CAPTURED_ENVP.load(Ordering::Acquire);
            return unsafe { Self::from_raw(argc, argv.cast_const(), envp.cast_const()) };
        }
        Self::from_std_env()
    }

    /// Build a synthetic image for tests.
    #[must_use]
    pub fn synthetic(args: Vec<Option<String>>, envs: &[&str]) -> Self {
        Self {
            argc: args.len(),
            args,
            env_count: envs.len(),
            first_env: envs.first().map(|e| (*e).to_string()),
        }
    }

    unsafe fn from_raw(
        argc: usize,
        argv: *const *const c_char,
        envp: *const *const c_char,
    ) -> Self {
        let scan = argc.min(MAX_STARTUP_SCAN);
        let mut args = Vec::with_capacity(scan);
        for i in 0..scan {
            let ptr = unsafe { *argv.add(i) };
            if ptr.is_null() {
                args.push(None);
            } else {
                let text = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
                args.push(Some(text));
            }
        }

        let mut env_count = 0usize;
        let mut first_env = None;
        if !envp.is_null() {
            while env_count < MAX_STARTUP_SCAN {
                let ptr = unsafe { *envp.add(env_count) };
                if ptr.is_null() {
                    break;
                }
                if env_count == 0 {
                    first_env =
                        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned());
                }
                env_count += 1;
            }
        }

        Self {
            argc,
            args,
            env_count,
            first_env,
        }
    }

    fn from_std_env() -> Self {
        let args: Vec<Option<String>> = std::env::args_os()
            .map(|a| Some(a.to_string_lossy().into_owned()))
            .collect();
        let first_env = std::env::vars_os()
            .next()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()));
        Self {
            argc: args.len(),
            args,
            env_count: std::env::vars_os().count(),
            first_env,
        }
    }

    /// Indices below `argc` where the loader delivered a null pointer.
    #[must_use]
    pub fn null_arg_indices(&self) -> Vec<usize> {
        self.args
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.is_none().then_some(i))
            .collect()
    }
}

/// Explicit environment handle passed into every probe.
pub struct SuiteEnv {
    image: ProcessImage,
    load_iterations: u64,
}

impl SuiteEnv {
    /// Bootstrap from the live process: run the pre-suite hook step, then
    /// capture the argument/environment image.
    #[must_use]
    pub fn bootstrap() -> Self {
        run_premain_fallback();
        Self {
            image: ProcessImage::capture(),
            load_iterations: register_load::DEFAULT_ITERATIONS,
        }
    }

    /// Handle over a synthetic image with a caller-chosen sustained-load
    /// iteration count.
    #[must_use]
    pub fn with_image(image: ProcessImage, load_iterations: u64) -> Self {
        run_premain_fallback();
        Self {
            image,
            load_iterations,
        }
    }

    #[must_use]
    pub fn image(&self) -> &ProcessImage {
        &self.image
    }

    #[must_use]
    pub fn load_iterations(&self) -> u64 {
        self.load_iterations
    }

    #[must_use]
    pub fn data_cell(&self) -> u32 {
        data_cell()
    }

    #[must_use]
    pub fn zero_cell(&self) -> u32 {
        zero_cell()
    }

    #[must_use]
    pub fn premain_state(&self) -> PremainMechanism {
        premain_state()
    }

    #[must_use]
    pub fn tls_increment(&self) -> (u32, u32) {
        tls_increment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_cell_holds_compiled_pattern() {
        assert_eq!(data_cell(), DATA_CELL_PATTERN);
    }

    #[test]
    fn zero_cell_reads_zero() {
        assert_eq!(zero_cell(), 0);
    }

    #[test]
    fn premain_hook_ran_before_tests() {
        run_premain_fallback();
        assert_ne!(premain_state(), PremainMechanism::NotRun);
    }

    #[test]
    fn capture_sees_at_least_the_program_name() {
        let image = ProcessImage::capture();
        assert!(image.argc >= 1);
        assert!(image.args[0].is_some());
        assert!(image.null_arg_indices().is_empty());
    }

    #[test]
    fn synthetic_image_reports_null_slots() {
        let image = ProcessImage::synthetic(
            vec![Some("probe".to_string()), None, Some("x".to_string())],
            &["HOME=/root"],
        );
        assert_eq!(image.argc, 3);
        assert_eq!(image.null_arg_indices(), vec![1]);
        assert_eq!(image.env_count, 1);
        assert_eq!(image.first_env.as_deref(), Some("HOME=/root"));
    }

    #[test]
    fn tls_increment_is_per_thread() {
        let (before, after) = tls_increment();
        assert_eq!(after, before + 1);
        // A fresh thread sees its own instance at the seed value.
        let handle = std::thread::spawn(tls_increment);
        let (other_before, other_after) = handle.join().unwrap();
        assert_eq!(other_before, TLS_SEED);
        assert_eq!(other_after, TLS_SEED + 1);
    }
}
