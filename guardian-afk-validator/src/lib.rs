//! The dynamic-library boundary to the external biome-viability oracle.
//!
//! The oracle is a C-ABI plug-in: `create`, `isViableMonument`,
//! `isViableMonumentBatch`, `free`, operating on an opaque handle. Absence
//! of the library is legal and recoverable (downgrades to
//! [`guardian_afk_core::NullValidator`] upstream); a library that loads but
//! misbehaves once a handle exists is not.

use std::ffi::c_void;
use std::path::Path;

use guardian_afk_core::error::{PipelineError, PipelineResult};
use guardian_afk_core::validator::Validator;
use libloading::{Library, Symbol};
use parking_lot::Mutex;

type CreateFn = unsafe extern "C" fn(seed: i64, version_ordinal: i32) -> *mut c_void;
type IsViableFn = unsafe extern "C" fn(handle: *mut c_void, chunk_x: i32, chunk_z: i32) -> u8;
type IsViableBatchFn = unsafe extern "C" fn(
    handle: *mut c_void,
    xs: *const i32,
    zs: *const i32,
    out_flags: *mut u8,
    n: usize,
);
type FreeFn = unsafe extern "C" fn(handle: *mut c_void);

#[derive(Clone, Copy)]
struct OracleVTable {
    is_viable: IsViableFn,
    is_viable_batch: IsViableBatchFn,
    free: FreeFn,
}

/// The opaque handle returned by the oracle's `create`. Only ever touched
/// behind [`OracleCore::handle`]'s lock, matching the spec's
/// single-threaded-per-handle default.
struct OracleHandle(*mut c_void);

// The handle is just an address; the oracle library is responsible for
// whatever internal synchronization its own state needs. Serializing every
// call through `OracleCore::handle`'s mutex is what makes it sound to send
// across threads here, since the default contract assumes a handle is only
// ever touched by one caller at a time.
unsafe impl Send for OracleHandle {}

/// The FFI call logic, independent of how the vtable and handle were
/// obtained. Split out from [`DynamicValidator`] so the batching/locking
/// behavior can be exercised with hand-built function pointers in tests,
/// without needing a real `dlopen`-able library.
struct OracleCore {
    vtable: OracleVTable,
    handle: Mutex<OracleHandle>,
}

impl OracleCore {
    fn call_batch(&self, xs: &[i32], zs: &[i32]) -> PipelineResult<Vec<bool>> {
        if xs.len() != zs.len() {
            return Err(PipelineError::ValidatorInternal(format!(
                "mismatched batch lengths: {} xs vs {} zs",
                xs.len(),
                zs.len()
            )));
        }
        let n = xs.len();
        let mut out_flags = vec![0_u8; n];
        let handle = self.handle.lock();
        // SAFETY: `handle.0` was produced by a successful `create` call and
        // is freed only in `Drop`; `out_flags` has exactly `n` elements and
        // outlives the call.
        unsafe {
            (self.vtable.is_viable_batch)(
                handle.0,
                xs.as_ptr(),
                zs.as_ptr(),
                out_flags.as_mut_ptr(),
                n,
            );
        }
        Ok(out_flags.into_iter().map(|flag| flag != 0).collect())
    }

    fn call_single(&self, chunk_x: i32, chunk_z: i32) -> PipelineResult<bool> {
        let handle = self.handle.lock();
        // SAFETY: same handle-validity argument as `call_batch`.
        let flag = unsafe { (self.vtable.is_viable)(handle.0, chunk_x, chunk_z) };
        Ok(flag != 0)
    }
}

impl Drop for OracleCore {
    fn drop(&mut self) {
        let handle = self.handle.lock();
        // SAFETY: `handle.0` is only freed here, exactly once, and nothing
        // else holds a copy of it once `OracleCore` is being dropped.
        unsafe {
            (self.vtable.free)(handle.0);
        }
    }
}

impl Validator for OracleCore {
    fn is_viable_batch(&self, xs: &[i32], zs: &[i32]) -> PipelineResult<Vec<bool>> {
        self.call_batch(xs, zs)
    }

    fn is_viable(&self, chunk_x: i32, chunk_z: i32) -> PipelineResult<bool> {
        self.call_single(chunk_x, chunk_z)
    }
}

/// A loaded native biome-viability oracle.
///
/// Keeps the backing [`Library`] alive for as long as the resolved function
/// pointers might be called; [`Validator`] calls are forwarded to the
/// wrapped [`OracleCore`].
pub struct DynamicValidator {
    // Never read again after `load`, but must outlive every call through
    // `core`'s function pointers, which point into this library's mapped
    // code.
    _library: Library,
    core: OracleCore,
}

impl DynamicValidator {
    /// Loads the oracle at `library_path`, resolves its four C-ABI entry
    /// points, and calls `create(seed, version_ordinal)`.
    ///
    /// A missing library or missing symbol is reported as
    /// [`PipelineError::ValidatorMissing`] — recoverable, the caller should
    /// downgrade to [`guardian_afk_core::NullValidator`]. A library that
    /// loads but whose `create` returns a null handle is
    /// [`PipelineError::ValidatorInternal`] — fatal, since the library is
    /// present but broken rather than merely absent.
    pub fn load(library_path: &Path, seed: i64, version_ordinal: i32) -> PipelineResult<Self> {
        let library = unsafe { Library::new(library_path) }.map_err(|e| {
            PipelineError::ValidatorMissing(format!(
                "failed to load {}: {e}",
                library_path.display()
            ))
        })?;

        let create: Symbol<CreateFn> = unsafe { library.get(b"create\0") }
            .map_err(|e| PipelineError::ValidatorMissing(format!("missing `create`: {e}")))?;
        let is_viable: Symbol<IsViableFn> = unsafe { library.get(b"isViableMonument\0") }
            .map_err(|e| {
                PipelineError::ValidatorMissing(format!("missing `isViableMonument`: {e}"))
            })?;
        let is_viable_batch: Symbol<IsViableBatchFn> =
            unsafe { library.get(b"isViableMonumentBatch\0") }.map_err(|e| {
                PipelineError::ValidatorMissing(format!(
                    "missing `isViableMonumentBatch`: {e}"
                ))
            })?;
        let free: Symbol<FreeFn> = unsafe { library.get(b"free\0") }
            .map_err(|e| PipelineError::ValidatorMissing(format!("missing `free`: {e}")))?;

        // Function pointers are `Copy`; dereferencing the `Symbol`s detaches
        // them from the `Symbol` borrow while the addresses themselves
        // remain valid for as long as `library` stays loaded.
        let vtable = OracleVTable {
            is_viable: *is_viable,
            is_viable_batch: *is_viable_batch,
            free: *free,
        };
        let create_fn = *create;

        // SAFETY: `create_fn` comes from a symbol we just resolved against
        // the oracle's documented signature.
        let raw_handle = unsafe { create_fn(seed, version_ordinal) };
        if raw_handle.is_null() {
            return Err(PipelineError::ValidatorInternal(
                "create() returned a null handle".to_string(),
            ));
        }

        tracing::info!(
            library = %library_path.display(),
            "loaded native biome-viability oracle"
        );

        Ok(Self {
            _library: library,
            core: OracleCore {
                vtable,
                handle: Mutex::new(OracleHandle(raw_handle)),
            },
        })
    }
}

impl Validator for DynamicValidator {
    fn is_viable_batch(&self, xs: &[i32], zs: &[i32]) -> PipelineResult<Vec<bool>> {
        self.core.is_viable_batch(xs, zs)
    }

    fn is_viable(&self, chunk_x: i32, chunk_z: i32) -> PipelineResult<bool> {
        self.core.is_viable(chunk_x, chunk_z)
    }
}

/// Attempts to load `library_path` as the native oracle; on any
/// [`PipelineError::ValidatorMissing`] this logs a warning and returns
/// `None` instead of propagating, matching the spec's "absence must be
/// survivable" contract. Any other error (a broken, present library) still
/// propagates.
pub fn load_or_warn(
    library_path: &Path,
    seed: i64,
    version_ordinal: i32,
) -> PipelineResult<Option<DynamicValidator>> {
    match DynamicValidator::load(library_path, seed, version_ordinal) {
        Ok(validator) => Ok(Some(validator)),
        Err(PipelineError::ValidatorMissing(reason)) => {
            tracing::warn!(reason, "native biome-viability oracle unavailable, proceeding with placement-only results");
            Ok(None)
        }
        Err(other) => Err(other),
    }
}
