//! Runtime binding to libNVVM.
//!
//! The library is opened with `libloading` rather than linked, so the binary
//! starts (and can print its usage) on machines without a CUDA toolkit.
//! Only the handful of entry points needed to turn IR into PTX are resolved.

mod locate;
mod result;

pub use locate::candidates;
pub use result::NvvmResult;

use std::ffi::{CString, c_char, c_int, c_void};
use std::ptr;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::InputModule;

type RawProgram = *mut c_void;

type VersionFn = unsafe extern "C" fn(*mut c_int, *mut c_int) -> c_int;
type IrVersionFn = unsafe extern "C" fn(*mut c_int, *mut c_int, *mut c_int, *mut c_int) -> c_int;
type CreateProgramFn = unsafe extern "C" fn(*mut RawProgram) -> c_int;
type DestroyProgramFn = unsafe extern "C" fn(*mut RawProgram) -> c_int;
type AddModuleFn = unsafe extern "C" fn(RawProgram, *const c_char, usize, *const c_char) -> c_int;
type ProgramOptionsFn = unsafe extern "C" fn(RawProgram, c_int, *const *const c_char) -> c_int;
type SizeFn = unsafe extern "C" fn(RawProgram, *mut usize) -> c_int;
type BufferFn = unsafe extern "C" fn(RawProgram, *mut c_char) -> c_int;

/// Resolved entry points. The function pointers stay valid for as long as
/// `_lib` is loaded, which is as long as this struct lives.
struct Api {
    version: VersionFn,
    ir_version: IrVersionFn,
    create_program: CreateProgramFn,
    destroy_program: DestroyProgramFn,
    add_module: AddModuleFn,
    verify_program: ProgramOptionsFn,
    compile_program: ProgramOptionsFn,
    compiled_result_size: SizeFn,
    compiled_result: BufferFn,
    program_log_size: SizeFn,
    program_log: BufferFn,
    _lib: libloading::Library,
}

fn symbol<T: Copy>(lib: &libloading::Library, name: &'static str) -> Result<T> {
    // SAFETY: every `T` requested below matches the prototype in nvvm.h.
    let sym = unsafe { lib.get::<T>(name.as_bytes()) }
        .map_err(|source| Error::Symbol { name, source })?;
    Ok(*sym)
}

impl Api {
    fn resolve(lib: libloading::Library) -> Result<Self> {
        Ok(Self {
            version: symbol(&lib, "nvvmVersion")?,
            ir_version: symbol(&lib, "nvvmIRVersion")?,
            create_program: symbol(&lib, "nvvmCreateProgram")?,
            destroy_program: symbol(&lib, "nvvmDestroyProgram")?,
            add_module: symbol(&lib, "nvvmAddModuleToProgram")?,
            verify_program: symbol(&lib, "nvvmVerifyProgram")?,
            compile_program: symbol(&lib, "nvvmCompileProgram")?,
            compiled_result_size: symbol(&lib, "nvvmGetCompiledResultSize")?,
            compiled_result: symbol(&lib, "nvvmGetCompiledResult")?,
            program_log_size: symbol(&lib, "nvvmGetProgramLogSize")?,
            program_log: symbol(&lib, "nvvmGetProgramLog")?,
            _lib: lib,
        })
    }
}

fn check(call: &'static str, code: c_int) -> Result<()> {
    let result = NvvmResult::from_raw(code);
    if result.is_success() {
        Ok(())
    } else {
        Err(Error::Nvvm {
            call,
            result,
            log: None,
        })
    }
}

/// NVVM IR and debug-metadata versions understood by the loaded library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrVersion {
    pub major: i32,
    pub minor: i32,
    pub debug_major: i32,
    pub debug_minor: i32,
}

/// A loaded libNVVM.
pub struct Library {
    api: Rc<Api>,
}

impl Library {
    /// Try each candidate location in turn and keep the first that opens and
    /// exports every required symbol.
    pub fn load(config: &Config) -> Result<Self> {
        let mut attempts = Vec::new();

        for path in candidates(config) {
            // SAFETY: loading runs the library's initialisers; libNVVM has
            // none with preconditions on the caller.
            match unsafe { libloading::Library::new(&path) } {
                Ok(lib) => match Api::resolve(lib) {
                    Ok(api) => {
                        info!("loaded libNVVM from {}", path.display());
                        let library = Self { api: Rc::new(api) };
                        library.report_versions();
                        return Ok(library);
                    }
                    Err(e) => {
                        debug!("skipping {}: {e}", path.display());
                        attempts.push(format!("{} ({e})", path.display()));
                    }
                },
                Err(e) => {
                    debug!("libNVVM not at {}: {e}", path.display());
                    attempts.push(path.display().to_string());
                }
            }
        }

        Err(Error::LibraryLoad { attempts })
    }

    pub fn version(&self) -> Result<(i32, i32)> {
        let (mut major, mut minor) = (0, 0);
        // SAFETY: both out-pointers are live locals.
        check("nvvmVersion", unsafe {
            (self.api.version)(&mut major, &mut minor)
        })?;
        Ok((major, minor))
    }

    pub fn ir_version(&self) -> Result<IrVersion> {
        let mut v = IrVersion {
            major: 0,
            minor: 0,
            debug_major: 0,
            debug_minor: 0,
        };
        // SAFETY: all four out-pointers are fields of a live local.
        check("nvvmIRVersion", unsafe {
            (self.api.ir_version)(
                &mut v.major,
                &mut v.minor,
                &mut v.debug_major,
                &mut v.debug_minor,
            )
        })?;
        Ok(v)
    }

    fn report_versions(&self) {
        match self.version() {
            Ok((major, minor)) => debug!("libNVVM {major}.{minor}"),
            Err(e) => warn!("{e}"),
        }
        match self.ir_version() {
            Ok(v) => debug!(
                "NVVM IR {}.{}, debug metadata {}.{}",
                v.major, v.minor, v.debug_major, v.debug_minor
            ),
            Err(e) => warn!("{e}"),
        }
    }

    /// Open a new compilation session.
    pub fn create_program(&self) -> Result<Program> {
        let mut handle: RawProgram = ptr::null_mut();
        // SAFETY: `handle` is a live local the library writes the new program to.
        check("nvvmCreateProgram", unsafe {
            (self.api.create_program)(&mut handle)
        })?;
        Ok(Program {
            api: Rc::clone(&self.api),
            handle,
        })
    }
}

impl super::Compiler for Library {
    type Program = Program;

    fn create_program(&self) -> Result<Program> {
        Library::create_program(self)
    }
}

/// An `nvvmProgram`. Destroyed on drop.
pub struct Program {
    api: Rc<Api>,
    handle: RawProgram,
}

impl Program {
    /// Add one IR module (text or bitcode). `name` shows up in diagnostics.
    pub fn add_module(&mut self, bytes: &[u8], name: &str) -> Result<()> {
        let name = c_string("module name", name)?;
        // SAFETY: `handle` is a live program; the buffer and `name` outlive the
        // call and libNVVM copies both.
        check("nvvmAddModuleToProgram", unsafe {
            (self.api.add_module)(
                self.handle,
                bytes.as_ptr().cast(),
                bytes.len(),
                name.as_ptr(),
            )
        })
    }

    pub fn verify(&mut self, options: &[String]) -> Result<()> {
        let verify = self.api.verify_program;
        self.run_with_options("nvvmVerifyProgram", verify, options)
    }

    /// Compile every added module and return the PTX text.
    pub fn compile(&mut self, options: &[String]) -> Result<String> {
        let compile = self.api.compile_program;
        self.run_with_options("nvvmCompileProgram", compile, options)?;

        let buf = self.read_buffer(
            "nvvmGetCompiledResult",
            self.api.compiled_result_size,
            self.api.compiled_result,
        )?;
        String::from_utf8(buf).map_err(Error::InvalidOutput)
    }

    /// Messages produced by the last verify or compile.
    pub fn log(&self) -> Result<String> {
        let buf = self.read_buffer(
            "nvvmGetProgramLog",
            self.api.program_log_size,
            self.api.program_log,
        )?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn run_with_options(
        &mut self,
        call: &'static str,
        f: ProgramOptionsFn,
        options: &[String],
    ) -> Result<()> {
        let owned = options
            .iter()
            .map(|o| c_string("option", o))
            .collect::<Result<Vec<_>>>()?;
        let ptrs: Vec<*const c_char> = owned.iter().map(|o| o.as_ptr()).collect();
        let count = c_int::try_from(ptrs.len()).map_err(|_| Error::Nvvm {
            call,
            result: NvvmResult::InvalidOption,
            log: None,
        })?;
        let argv = if ptrs.is_empty() {
            ptr::null()
        } else {
            ptrs.as_ptr()
        };

        // SAFETY: `argv` points at `count` NUL-terminated strings kept alive by
        // `owned`, or is null when `count` is 0.
        let code = unsafe { f(self.handle, count, argv) };
        let result = NvvmResult::from_raw(code);
        if result.is_success() {
            return Ok(());
        }

        let log = match self.log() {
            Ok(log) if !log.trim().is_empty() => Some(log.trim_end().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("could not fetch program log: {e}");
                None
            }
        };
        Err(Error::Nvvm { call, result, log })
    }

    /// Two-step "get size, then fill" read used by both result and log.
    /// The trailing NUL that libNVVM counts in the size is dropped.
    fn read_buffer(&self, call: &'static str, size_fn: SizeFn, fill_fn: BufferFn) -> Result<Vec<u8>> {
        let mut size = 0usize;
        // SAFETY: `size` is a live local.
        check(call, unsafe { size_fn(self.handle, &mut size) })?;
        if size == 0 {
            return Ok(Vec::new());
        }

        let mut buf = vec![0u8; size];
        // SAFETY: `buf` holds exactly the `size` bytes the library asked for.
        check(call, unsafe { fill_fn(self.handle, buf.as_mut_ptr().cast()) })?;
        if let Some(end) = buf.iter().position(|&b| b == 0) {
            buf.truncate(end);
        }
        Ok(buf)
    }
}

impl super::Program for Program {
    fn add_module(&mut self, module: &InputModule) -> Result<()> {
        Program::add_module(self, &module.bytes, &module.name)
    }

    fn verify(&mut self) -> Result<()> {
        Program::verify(self, &[])
    }

    fn compile(&mut self, options: &[String]) -> Result<String> {
        Program::compile(self, options)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        // SAFETY: `handle` came from nvvmCreateProgram and is destroyed once.
        let code = unsafe { (self.api.destroy_program)(&mut self.handle) };
        if let Err(e) = check("nvvmDestroyProgram", code) {
            warn!("{e}");
        }
    }
}

fn c_string(what: &'static str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::Nul {
        what,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_maps_codes() {
        assert!(check("nvvmVersion", 0).is_ok());

        let err = check("nvvmCompileProgram", 9).unwrap_err();
        assert!(matches!(
            err,
            Error::Nvvm {
                call: "nvvmCompileProgram",
                result: NvvmResult::Compilation,
                log: None
            }
        ));
    }

    #[test]
    fn options_with_nul_are_rejected() {
        let err = c_string("option", "-arch=\0compute_70").unwrap_err();
        assert!(matches!(err, Error::Nul { what: "option", .. }));
    }

    #[test]
    fn load_reports_every_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            libnvvm: Some(dir.path().join("not-a-library.so")),
            cuda_home: Some(dir.path().to_path_buf()),
            ..Config::default()
        };

        // Bare names may resolve on a machine with CUDA installed.
        if let Err(Error::LibraryLoad { attempts }) = Library::load(&cfg) {
            assert_eq!(attempts.len(), candidates(&cfg).len());
            assert!(attempts[0].ends_with("not-a-library.so"));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn library_without_nvvm_symbols_is_skipped() {
        // libc opens fine but exports none of the libNVVM entry points.
        let cfg = Config {
            libnvvm: Some("libc.so.6".into()),
            ..Config::default()
        };

        match Library::load(&cfg) {
            Err(Error::LibraryLoad { attempts }) => {
                assert_eq!(attempts.len(), candidates(&cfg).len());
                assert!(attempts[0].starts_with("libc.so.6 ("));
                assert!(attempts[0].contains("nvvmVersion"));
            }
            Err(other) => panic!("later candidates were not tried: {other}"),
            // a real libNVVM further down the list was found
            Ok(_) => {}
        }
    }
}
