//! Relaunching the installed application.
//!
//! The target application runs on a managed runtime found under a runtime
//! home directory. The launcher picks the windowed or console runtime binary
//! for the operating system, a heap ceiling for the (architecture, OS) pair,
//! spawns the application from its install directory and exits this process.
//! Nothing waits for the child to come up before the exit.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, UpdateError};

/// Environment variable consulted for the runtime home.
pub const RUNTIME_HOME_ENV: &str = "JAVA_HOME";

/// Architecture classes that select a heap ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchClass {
    /// 32-bit targets.
    Bits32,
    /// Everything else.
    Bits64,
}

impl ArchClass {
    /// Classifies an architecture name such as `x86`, `i686` or `x86_64`.
    #[must_use]
    pub fn from_name(arch: &str) -> Self {
        match arch.to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i486" | "i586" | "i686" | "arm" | "armv7" | "thumbv7" | "mips"
            | "mips32r6" | "powerpc" | "sparc" | "riscv32" | "wasm32" | "m68k" | "csky"
            | "hexagon" | "xtensa" => Self::Bits32,
            _ => Self::Bits64,
        }
    }
}

/// Operating-system families that matter for launching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    /// Any OS whose name starts with "windows", ignoring case.
    Windows,
    /// Everything else.
    Other,
}

impl OsFamily {
    /// Classifies an operating-system name.
    #[must_use]
    pub fn from_name(os: &str) -> Self {
        if os.to_ascii_lowercase().starts_with("windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }

    /// Runtime binary relative to the runtime home.
    ///
    /// Windows gets the windowed variant so no console appears.
    #[must_use]
    pub const fn runtime_binary(self) -> &'static str {
        match self {
            Self::Windows => "bin/javaw.exe",
            Self::Other => "bin/java",
        }
    }
}

/// Heap ceilings keyed by (architecture, OS); `None` matches anything, first row wins.
const HEAP_TABLE: &[(Option<ArchClass>, Option<OsFamily>, &str)] = &[
    (Some(ArchClass::Bits32), Some(OsFamily::Windows), "-Xmx1g"),
    (Some(ArchClass::Bits32), None, "-Xmx1500m"),
    (None, None, "-Xmx2g"),
];

/// Fallback when no row matches; the table ends with a catch-all.
const DEFAULT_HEAP_FLAG: &str = "-Xmx2g";

/// Looks up the heap ceiling flag for a platform.
#[must_use]
pub fn heap_flag(arch: ArchClass, os: OsFamily) -> &'static str {
    HEAP_TABLE
        .iter()
        .find(|(row_arch, row_os, _)| {
            row_arch.is_none_or(|a| a == arch) && row_os.is_none_or(|o| o == os)
        })
        .map_or(DEFAULT_HEAP_FLAG, |(_, _, flag)| *flag)
}

/// Architecture and OS the launch decisions are made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Architecture class.
    pub arch: ArchClass,
    /// OS family.
    pub os: OsFamily,
}

impl Platform {
    /// The platform this process runs on.
    #[must_use]
    pub fn current() -> Self {
        Self {
            arch: ArchClass::from_name(std::env::consts::ARCH),
            os: OsFamily::from_name(std::env::consts::OS),
        }
    }
}

/// A fully resolved process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory of the new process.
    pub working_dir: PathBuf,
}

impl LaunchPlan {
    /// Spawns the planned process without waiting for it.
    pub fn spawn(&self) -> Result<()> {
        tracing::info!(
            "Starting {} {:?} in {}",
            self.program.display(),
            self.args,
            self.working_dir.display()
        );
        Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .spawn()
            .map_err(|e| {
                UpdateError::Launch(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;
        Ok(())
    }
}

/// Starts processes and hands execution over to them.
///
/// Implementations used in production terminate the current process after a
/// successful spawn, so `Ok(())` is only ever observed from test doubles. A
/// spawn failure is returned and the current process keeps running.
pub trait Launch {
    /// Starts the installed application from `install_dir`.
    fn launch(&self, install_dir: &Path, executable: &str) -> Result<()>;

    /// Starts `program` with `args` from `working_dir`.
    fn handoff(&self, program: &Path, args: &[String], working_dir: &Path) -> Result<()>;
}

impl<T: Launch + ?Sized> Launch for &T {
    fn launch(&self, install_dir: &Path, executable: &str) -> Result<()> {
        (**self).launch(install_dir, executable)
    }

    fn handoff(&self, program: &Path, args: &[String], working_dir: &Path) -> Result<()> {
        (**self).handoff(program, args, working_dir)
    }
}

/// Launcher that runs the application on the managed runtime and exits.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    runtime_home: Option<PathBuf>,
    platform: Platform,
}

impl ProcessLauncher {
    /// Creates a launcher for the runtime under `runtime_home`.
    pub fn new(runtime_home: impl Into<PathBuf>) -> Self {
        Self {
            runtime_home: Some(runtime_home.into()),
            platform: Platform::current(),
        }
    }

    /// Uses `configured` when given, otherwise the runtime home environment variable.
    ///
    /// A missing runtime home only matters once the application is launched;
    /// handing off to another updater process does not need one.
    #[must_use]
    pub fn discover(configured: Option<&Path>) -> Self {
        let runtime_home = match configured {
            Some(home) => Some(home.to_path_buf()),
            None => std::env::var_os(RUNTIME_HOME_ENV)
                .filter(|home| !home.is_empty())
                .map(PathBuf::from),
        };
        if runtime_home.is_none() {
            tracing::debug!("No runtime home configured and {} is not set", RUNTIME_HOME_ENV);
        }
        Self {
            runtime_home,
            platform: Platform::current(),
        }
    }

    /// Overrides the platform used for binary and heap selection.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Absolute path of the runtime binary.
    pub fn runtime_binary(&self) -> Result<PathBuf> {
        let home = self.runtime_home.as_ref().ok_or_else(|| {
            UpdateError::Launch(format!(
                "no runtime home configured and {RUNTIME_HOME_ENV} is not set"
            ))
        })?;
        Ok(home.join(self.platform.os.runtime_binary()))
    }

    /// Resolves the invocation for `executable` inside `install_dir`.
    pub fn plan(&self, install_dir: &Path, executable: &str) -> Result<LaunchPlan> {
        Ok(LaunchPlan {
            program: self.runtime_binary()?,
            args: vec![
                heap_flag(self.platform.arch, self.platform.os).to_string(),
                "-jar".to_string(),
                executable.to_string(),
            ],
            working_dir: install_dir.to_path_buf(),
        })
    }
}

impl Launch for ProcessLauncher {
    fn launch(&self, install_dir: &Path, executable: &str) -> Result<()> {
        self.plan(install_dir, executable)?.spawn()?;
        tracing::info!("Application started, exiting");
        std::process::exit(0);
    }

    fn handoff(&self, program: &Path, args: &[String], working_dir: &Path) -> Result<()> {
        let plan = LaunchPlan {
            program: program.to_path_buf(),
            args: args.to_vec(),
            working_dir: working_dir.to_path_buf(),
        };
        plan.spawn()?;
        tracing::info!("Handed off to {}, exiting", program.display());
        std::process::exit(0);
    }
}
