//! Android toolchain resolution

use apkb_errors::PlatformError;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// An external executable the pipeline drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Aapt2,
    Javac,
    D8,
    R8,
    Zipalign,
    Apksigner,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Aapt2,
        Tool::Javac,
        Tool::D8,
        Tool::R8,
        Tool::Zipalign,
        Tool::Apksigner,
    ];

    /// Executable name without any platform suffix
    #[must_use]
    pub fn binary_name(self) -> &'static str {
        match self {
            Tool::Aapt2 => "aapt2",
            Tool::Javac => "javac",
            Tool::D8 => "d8",
            Tool::R8 => "r8",
            Tool::Zipalign => "zipalign",
            Tool::Apksigner => "apksigner",
        }
    }

    /// File names to look for inside a tools directory
    fn candidates(self) -> Vec<String> {
        let name = self.binary_name();
        if cfg!(windows) {
            vec![format!("{name}.exe"), format!("{name}.bat"), name.to_string()]
        } else {
            vec![name.to_string()]
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Resolved location of every tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    aapt2: PathBuf,
    javac: PathBuf,
    d8: PathBuf,
    r8: PathBuf,
    zipalign: PathBuf,
    apksigner: PathBuf,
    /// Tools a lookup searched for and did not find
    missing: BTreeSet<Tool>,
}

impl Default for Toolchain {
    /// Bare executable names, left for the OS to find at spawn time
    fn default() -> Self {
        Self {
            aapt2: Tool::Aapt2.binary_name().into(),
            javac: Tool::Javac.binary_name().into(),
            d8: Tool::D8.binary_name().into(),
            r8: Tool::R8.binary_name().into(),
            zipalign: Tool::Zipalign.binary_name().into(),
            apksigner: Tool::Apksigner.binary_name().into(),
            missing: BTreeSet::new(),
        }
    }
}

impl Toolchain {
    /// Locate every tool in `tools_dir`, then on `PATH`.
    #[must_use]
    pub fn resolve(tools_dir: Option<&Path>) -> Self {
        let search_path = std::env::var_os("PATH");
        Self::resolve_in(tools_dir, search_path.as_deref())
    }

    /// Locate every tool against an explicit search path.
    ///
    /// For each tool: `<tools_dir>/<name>` when it exists, else the first
    /// match on `search_path`. A tool found nowhere keeps its bare name and
    /// is reported by [`Toolchain::require`]; only the stages that run it fail.
    #[must_use]
    pub fn resolve_in(tools_dir: Option<&Path>, search_path: Option<&OsStr>) -> Self {
        let mut toolchain = Self::default();
        for tool in Tool::ALL {
            if let Some(path) = locate(tool, tools_dir, search_path) {
                toolchain = toolchain.with_tool(tool, path);
            } else {
                tracing::debug!(%tool, "not found");
                toolchain.missing.insert(tool);
            }
        }
        toolchain
    }

    /// The path to run `tool` from
    ///
    /// # Errors
    ///
    /// Returns `ToolNotFound` if a lookup searched for the tool and did not
    /// find it.
    pub fn require(&self, tool: Tool) -> Result<&Path, PlatformError> {
        if self.missing.contains(&tool) {
            Err(PlatformError::ToolNotFound {
                tool: tool.to_string(),
            })
        } else {
            Ok(self.path(tool))
        }
    }

    /// Tools a lookup did not find
    pub fn missing(&self) -> impl Iterator<Item = Tool> + '_ {
        self.missing.iter().copied()
    }

    /// Override the location of one tool
    #[must_use]
    pub fn with_tool(mut self, tool: Tool, path: impl Into<PathBuf>) -> Self {
        *self.slot(tool) = path.into();
        self.missing.remove(&tool);
        self
    }

    #[must_use]
    pub fn path(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Aapt2 => &self.aapt2,
            Tool::Javac => &self.javac,
            Tool::D8 => &self.d8,
            Tool::R8 => &self.r8,
            Tool::Zipalign => &self.zipalign,
            Tool::Apksigner => &self.apksigner,
        }
    }

    /// Every tool with its resolved path, in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (Tool, &Path)> {
        Tool::ALL.into_iter().map(|tool| (tool, self.path(tool)))
    }

    fn slot(&mut self, tool: Tool) -> &mut PathBuf {
        match tool {
            Tool::Aapt2 => &mut self.aapt2,
            Tool::Javac => &mut self.javac,
            Tool::D8 => &mut self.d8,
            Tool::R8 => &mut self.r8,
            Tool::Zipalign => &mut self.zipalign,
            Tool::Apksigner => &mut self.apksigner,
        }
    }
}

fn locate(tool: Tool, tools_dir: Option<&Path>, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if let Some(dir) = tools_dir {
        let found = tool
            .candidates()
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        if found.is_some() {
            return found;
        }
    }
    which::which_in(tool.binary_name(), search_path, ".").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let aapt2 = dir.path().join(Tool::Aapt2.candidates().remove(0));
        std::fs::write(&aapt2, b"").unwrap();

        let toolchain = Toolchain::resolve(Some(dir.path()));
        assert_eq!(toolchain.path(Tool::Aapt2), aapt2);
    }

    #[test]
    fn test_unfound_tool_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let zipalign = dir.path().join(Tool::Zipalign.candidates().remove(0));
        std::fs::write(&zipalign, b"").unwrap();

        let toolchain = Toolchain::resolve_in(Some(dir.path()), Some(OsStr::new("")));
        assert_eq!(toolchain.require(Tool::Zipalign).unwrap(), zipalign);
        assert!(matches!(
            toolchain.require(Tool::Javac),
            Err(PlatformError::ToolNotFound { tool }) if tool == "javac"
        ));
        assert_eq!(toolchain.missing().count(), Tool::ALL.len() - 1);

        let patched = toolchain.with_tool(Tool::Javac, "/usr/lib/jvm/bin/javac");
        assert!(patched.require(Tool::Javac).is_ok());
    }

    #[test]
    fn test_default_toolchain_defers_to_spawn() {
        let toolchain = Toolchain::default();
        assert_eq!(toolchain.require(Tool::D8).unwrap(), Path::new("d8"));
        assert_eq!(toolchain.missing().count(), 0);
    }

    #[test]
    fn test_with_tool_overrides_one_entry() {
        let toolchain = Toolchain::default().with_tool(Tool::D8, "/opt/bt/d8");
        assert_eq!(toolchain.path(Tool::D8), Path::new("/opt/bt/d8"));
        assert_eq!(toolchain.path(Tool::R8), Path::new("r8"));
        assert_eq!(toolchain.iter().count(), Tool::ALL.len());
    }
}
