//! Argument vector construction for tool invocations

use apkb_errors::ConfigError;
use std::mem;
use std::path::{Path, PathBuf};

/// Ordered staging buffer for one tool's arguments.
///
/// Tokens are kept verbatim in call order. Nothing is quoted, escaped or
/// split: the finished vector is handed to process creation as-is.
/// [`OptionsBuilder::build`] drains the buffer, so the same builder can be
/// reused for the next invocation without leaking tokens into it.
///
/// Arguments are text. A path without a UTF-8 form cannot be passed through
/// unchanged, so staging one makes the next `build` fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsBuilder {
    args: Vec<String>,
    /// First staged path with no UTF-8 form
    unrepresentable: Option<PathBuf>,
}

impl OptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single token
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append several tokens in order
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path as a single token
    pub fn path(&mut self, path: &Path) -> &mut Self {
        let token = self.path_token(path);
        self.arg(token)
    }

    /// Append several paths in order
    pub fn paths<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.path(path.as_ref());
        }
        self
    }

    /// Append `flag` followed by `value`
    pub fn option(&mut self, flag: &str, value: impl ToString) -> &mut Self {
        self.args.push(flag.to_string());
        self.args.push(value.to_string());
        self
    }

    /// Append `flag` followed by a path value
    pub fn option_path(&mut self, flag: &str, path: &Path) -> &mut Self {
        let token = self.path_token(path);
        self.option(flag, token)
    }

    /// Append `flag` followed by `paths` joined with `separator`
    pub fn option_path_list<I, P>(&mut self, flag: &str, paths: I, separator: &str) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let joined = paths
            .into_iter()
            .map(|path| self.path_token(path.as_ref()))
            .collect::<Vec<_>>()
            .join(separator);
        self.option(flag, joined)
    }

    /// Append `flag` only when `condition` holds
    pub fn flag_if(&mut self, condition: bool, flag: &str) -> &mut Self {
        if condition {
            self.args.push(flag.to_string());
        }
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Take the finished vector, leaving the builder empty
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a staged path is not valid UTF-8.
    pub fn build(&mut self) -> Result<Vec<String>, ConfigError> {
        let args = mem::take(&mut self.args);
        match self.unrepresentable.take() {
            Some(path) => Err(ConfigError::invalid(
                "path",
                format!("{} is not valid UTF-8", path.display()),
            )),
            None => Ok(args),
        }
    }

    /// The staged tokens with inline secrets masked, for logging
    #[must_use]
    pub fn redacted(&self) -> Vec<String> {
        apkb_platform::redact_secrets(&self.args)
    }

    fn path_token(&mut self, path: &Path) -> String {
        if let Some(text) = path.to_str() {
            return text.to_string();
        }
        if self.unrepresentable.is_none() {
            self.unrepresentable = Some(path.to_path_buf());
        }
        path.to_string_lossy().into_owned()
    }
}
