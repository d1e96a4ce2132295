use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};

use crate::error::{Error, Result};
use crate::runner::{merge_env, Invocation};

/// Assembles an [`Invocation`] from a launcher prefix, pass-through arguments
/// and environment overrides.
pub struct InvocationBuilder {
    /// The command/binary to invoke, e.g. "uv".
    program: String,
    /// Launcher arguments first, then the pass-through ones. Kept as `OsString`
    /// so arguments that aren't valid UTF-8 reach the child byte for byte.
    args: Vec<OsString>,
    /// Base layer for the child environment. `None` means the current process
    /// environment, read at build time.
    base_env: Option<HashMap<OsString, OsString>>,
    /// Overrides applied on top of the base layer.
    extra_env: BTreeMap<String, String>,
}

impl InvocationBuilder {
    pub fn new(program: &str) -> Self {
        tracing::debug!(%program, "Creating new InvocationBuilder");
        Self {
            program: program.to_string(),
            args: vec![],
            base_env: None,
            extra_env: BTreeMap::new(),
        }
    }

    /// Starts from a launcher prefix such as `["uv", "run", "--", ...]`.
    pub fn from_launcher<S: AsRef<str>>(launcher: &[S]) -> Result<Self> {
        let (program, rest) = launcher.split_first().ok_or(Error::EmptyLauncher)?;
        let rest: Vec<&str> = rest.iter().map(AsRef::as_ref).collect();
        Ok(Self::new(program.as_ref()).args(rest))
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        tracing::trace!(?arg, "Adding argument to InvocationBuilder");
        self.args.push(arg.to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        tracing::trace!(?args, "Adding multiple arguments to InvocationBuilder");
        self.args.extend(args);
        self
    }

    /// Adds one environment override.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        tracing::trace!(%key, "Adding environment override to InvocationBuilder");
        self.extra_env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
        tracing::trace!(
            count = vars.len(),
            "Adding environment overrides to InvocationBuilder"
        );
        self.extra_env
            .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Replaces the base environment instead of copying the current process's.
    pub fn base_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.base_env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn build(self) -> Invocation {
        let env = match self.base_env {
            Some(base) => merge_env(base, &self.extra_env),
            None => merge_env(std::env::vars_os(), &self.extra_env),
        };
        tracing::debug!(
            program = %self.program,
            args = ?self.args,
            env_len = env.len(),
            "Built invocation"
        );
        Invocation {
            program: self.program,
            args: self.args,
            extra_env: self.extra_env,
            env,
        }
    }
}
