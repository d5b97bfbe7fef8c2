//! Application service — run a command with secrets injected.
//!
//! Secrets reach the child through environment variables, through stdin, or
//! as paths to scoped files that are deleted when the child exits. Every
//! reference is resolved before anything is written or spawned.

use std::collections::HashSet;
use std::ffi::OsString;

use anyhow::{Context, Result};
use keyhole_common::{SecretValue, validate_env_name};

use crate::application::ports::{
    ChildExit, ChildSpec, CommandRunner, SecretFileWriter, SecretSource,
};
use crate::domain::error::InjectError;

/// `VAR=REFERENCE` from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub var: String,
    pub reference: String,
}

impl Binding {
    /// Parse `VAR=REFERENCE`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no `=`, the reference is empty, or the
    /// variable name is not a valid environment variable name.
    pub fn parse(raw: &str) -> Result<Self, InjectError> {
        let (var, reference) = raw
            .split_once('=')
            .ok_or_else(|| InjectError::MalformedBinding(raw.to_string()))?;
        if reference.trim().is_empty() {
            return Err(InjectError::MalformedBinding(raw.to_string()));
        }
        validate_env_name(var).map_err(|_| InjectError::InvalidVarName(var.to_string()))?;
        Ok(Self {
            var: var.to_string(),
            reference: reference.trim().to_string(),
        })
    }
}

/// Everything `exec` needs to launch the child.
#[derive(Debug, Clone)]
pub struct InjectionPlan {
    pub env: Vec<Binding>,
    pub files: Vec<Binding>,
    pub stdin: Option<String>,
    pub program: String,
    pub args: Vec<String>,
}

impl InjectionPlan {
    /// Validate bindings and split `command` into program and args.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is bound twice or `command` is empty.
    pub fn new(
        env: Vec<Binding>,
        files: Vec<Binding>,
        stdin: Option<String>,
        command: Vec<String>,
    ) -> Result<Self, InjectError> {
        let mut seen = HashSet::new();
        for binding in env.iter().chain(files.iter()) {
            if !seen.insert(binding.var.as_str()) {
                return Err(InjectError::DuplicateVar(binding.var.clone()));
            }
        }
        let mut command = command.into_iter();
        let program = command.next().ok_or(InjectError::MissingProgram)?;
        Ok(Self {
            env,
            files,
            stdin,
            program,
            args: command.collect(),
        })
    }
}

/// Resolve every binding, materialise file bindings, then run the child.
///
/// Scoped files are removed when this returns, whether the child succeeded,
/// failed, was interrupted, or never started.
///
/// # Errors
///
/// Returns the first resolution failure (the child is not started), or an
/// error if a scoped file cannot be written or the child cannot be spawned.
pub async fn run_injected<S, W, R>(
    source: &S,
    writer: &W,
    runner: &R,
    plan: &InjectionPlan,
) -> Result<ChildExit>
where
    S: SecretSource,
    W: SecretFileWriter,
    R: CommandRunner,
{
    let mut env_secrets = Vec::with_capacity(plan.env.len());
    for binding in &plan.env {
        let secret = source.resolve(&binding.reference).await?;
        env_secrets.push((binding.var.as_str(), secret));
    }
    let mut file_secrets = Vec::with_capacity(plan.files.len());
    for binding in &plan.files {
        let secret = source.resolve(&binding.reference).await?;
        file_secrets.push((binding.var.as_str(), secret));
    }
    let stdin_secret = match &plan.stdin {
        Some(reference) => Some(source.resolve(reference).await?),
        None => None,
    };

    let mut envs = Vec::with_capacity(env_secrets.len() + file_secrets.len());
    for (var, secret) in &env_secrets {
        envs.push(((*var).to_string(), env_value(var, secret)?));
    }

    let mut guards = Vec::with_capacity(file_secrets.len());
    for (var, secret) in &file_secrets {
        let guard = writer
            .materialise(var, secret)
            .with_context(|| format!("cannot write scoped file for {var}"))?;
        envs.push(((*var).to_string(), guard.as_ref().as_os_str().to_os_string()));
        guards.push(guard);
    }
    drop(file_secrets);

    tracing::info!(
        program = %plan.program,
        env = env_secrets.len(),
        files = guards.len(),
        stdin = stdin_secret.is_some(),
        "launching with injected secrets",
    );

    let spec = ChildSpec {
        program: &plan.program,
        args: &plan.args,
        envs,
        stdin: stdin_secret.as_ref().map(SecretValue::expose),
    };
    let exit = runner.run_child(&spec).await?;
    drop(guards);
    Ok(exit)
}

fn env_value(var: &str, secret: &SecretValue) -> Result<OsString> {
    if secret.expose().contains(&0) {
        anyhow::bail!("secret for {var} contains a NUL byte and cannot be passed in the environment");
    }
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStringExt;
        Ok(OsString::from_vec(secret.expose().to_vec()))
    }
    #[cfg(not(unix))]
    {
        let text = secret
            .expose_str()
            .with_context(|| format!("secret for {var} is not valid UTF-8"))?;
        Ok(OsString::from(text))
    }
}
