//! Tests for the `inject` application service.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::ffi::OsString;

use keyhole_cli::application::ports::ChildExit;
use keyhole_cli::application::services::inject::{Binding, InjectionPlan, run_injected};
use keyhole_cli::domain::error::ResolveError;

use crate::mocks::{RecordingWriter, ScriptedRunner, TableSource};

fn binding(raw: &str) -> Binding {
    Binding::parse(raw).expect("valid binding")
}

fn plan(env: &[&str], files: &[&str], stdin: Option<&str>, command: &[&str]) -> InjectionPlan {
    InjectionPlan::new(
        env.iter().map(|b| binding(b)).collect(),
        files.iter().map(|b| binding(b)).collect(),
        stdin.map(ToString::to_string),
        command.iter().map(ToString::to_string).collect(),
    )
    .expect("valid plan")
}

#[tokio::test]
async fn test_env_bindings_reach_the_child() {
    let source = TableSource::default().with("pass:work/ado", "pat-123");
    let runner = ScriptedRunner::new(vec![]);
    let writer = RecordingWriter::default();

    let exit = run_injected(
        &source,
        &writer,
        &runner,
        &plan(&["AZURE_DEVOPS_EXT_PAT=pass:work/ado"], &[], None, &["az", "devops", "login"]),
    )
    .await
    .unwrap();

    assert!(matches!(exit, ChildExit::Exited(s) if s.success()));
    let children = runner.children.lock().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].program, "az");
    assert_eq!(children[0].args, vec!["devops", "login"]);
    assert_eq!(
        children[0].envs,
        vec![("AZURE_DEVOPS_EXT_PAT".to_string(), OsString::from("pat-123"))]
    );
    assert!(children[0].stdin.is_none());
}

#[tokio::test]
async fn test_file_bindings_export_path_and_clean_up() {
    let source = TableSource::default().with("file:~/.kube/conf", "apiVersion: v1");
    let runner = ScriptedRunner::new(vec![]);
    let writer = RecordingWriter::default();

    run_injected(
        &source,
        &writer,
        &runner,
        &plan(&[], &["KUBECONFIG=file:~/.kube/conf"], None, &["kubectl", "get", "pods"]),
    )
    .await
    .unwrap();

    let written = writer.written.lock().unwrap();
    assert_eq!(written.as_slice(), &[("KUBECONFIG".to_string(), b"apiVersion: v1".to_vec())]);
    let children = runner.children.lock().unwrap();
    assert_eq!(
        children[0].envs,
        vec![("KUBECONFIG".to_string(), OsString::from("/run/keyhole-test/kubeconfig"))]
    );
    assert_eq!(writer.dropped.lock().unwrap().len(), 1, "scoped file removed after exit");
}

#[tokio::test]
async fn test_stdin_secret_is_piped() {
    let source = TableSource::default().with("env:DB_PASSWORD", "hunter2");
    let runner = ScriptedRunner::new(vec![]);

    run_injected(
        &source,
        &RecordingWriter::default(),
        &runner,
        &plan(&[], &[], Some("env:DB_PASSWORD"), &["psql"]),
    )
    .await
    .unwrap();

    let children = runner.children.lock().unwrap();
    assert_eq!(children[0].stdin.as_deref(), Some(&b"hunter2"[..]));
    assert!(children[0].envs.is_empty());
}

#[tokio::test]
async fn test_failed_resolution_starts_nothing() {
    let source = TableSource::default().with("env:A", "a");
    let runner = ScriptedRunner::new(vec![]);
    let writer = RecordingWriter::default();

    let err = run_injected(
        &source,
        &writer,
        &runner,
        &plan(&["A=env:A"], &["B=env:MISSING"], None, &["true"]),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ResolveError>(),
        Some(ResolveError::NotFound { .. })
    ));
    assert!(runner.children.lock().unwrap().is_empty());
    assert!(writer.written.lock().unwrap().is_empty(), "nothing written before all resolve");
}

#[tokio::test]
async fn test_interrupted_child_still_cleans_up() {
    let source = TableSource::default().with("env:T", "t");
    let runner = ScriptedRunner::new(vec![]).with_child_exit(ChildExit::Interrupted);
    let writer = RecordingWriter::default();

    let exit = run_injected(&source, &writer, &runner, &plan(&[], &["T=env:T"], None, &["sleep", "60"]))
        .await
        .unwrap();

    assert_eq!(exit, ChildExit::Interrupted);
    assert_eq!(writer.dropped.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_each_reference_resolved_once_in_order() {
    let source = TableSource::default()
        .with("env:A", "a")
        .with("env:B", "b")
        .with("env:C", "c");
    run_injected(
        &source,
        &RecordingWriter::default(),
        &ScriptedRunner::new(vec![]),
        &plan(&["A=env:A"], &["B=env:B"], Some("env:C"), &["true"]),
    )
    .await
    .unwrap();
    assert_eq!(*source.resolved.lock().unwrap(), vec!["env:A", "env:B", "env:C"]);
}
