use crate::tests::{ScriptedRegistry, count_matching, fast_settings, recv_until};
use crate::{ExitHook, LogSink, STOPPED_MESSAGE, ServiceState, ServiceSupervisor};

use std::sync::Arc;

use googletest::assert_that;
use googletest::prelude::eq;

fn hooked_supervisor() -> (Arc<ServiceSupervisor>, crate::LogReceiver) {
    let registry = Arc::new(ScriptedRegistry::both_running());
    let (sink, receiver) = LogSink::channel();
    let supervisor = ServiceSupervisor::new(registry, sink, fast_settings()).unwrap();
    (Arc::new(supervisor), receiver)
}

#[tokio::test]
async fn given_running_service_when_hook_runs_then_service_stopped_once() {
    // Given
    let (supervisor, mut receiver) = hooked_supervisor();
    supervisor.start();
    recv_until(&mut receiver, |lines| lines.len() >= 3).await;
    let hook = ExitHook::new(Arc::clone(&supervisor), None);

    // When
    let first = hook.run();
    let second = hook.run();

    // Then
    assert_that!(first, eq(true));
    assert_that!(second, eq(false));
    assert_that!(hook.has_run(), eq(true));
    assert_that!(supervisor.state(), eq(ServiceState::Stopped));

    let lines = receiver.drain();
    assert_that!(count_matching(&lines, STOPPED_MESSAGE), eq(1));
}

#[tokio::test]
async fn given_stopped_service_when_hook_runs_then_nothing_is_logged() {
    // Given
    let (supervisor, mut receiver) = hooked_supervisor();
    let hook = ExitHook::new(Arc::clone(&supervisor), None);

    // When
    let ran = hook.run();

    // Then
    assert_that!(ran, eq(true));
    assert_that!(receiver.drain().len(), eq(0));
}

#[tokio::test]
async fn given_unrun_hook_when_dropped_then_teardown_runs() {
    // Given
    let (supervisor, mut receiver) = hooked_supervisor();
    supervisor.start();
    let hook = ExitHook::new(Arc::clone(&supervisor), None);

    // When
    drop(hook);

    // Then
    assert_that!(supervisor.is_running(), eq(false));
    assert_that!(count_matching(&receiver.drain(), STOPPED_MESSAGE), eq(1));
}

#[tokio::test]
async fn given_hook_already_run_when_dropped_then_no_second_stop_line() {
    let (supervisor, mut receiver) = hooked_supervisor();
    supervisor.start();
    let hook = ExitHook::new(Arc::clone(&supervisor), None);

    hook.run();
    drop(hook);

    assert_that!(count_matching(&receiver.drain(), STOPPED_MESSAGE), eq(1));
}
