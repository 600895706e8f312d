mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::watch;

use common::{
    ControllerCall, HostMode, PanickingFactory, PanickingPriorityFactory, RecordingFactory, RecordingHost,
    UnavailableHost,
};
use priovisor::{
    Event, EventKind, PostTaskOptions, ScheduleError, Session, SessionConfig, Subscribe, TaskError,
    TaskFn, TaskPriority, TaskRef, TaskSignal, Visibility,
};

use TaskPriority::{Background as BG, UserBlocking as UB, UserVisible as UV};

fn value(i: usize) -> TaskRef<usize> {
    TaskFn::arc(format!("task-{i}"), move || async move { Ok::<_, TaskError>(i) })
}

fn session(host: Arc<RecordingHost>, factory: Arc<RecordingFactory>) -> Session {
    Session::builder(SessionConfig::default())
        .with_host(host)
        .with_controllers(factory)
        .build()
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[tokio::test]
async fn host_absent_runs_task_directly() {
    let session = Session::builder(SessionConfig::default()).without_host().build();
    assert_eq!(session.post_task(value(7), PostTaskOptions::new()).await, Ok(Some(7)));

    let failing: TaskRef<()> = TaskFn::arc("failing", || async { Err::<(), _>(TaskError::fail("boom")) });
    assert_eq!(
        session.post_task(failing, PostTaskOptions::new()).await,
        Err(ScheduleError::Task(TaskError::fail("boom")))
    );
    assert_eq!(session.controller_count(), 0);
}

#[tokio::test]
async fn unavailable_host_runs_task_directly() {
    let factory = RecordingFactory::new();
    let session = Session::builder(SessionConfig::default())
        .with_host(Arc::new(UnavailableHost))
        .with_controllers(factory.clone())
        .build();

    let opts = PostTaskOptions::new().with_priority(BG);
    assert_eq!(session.post_task(value(3), opts).await, Ok(Some(3)));
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn one_controller_per_class_is_reused() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory.clone());

    for i in 0..3 {
        let opts = PostTaskOptions::new().with_priority(UV);
        assert_eq!(session.post_task(value(i), opts).await, Ok(Some(i)));
    }

    assert_eq!(factory.created(), vec![UV]);
    let subs = host.submissions();
    assert_eq!(subs.len(), 3);
    assert!(subs.iter().all(|s| s.signal_priority == Some(UV)));
}

#[tokio::test]
async fn eight_mixed_submissions_have_documented_shape() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory.clone());

    let options = vec![
        PostTaskOptions::new().with_priority(UB),
        PostTaskOptions::new().with_priority(UV),
        PostTaskOptions::new().with_priority(BG),
        PostTaskOptions::new().with_priority(UB).detached(),
        PostTaskOptions::new().with_priority(UV).detached(),
        PostTaskOptions::new().with_priority(BG).detached(),
        PostTaskOptions::new(),
        PostTaskOptions::new().with_delay(Duration::from_millis(100)),
    ];
    let futures = options
        .into_iter()
        .enumerate()
        .map(|(i, opts)| session.post_task(value(i), opts));
    let results = join_all(futures).await;

    assert_eq!(results, (0..8).map(|i| Ok(Some(i))).collect::<Vec<_>>());
    assert_eq!(factory.created(), vec![UB, UV, BG]);

    let subs = host.submissions();
    assert_eq!(subs.len(), 8);
    for (sub, class) in subs[..3].iter().zip([UB, UV, BG]) {
        assert_eq!(sub.signal_priority, Some(class));
        assert_eq!(sub.priority, None);
    }
    for (sub, class) in subs[3..6].iter().zip([UB, UV, BG]) {
        assert!(sub.signal.is_none());
        assert_eq!(sub.priority, Some(class));
    }
    assert_eq!(subs[6].signal_priority, Some(UB));
    assert!(subs[6].extra.is_empty());
    assert_eq!(subs[7].signal_priority, Some(UB));
    assert_eq!(subs[7].extra["delay"], 100);

    factory.clear();
    assert_eq!(session.teardown(), 3);
    assert_eq!(
        factory.calls(),
        vec![ControllerCall::Abort(UB), ControllerCall::Abort(UV), ControllerCall::Abort(BG)]
    );
}

#[tokio::test]
async fn teardown_twice_aborts_each_controller_once() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host, factory.clone());

    for class in [UB, BG] {
        let opts = PostTaskOptions::new().with_priority(class);
        session.post_task(value(0), opts).await.unwrap();
    }

    assert_eq!(session.teardown(), 2);
    assert_eq!(session.teardown(), 0);
    assert_eq!(factory.aborts(), vec![UB, BG]);
    assert!(factory.set_priorities().is_empty());
}

#[tokio::test]
async fn visibility_demotes_then_restores_in_creation_order() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host, factory.clone());
    let visibility = session.visibility().unwrap();

    for class in [UB, BG, UV] {
        let opts = PostTaskOptions::new().with_priority(class);
        session.post_task(value(0), opts).await.unwrap();
    }
    assert!(factory.set_priorities().is_empty());

    visibility.observe(false);
    assert_eq!(factory.set_priorities(), vec![BG, BG, BG]);
    assert_eq!(session.effective_priorities(), vec![(UB, BG), (BG, BG), (UV, BG)]);

    factory.clear();
    visibility.observe(true);
    assert_eq!(factory.set_priorities(), vec![UB, BG, UV]);

    factory.clear();
    session.teardown();
    assert_eq!(factory.aborts(), vec![UB, BG, UV]);
    assert!(factory.set_priorities().is_empty());
}

#[tokio::test]
async fn controllers_created_while_hidden_start_demoted() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory.clone());
    let visibility = session.visibility().unwrap();

    visibility.observe(false);
    let opts = PostTaskOptions::new().with_priority(UV);
    session.post_task(value(1), opts).await.unwrap();

    assert_eq!(factory.created(), vec![BG]);
    assert_eq!(host.submissions()[0].signal_priority, Some(BG));

    visibility.observe(true);
    assert_eq!(factory.set_priorities(), vec![UV]);
    assert_eq!(session.effective_priorities(), vec![(UV, UV)]);
}

#[tokio::test]
async fn detached_submissions_ignore_visibility() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory.clone());
    session.visibility().unwrap().observe(false);

    let opts = PostTaskOptions::new().with_priority(UB).detached();
    session.post_task(value(1), opts).await.unwrap();

    assert!(factory.calls().is_empty());
    assert_eq!(host.submissions()[0].priority, Some(UB));
}

#[tokio::test]
async fn external_visibility_applies_before_next_submission() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let (tx, rx) = watch::channel(Visibility::UNKNOWN);
    let session = Session::builder(SessionConfig::default())
        .with_host(host.clone())
        .with_controllers(factory.clone())
        .with_visibility(rx)
        .build();
    assert!(session.visibility().is_none());

    let opts = PostTaskOptions::new().with_priority(UB);
    session.post_task(value(0), opts.clone()).await.unwrap();
    tx.send_replace(Visibility::observed(false));
    session.post_task(value(1), opts).await.unwrap();

    assert_eq!(factory.set_priorities(), vec![BG]);
    let subs = host.submissions();
    assert_eq!(subs[0].signal_priority, Some(UB));
    assert_eq!(subs[1].signal_priority, Some(BG));
    assert_eq!(subs[0].signal.as_ref().map(TaskSignal::priority), Some(BG));
}

#[tokio::test]
async fn invalid_priority_falls_back_to_session_default() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = Session::builder(SessionConfig::with_default_priority(UV))
        .with_host(host.clone())
        .with_controllers(factory.clone())
        .build();
    let mut rx = session.subscribe();

    let opts = PostTaskOptions::new().with_priority("not-a-priority");
    assert_eq!(session.post_task(value(5), opts).await, Ok(Some(5)));

    assert_eq!(factory.created(), vec![UV]);
    assert_eq!(host.submissions()[0].signal_priority, Some(UV));

    let normalized = drain(&mut rx)
        .into_iter()
        .find(|e| e.kind == EventKind::PriorityNormalized)
        .unwrap();
    assert_eq!(normalized.priority, Some(UV));
    assert!(normalized.reason.unwrap().contains("not-a-priority"));
}

#[tokio::test]
async fn teardown_suppresses_aborts_unless_requested() {
    let host = RecordingHost::new(HostMode::HoldUntilAborted);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory);
    let mut rx = session.subscribe();

    let quiet = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .post_task(value(1), PostTaskOptions::new().with_priority(UV))
                .await
        })
    };
    let strict = {
        let session = session.clone();
        tokio::spawn(async move {
            let opts = PostTaskOptions::new().with_priority(UV).throw_on_abort();
            session.post_task(value(2), opts).await
        })
    };
    while host.submissions().len() < 2 {
        tokio::task::yield_now().await;
    }

    assert_eq!(session.teardown(), 1);
    assert_eq!(quiet.await.unwrap(), Ok(None));
    let err = strict.await.unwrap().unwrap_err();
    assert!(err.is_abort());
    assert_eq!(
        err,
        ScheduleError::Aborted {
            reason: Arc::from("signal is aborted without reason")
        }
    );

    let suppressed = drain(&mut rx)
        .into_iter()
        .filter(|e| e.kind == EventKind::AbortSuppressed)
        .count();
    assert_eq!(suppressed, 1);
}

#[tokio::test]
async fn sync_host_failure_falls_back_to_direct_run() {
    let host = RecordingHost::new(HostMode::Reject);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory);
    let mut rx = session.subscribe();

    assert_eq!(session.post_task(value(9), PostTaskOptions::new()).await, Ok(Some(9)));
    assert_eq!(host.submissions().len(), 1);

    let failed = drain(&mut rx)
        .into_iter()
        .find(|e| e.kind == EventKind::SchedulingFailed)
        .unwrap();
    assert!(failed.reason.unwrap().contains("host refused"));
}

#[tokio::test]
async fn factory_panic_falls_back_to_direct_run() {
    let host = RecordingHost::new(HostMode::Run);
    let session = Session::builder(SessionConfig::default())
        .with_host(host.clone())
        .with_controllers(Arc::new(PanickingFactory))
        .build();

    assert_eq!(session.post_task(value(4), PostTaskOptions::new()).await, Ok(Some(4)));
    assert!(host.submissions().is_empty());
    assert_eq!(session.controller_count(), 0);
}

#[tokio::test]
async fn reprioritize_panic_falls_back_to_direct_run() {
    let host = RecordingHost::new(HostMode::Run);
    let (tx, rx) = watch::channel(Visibility::UNKNOWN);
    let session = Session::builder(SessionConfig::default())
        .with_host(host.clone())
        .with_controllers(Arc::new(PanickingPriorityFactory))
        .with_visibility(rx)
        .build();
    let mut events = session.subscribe();

    session.post_task(value(0), PostTaskOptions::new()).await.unwrap();
    tx.send_replace(Visibility::observed(false));
    assert_eq!(session.post_task(value(1), PostTaskOptions::new()).await, Ok(Some(1)));
    assert_eq!(host.submissions().len(), 1);

    let failed = drain(&mut events)
        .into_iter()
        .find(|e| e.kind == EventKind::SchedulingFailed)
        .unwrap();
    assert_eq!(failed.reason.as_deref(), Some("set_priority exploded"));

    assert_eq!(session.post_task(value(2), PostTaskOptions::new()).await, Ok(Some(2)));
    assert_eq!(host.submissions().len(), 2);
    assert_eq!(session.teardown(), 1);
}

#[tokio::test]
async fn task_failure_propagates_through_host() {
    let host = RecordingHost::new(HostMode::Run);
    let session = session(host, RecordingFactory::new());

    let failing: TaskRef<()> = TaskFn::arc("failing", || async { Err::<(), _>(TaskError::fail("boom")) });
    let res = session.post_task(failing, PostTaskOptions::new()).await;
    assert_eq!(res, Err(ScheduleError::Task(TaskError::fail("boom"))));
}

#[tokio::test]
async fn submissions_after_teardown() {
    let host = RecordingHost::new(HostMode::Run);
    let factory = RecordingFactory::new();
    let session = session(host.clone(), factory.clone());
    session.teardown();

    assert_eq!(session.post_task(value(1), PostTaskOptions::new()).await, Ok(None));
    assert!(matches!(
        session
            .post_task(value(2), PostTaskOptions::new().throw_on_abort())
            .await,
        Err(ScheduleError::Aborted { .. })
    ));
    assert_eq!(
        session
            .post_task(value(3), PostTaskOptions::new().detached())
            .await,
        Ok(Some(3))
    );
    assert!(factory.calls().is_empty());
    assert_eq!(host.submissions().len(), 1);
}

#[tokio::test]
async fn detached_tasks_survive_teardown_on_tokio_host() {
    let session = Session::new(SessionConfig::default());
    let delayed = || PostTaskOptions::new().with_delay(Duration::from_millis(50));

    let attached = {
        let session = session.clone();
        tokio::spawn(async move { session.post_task(value(1), delayed()).await })
    };
    let detached = {
        let session = session.clone();
        tokio::spawn(async move { session.post_task(value(2), delayed().detached()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(session.teardown(), 1);
    assert_eq!(attached.await.unwrap(), Ok(None));
    assert_eq!(detached.await.unwrap(), Ok(Some(2)));
}

#[derive(Default)]
struct Collect(Mutex<Vec<EventKind>>);

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().unwrap().push(ev.kind);
    }
}

#[tokio::test]
async fn subscribers_receive_events_until_teardown() {
    let collect = Arc::new(Collect::default());
    let session = Session::builder(SessionConfig::default())
        .with_host(RecordingHost::new(HostMode::Run))
        .with_subscribers(vec![collect.clone() as Arc<dyn Subscribe>])
        .build();

    session.post_task(value(0), PostTaskOptions::new()).await.unwrap();
    session.teardown();

    for _ in 0..100 {
        if collect.0.lock().unwrap().contains(&EventKind::SessionClosed) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        *collect.0.lock().unwrap(),
        vec![
            EventKind::ControllerCreated,
            EventKind::TaskSubmitted,
            EventKind::ControllerAborted,
            EventKind::SessionClosed,
        ]
    );
}
