#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::looper;
    use crate::scope::*;
    use crate::signal::*;
    use crate::*;

    /// Echoes its parameter, or fails with the given error kind.
    struct Echo;

    impl UseCase for Echo {
        type Params = Result<u32, fn() -> UseCaseError>;
        type Output = u32;

        fn execute(&self, params: Self::Params) -> Result<u32, UseCaseError> {
            params.map_err(|make| make())
        }
    }

    struct Explode;

    impl UseCase for Explode {
        type Params = ();
        type Output = u32;

        fn execute(&self, _: ()) -> Result<u32, UseCaseError> {
            panic!("bad state")
        }
    }

    fn record(channel: &ResultChannel<u32>) -> Rc<RefCell<Vec<ResultState<u32>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        // the subscription outlives the test body on purpose
        let _ = channel.observe(move |s| sink.borrow_mut().push(s.clone()));
        log
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let called = Rc::new(RefCell::new(false));

        let called_clone = called.clone();
        let id = sig.subscribe(move |_| {
            *called_clone.borrow_mut() = true;
        });

        sig.set(42);
        assert!(*called.borrow());

        *called.borrow_mut() = false;
        assert!(sig.unsubscribe(id));
        sig.set(7);
        assert!(!*called.borrow());
        assert!(!sig.unsubscribe(id));
    }

    #[test]
    fn test_signal_reentrant_publish_reaches_everyone_in_order() {
        let sig = signal(0);
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));

        let s2 = sig.clone();
        let sink = first.clone();
        sig.subscribe(move |v| {
            sink.borrow_mut().push(*v);
            if *v == 1 {
                s2.set(2);
            }
        });
        let sink = second.clone();
        sig.subscribe(move |v| sink.borrow_mut().push(*v));

        sig.set(1);
        assert_eq!(*first.borrow(), vec![1, 2]);
        assert_eq!(*second.borrow(), vec![1, 2]);
        assert_eq!(sig.get(), 2);
    }

    #[test]
    fn test_signal_keeps_notifying_after_a_subscriber_panics() {
        let sig = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        sig.subscribe(|v| assert_ne!(*v, 1, "one is rejected"));
        let sink = seen.clone();
        sig.subscribe(move |v| sink.borrow_mut().push(*v));

        let s = sig.clone();
        assert!(std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| s.set(1))).is_err());
        sig.set(2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let cleaned_up = Rc::new(RefCell::new(false));

        let scope = Scope::new();
        let cleaned_up_clone = cleaned_up.clone();
        scope.add_disposer(move || {
            *cleaned_up_clone.borrow_mut() = true;
        });

        assert!(!*cleaned_up.borrow());
        scope.dispose();
        assert!(*cleaned_up.borrow());
        assert!(scope.is_disposed());
    }

    #[test]
    fn test_scope_children_dispose_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let parent = Scope::new();
        let child = parent.child();

        let o = order.clone();
        parent.add_disposer(move || o.borrow_mut().push("parent"));
        let o = order.clone();
        child.add_disposer(move || o.borrow_mut().push("child"));

        parent.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
    }

    #[test]
    fn test_scope_drop_runs_disposers() {
        let cleaned_up = Rc::new(RefCell::new(false));
        {
            let scope = Scope::new();
            let c = cleaned_up.clone();
            scope.add_disposer(move || *c.borrow_mut() = true);
        }
        assert!(*cleaned_up.borrow());
    }

    #[test]
    fn test_effect_registers_in_current_scope() {
        let ran = Rc::new(RefCell::new(0));
        let scope = Scope::new();
        let r = ran.clone();
        let d = scope.run(|| effect(move || on_dispose(move || *r.borrow_mut() += 1)));
        scope.dispose();
        assert_eq!(*ran.borrow(), 1);
        d.run();
        assert_eq!(*ran.borrow(), 1);
    }

    #[test]
    fn test_scope_run_restores_outer_scope_after_panic() {
        let outer = Scope::new();
        let inner = Scope::new();
        outer.run(|| {
            let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                inner.run(|| panic!("screen factory failed"))
            }));
            assert!(caught.is_err());
            let current = current_scope().expect("outer scope reinstalled");
            let ran = Rc::new(RefCell::new(false));
            let r = ran.clone();
            current.add_disposer(move || *r.borrow_mut() = true);
            outer.dispose();
            assert!(*ran.borrow());
        });
        assert!(current_scope().is_none());
    }

    #[test]
    fn invocation_publishes_loading_then_one_terminal() {
        let channel = ResultChannel::new("echo", Arc::new(Inline));
        let log = record(&channel);

        channel.invoke(Arc::new(Echo), Ok(5));
        assert_eq!(*log.borrow(), vec![ResultState::Loading]);

        looper::pump();
        assert_eq!(
            *log.borrow(),
            vec![ResultState::Loading, ResultState::Success(5)]
        );
        assert_eq!(looper::pump(), 0);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn failures_are_classified_before_publishing() {
        let channel = ResultChannel::new("echo", Arc::new(Inline));

        channel.invoke(Arc::new(Echo), Err(|| UseCaseError::Timeout));
        looper::pump();
        assert_eq!(
            channel.state(),
            Some(ResultState::Error(Failure::ConnectionFailure))
        );

        channel.invoke(Arc::new(Echo), Err(|| UseCaseError::Status(503)));
        looper::pump();
        assert_eq!(
            channel.state(),
            Some(ResultState::Error(Failure::UnexpectedFailure))
        );
    }

    #[test]
    fn panicking_use_case_is_an_unexpected_failure() {
        let channel = ResultChannel::new("explode", Arc::new(Inline));
        channel.invoke(Arc::new(Explode), ());
        looper::pump();
        assert_eq!(
            channel.state(),
            Some(ResultState::Error(Failure::UnexpectedFailure))
        );
    }

    #[test]
    fn no_response_stays_loading() {
        let exec = ManualExecutor::new();
        let channel = ResultChannel::new("echo", exec.clone());
        channel.invoke(Arc::new(Echo), Ok(1));
        looper::pump();
        assert!(channel.is_loading());
        assert_eq!(exec.pending(), 1);
    }

    #[test]
    fn last_started_invocation_wins_even_if_it_completes_first() {
        let exec = ManualExecutor::new();
        let channel = ResultChannel::new("echo", exec.clone());
        let log = record(&channel);

        channel.invoke(Arc::new(Echo), Ok(1));
        channel.invoke(Arc::new(Echo), Ok(2));
        assert_eq!(channel.latest_seq(), 2);

        // newer finishes first, the older one finishes afterwards
        exec.run_last();
        looper::pump();
        exec.run_next();
        looper::pump();

        assert_eq!(
            *log.borrow(),
            vec![
                ResultState::Loading,
                ResultState::Loading,
                ResultState::Success(2),
            ]
        );
        assert_eq!(channel.state(), Some(ResultState::Success(2)));
    }

    #[test]
    fn stale_result_already_queued_is_discarded() {
        let exec = ManualExecutor::new();
        let channel = ResultChannel::new("echo", exec.clone());

        channel.invoke(Arc::new(Echo), Ok(1));
        // the first job completes but its result has not been pumped yet
        exec.run_next();
        channel.invoke(Arc::new(Echo), Ok(2));
        assert_eq!(looper::pump(), 0);
        assert!(channel.is_loading());

        exec.run_next();
        looper::pump();
        assert_eq!(channel.state(), Some(ResultState::Success(2)));
    }

    #[test]
    fn observer_reinvoking_on_success_does_not_hide_states_from_others() {
        let channel = ResultChannel::new("echo", Arc::new(Inline));
        let again = channel.clone();
        let _retry = channel.observe(move |s| {
            if *s == ResultState::Success(1) {
                again.invoke(Arc::new(Echo), Ok(2));
            }
        });
        let log = record(&channel);

        channel.invoke(Arc::new(Echo), Ok(1));
        looper::pump();
        assert_eq!(
            *log.borrow(),
            vec![
                ResultState::Loading,
                ResultState::Success(1),
                ResultState::Loading,
                ResultState::Success(2),
            ]
        );
    }

    #[test]
    fn reinvoking_while_loading_never_flickers_to_terminal() {
        let exec = ManualExecutor::new();
        let channel = ResultChannel::new("echo", exec.clone());
        let log = record(&channel);

        channel.invoke(Arc::new(Echo), Ok(1));
        channel.invoke(Arc::new(Echo), Ok(2));
        channel.invoke(Arc::new(Echo), Ok(3));
        exec.run_all();
        looper::pump();

        let states = log.borrow();
        let terminals: Vec<_> = states.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminals, vec![&ResultState::Success(3)]);
        assert!(states[..3].iter().all(ResultState::is_loading));
    }

    #[test]
    fn superseded_jobs_that_have_not_started_are_skipped() {
        let hits = Arc::new(AtomicUsize::new(0));

        struct Count(Arc<AtomicUsize>);
        impl UseCase for Count {
            type Params = ();
            type Output = usize;
            fn execute(&self, _: ()) -> Result<usize, UseCaseError> {
                Ok(self.0.fetch_add(1, Ordering::SeqCst) + 1)
            }
        }

        let exec = ManualExecutor::new();
        let channel = ResultChannel::new("count", exec.clone());
        let uc = Arc::new(Count(hits.clone()));
        channel.invoke(uc.clone(), ());
        channel.invoke(uc.clone(), ());
        channel.invoke(uc, ());
        exec.run_all();
        looper::pump();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(channel.state(), Some(ResultState::Success(1)));
    }

    #[test]
    fn late_observer_sees_only_the_current_state() {
        let channel = ResultChannel::new("echo", Arc::new(Inline));
        channel.invoke(Arc::new(Echo), Ok(1));
        looper::pump();
        channel.invoke(Arc::new(Echo), Ok(2));
        looper::pump();

        let log = record(&channel);
        assert_eq!(*log.borrow(), vec![ResultState::Success(2)]);

        channel.invoke(Arc::new(Echo), Ok(3));
        looper::pump();
        assert_eq!(
            *log.borrow(),
            vec![
                ResultState::Success(2),
                ResultState::Loading,
                ResultState::Success(3),
            ]
        );
    }

    #[test]
    fn observer_before_any_invocation_gets_nothing() {
        let channel = ResultChannel::<u32>::new("echo", Arc::new(Inline));
        let log = record(&channel);
        assert!(log.borrow().is_empty());
        assert_eq!(channel.state(), None);
    }

    #[test]
    fn disposed_scope_stops_delivery() {
        let channel = ResultChannel::new("echo", Arc::new(Inline));
        let scope = Scope::new();
        let seen = Rc::new(RefCell::new(0));
        let s = seen.clone();
        channel.observe_in(&scope, move |_| *s.borrow_mut() += 1);

        channel.invoke(Arc::new(Echo), Ok(1));
        looper::pump();
        assert_eq!(*seen.borrow(), 2);

        scope.dispose();
        channel.invoke(Arc::new(Echo), Ok(2));
        looper::pump();
        assert_eq!(*seen.borrow(), 2);
        assert_eq!(channel.observer_count(), 0);
    }

    #[test]
    fn results_from_a_thread_pool_arrive_on_this_thread() {
        let pool = Arc::new(
            ThreadPool::new(&RuntimeConfig {
                worker_threads: 2,
                ..RuntimeConfig::default()
            })
            .unwrap(),
        );
        let channel = ResultChannel::new("echo", pool.clone());
        let ui_thread = std::thread::current().id();
        let delivered_on = Rc::new(RefCell::new(None));
        let d = delivered_on.clone();
        let _sub = channel.observe(move |s| {
            if s.is_terminal() {
                *d.borrow_mut() = Some(std::thread::current().id());
            }
        });

        channel.invoke(Arc::new(Echo), Ok(9));
        let mut spins = 0;
        while channel.is_loading() && spins < 40 {
            looper::run_until_idle(Duration::from_millis(50));
            spins += 1;
        }

        assert_eq!(channel.state(), Some(ResultState::Success(9)));
        assert_eq!(*delivered_on.borrow(), Some(ui_thread));
        pool.shutdown();
    }
}
