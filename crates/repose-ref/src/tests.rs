#[cfg(test)]
mod tests {
    use crate::*;
    use std::cell::RefCell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(&'static str, Option<&'static str>)>>>;

    fn recorder(name: &'static str, log: &Log) -> Slot<&'static str> {
        let log = log.clone();
        Slot::callback(move |v| log.borrow_mut().push((name, v)))
    }

    fn take(log: &Log) -> Vec<(&'static str, Option<&'static str>)> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_partial_change_end_to_end() {
        let log: Log = Rc::default();
        let (a, b, c) = (
            recorder("a", &log),
            recorder("b", &log),
            recorder("c", &log),
        );
        let composer = RefComposer::new();

        let notifier = composer.apply([a.clone(), b.clone()]).unwrap();
        assert!(take(&log).is_empty());
        notifier.set("x").unwrap();
        assert_eq!(take(&log), vec![("a", Some("x")), ("b", Some("x"))]);

        let notifier = composer.apply([a.clone(), c.clone()]).unwrap();
        assert_eq!(take(&log), vec![("b", None), ("c", Some("x"))]);

        notifier.set("y").unwrap();
        assert_eq!(take(&log), vec![("a", Some("y")), ("c", Some("y"))]);
    }

    #[test]
    fn test_unchanged_slots_are_untouched() {
        let log: Log = Rc::default();
        let slots: Vec<_> = ["a", "b", "c"].into_iter().map(|n| recorder(n, &log)).collect();
        let composer = RefComposer::new();

        composer.apply(slots.clone()).unwrap().set("v").unwrap();
        take(&log);

        composer.apply(slots.clone()).unwrap();
        assert!(take(&log).is_empty());

        // a fresh Rc around an equivalent closure is a different slot
        let mut next = slots.clone();
        next[1] = recorder("b", &log);
        composer.apply(next).unwrap();
        assert_eq!(take(&log), vec![("b", None), ("b", Some("v"))]);
    }

    #[test]
    fn test_all_detaches_precede_all_attaches() {
        let log: Log = Rc::default();
        let composer = RefComposer::new();

        composer
            .apply([recorder("a1", &log), recorder("b1", &log)])
            .unwrap()
            .set("v")
            .unwrap();
        take(&log);

        composer
            .apply([recorder("a2", &log), recorder("b2", &log)])
            .unwrap();
        assert_eq!(
            take(&log),
            vec![
                ("a1", None),
                ("b1", None),
                ("a2", Some("v")),
                ("b2", Some("v")),
            ]
        );
    }

    #[test]
    fn test_swapped_positions_are_independent_changes() {
        let log: Log = Rc::default();
        let (a, b) = (recorder("a", &log), recorder("b", &log));
        let composer = RefComposer::new();

        composer.apply([a.clone(), b.clone()]).unwrap().set("v").unwrap();
        take(&log);

        composer.apply([b, a]).unwrap();
        assert_eq!(
            take(&log),
            vec![("a", None), ("b", None), ("b", Some("v")), ("a", Some("v"))]
        );
    }

    #[test]
    fn test_arity_change_touches_nothing() {
        let log: Log = Rc::default();
        let (a, b) = (recorder("a", &log), recorder("b", &log));
        let composer = RefComposer::new();

        composer.apply([a.clone(), b]).unwrap().set("v").unwrap();
        take(&log);

        let err = composer.apply([a.clone()]).unwrap_err();
        assert_eq!(err, RefError::ArityMismatch { old: 2, new: 1 });
        let msg = err.to_string();
        assert!(msg.contains('2') && msg.contains('1'), "{msg}");
        assert!(take(&log).is_empty());

        // history is intact: the old list still receives values
        composer.notifier().set("w").unwrap();
        assert_eq!(take(&log), vec![("a", Some("w")), ("b", Some("w"))]);
    }

    #[test]
    fn test_first_cycle_without_value_dispatches_nothing() {
        let cell = view_ref::<&'static str>();
        let log: Log = Rc::default();
        let composer = RefComposer::new();

        composer
            .apply([recorder("a", &log), Slot::from(&cell), Slot::Empty])
            .unwrap();
        assert!(take(&log).is_empty());
        assert!(!cell.is_set());
    }

    #[test]
    fn test_fan_out_in_list_order() {
        let log: Log = Rc::default();
        let cell = view_ref::<&'static str>();
        let composer = RefComposer::new();

        let notifier = composer
            .apply([
                recorder("a", &log),
                Slot::Empty,
                Slot::from(&cell),
                recorder("b", &log),
            ])
            .unwrap();
        notifier.set("v").unwrap();
        assert_eq!(take(&log), vec![("a", Some("v")), ("b", Some("v"))]);
        assert_eq!(cell.get(), Some("v"));

        notifier.clear().unwrap();
        assert_eq!(take(&log), vec![("a", None), ("b", None)]);
        assert_eq!(cell.get(), None);
        assert_eq!(composer.current(), None);
    }

    #[test]
    fn test_invalid_slot_reported_on_notify() {
        let composer = RefComposer::<&'static str>::new();
        let notifier = composer.apply([Slot::dynamic(42i32)]).unwrap();

        let err = notifier.set("v").unwrap_err();
        assert_eq!(err, RefError::InvalidSlot { position: Some(0) });
        assert!(err.to_string().contains("not a valid ref"));
    }

    #[test]
    fn test_invalid_slot_reported_on_attach() {
        let log: Log = Rc::default();
        let composer = RefComposer::<&'static str>::new();
        composer.apply([Slot::Empty, Slot::Empty]).unwrap();
        composer.notifier().set("v").unwrap();

        let err = composer
            .apply([Slot::dynamic("not a ref"), recorder("b", &log)])
            .unwrap_err();
        assert_eq!(err, RefError::InvalidSlot { position: Some(0) });
        // the attach pass stopped before reaching b
        assert!(take(&log).is_empty());
    }

    #[test]
    fn test_failed_first_cycle_keeps_attached_slots() {
        let log: Log = Rc::default();
        let a = recorder("a", &log);
        let composer = RefComposer::<&'static str>::new();
        composer.notifier().set("v").unwrap();

        let err = composer
            .apply([a.clone(), Slot::dynamic(42i32)])
            .unwrap_err();
        assert_eq!(err, RefError::InvalidSlot { position: Some(1) });
        assert_eq!(take(&log), vec![("a", Some("v"))]);
        assert_eq!(composer.arity(), Some(2));

        // a is already attached, the rejected position counts as empty
        composer.apply([a.clone(), Slot::Empty]).unwrap();
        assert!(take(&log).is_empty());

        composer.notifier().set("w").unwrap();
        assert_eq!(take(&log), vec![("a", Some("w"))]);
    }

    #[test]
    fn test_replacing_with_empty_only_detaches() {
        let log: Log = Rc::default();
        let composer = RefComposer::new();

        composer.apply([recorder("a", &log)]).unwrap().set("v").unwrap();
        take(&log);

        let notifier = composer.apply([Slot::Empty]).unwrap();
        assert_eq!(take(&log), vec![("a", None)]);

        notifier.set("w").unwrap();
        assert!(take(&log).is_empty());
        assert_eq!(composer.current(), Some("w"));
    }

    #[test]
    fn test_panicking_callback_aborts_fan_out() {
        let log: Log = Rc::default();
        let composer = RefComposer::new();
        let notifier = composer
            .apply([
                recorder("a", &log),
                Slot::callback(|_| panic!("host bug")),
                recorder("c", &log),
            ])
            .unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| notifier.set("v")));
        assert!(result.is_err());
        assert_eq!(take(&log), vec![("a", Some("v"))]);
        assert_eq!(composer.current(), Some("v"));
    }

    #[test]
    fn test_shared_composer_keeps_history_across_consumers() {
        reset_shared_ref_composer::<u32>();
        let first = view_ref::<u32>();
        let second = view_ref::<u32>();

        shared_ref_composer::<u32>()
            .apply([Slot::from(&first)])
            .unwrap()
            .set(1)
            .unwrap();

        // next consumer on the same composer diffs against the first one
        shared_ref_composer::<u32>()
            .apply([Slot::from(&second)])
            .unwrap();
        assert_eq!(first.get(), None);
        assert_eq!(second.get(), Some(1));

        assert_eq!(
            shared_ref_composer::<u32>().notifier(),
            shared_ref_composer::<u32>().notifier()
        );
        assert_eq!(shared_ref_composer::<u64>().arity(), None);

        reset_shared_ref_composer::<u32>();
        assert_eq!(shared_ref_composer::<u32>().arity(), None);
    }

    #[test]
    fn test_remembered_composer_survives_recomposition() {
        COMPOSER.with(|c| *c.borrow_mut() = Composer::default());
        let a = view_ref::<u64>();
        let b = view_ref::<u64>();

        let view = |slot: &ViewRef<u64>| {
            let composer = remember_ref_composer::<u64>();
            compose_refs!(composer, slot).unwrap()
        };

        let n1 = compose(|| view(&a));
        n1.set(3).unwrap();
        let n2 = compose(|| view(&b));

        assert_eq!(n1, n2);
        assert_eq!(a.get(), None);
        assert_eq!(b.get(), Some(3));
    }

    #[test]
    fn test_unreached_slots_are_released() {
        COMPOSER.with(|c| *c.borrow_mut() = Composer::default());

        let first = compose(|| remember_ref_composer::<u64>().notifier());
        compose(|| ());
        let second = compose(|| remember_ref_composer::<u64>().notifier());
        assert_ne!(first, second);
    }

    #[test]
    fn test_key_based_remember() {
        COMPOSER.with(|c| c.borrow_mut().keyed_slots.clear());

        let val1 = remember_with_key("test", || 42);
        let val2 = remember_with_key("test", || 100);

        // Should return the same instance
        assert_eq!(*val1, 42);
        assert_eq!(*val2, 42); // Not 100, because key exists

        let c1 = remember_ref_composer_with_key::<u64>("field");
        let c2 = remember_ref_composer_with_key::<u64>("field");
        assert_eq!(c1.notifier(), c2.notifier());
    }
}
