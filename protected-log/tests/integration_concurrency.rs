//! One filter shared by many producer threads.

use std::{
    sync::{Arc, Mutex},
    thread,
};

use protected_log::{
    FinancialMessage, IsoMessage, LogEvent, RedactionFilter, SimpleConfiguration,
    WIPED_PLACEHOLDER,
};

const THREADS: usize = 8;
const EVENTS_PER_THREAD: usize = 200;

fn shared_filter() -> Arc<RedactionFilter> {
    let cfg = SimpleConfiguration::new()
        .with("protect", "2 48")
        .with("wipe", "35 52");
    Arc::new(RedactionFilter::from_configuration(&cfg).unwrap())
}

fn message_for(thread: usize, n: usize) -> IsoMessage {
    IsoMessage::new("0200")
        .with_field(2, format!("4{thread:03}{n:012}"))
        .with_field(11, format!("{n:06}"))
        .with_field(35, format!("4{thread:03}{n:012}=2512"))
        .with_field(41, format!("TERM{thread:04}"))
}

#[test]
fn concurrent_events_do_not_interfere() {
    let filter = shared_filter();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let filter = Arc::clone(&filter);
            scope.spawn(move || {
                for n in 0..EVENTS_PER_THREAD {
                    let mut event = LogEvent::new(format!("producer-{t}"), "send");
                    event.add_message(message_for(t, n));
                    filter.process(&mut event);

                    let msg = event.messages().next().unwrap();
                    assert_eq!(msg.get_field(2).unwrap(), "_".repeat(16));
                    assert_eq!(msg.get_field(35).unwrap(), WIPED_PLACEHOLDER);
                    // Unlisted fields carry this thread's own values.
                    assert_eq!(msg.get_field(11).unwrap(), format!("{n:06}"));
                    assert_eq!(msg.get_field(41).unwrap(), format!("TERM{t:04}"));
                    assert!(event.errors().is_empty());
                }
            });
        }
    });
}

#[test]
fn producers_keep_their_cleartext_while_others_log() {
    let filter = shared_filter();
    let originals: Vec<Arc<dyn FinancialMessage>> = (0..THREADS)
        .map(|t| Arc::new(message_for(t, 1)) as Arc<dyn FinancialMessage>)
        .collect();

    thread::scope(|scope| {
        for original in &originals {
            let filter = Arc::clone(&filter);
            scope.spawn(move || {
                for _ in 0..EVENTS_PER_THREAD {
                    let mut event = LogEvent::new("producer", "send");
                    event.push(Arc::clone(original));
                    filter.process(&mut event);
                }
            });
        }
    });

    for (t, original) in originals.iter().enumerate() {
        assert_eq!(
            original.get_field(2).unwrap(),
            format!("4{t:03}{:012}", 1)
        );
    }
}

#[test]
fn shared_event_processed_from_many_threads_stays_consistent() {
    let filter = shared_filter();
    let mut event = LogEvent::new("channel", "send");
    for n in 0..16 {
        event.add_text(format!("line {n}"));
        event.add_message(message_for(0, n));
    }
    let event = Mutex::new(event);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let filter = Arc::clone(&filter);
            let event = &event;
            scope.spawn(move || filter.process_shared(event));
        }
    });

    let event = event.into_inner().unwrap();
    assert_eq!(event.payload().len(), 32);
    for msg in event.messages() {
        assert_eq!(msg.get_field(2).unwrap(), "_".repeat(16));
        assert_eq!(msg.get_field(35).unwrap(), WIPED_PLACEHOLDER);
    }
    assert!(event.errors().is_empty());
}

#[test]
fn filter_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RedactionFilter>();
    assert_send_sync::<LogEvent>();
}
