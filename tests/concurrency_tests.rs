//! Thread safety of a shared desk.

use std::sync::Arc;
use std::thread;

use msgdesk::{classify_and_validate, sanitise, AbbreviationTable, Desk, DeskOptions, InMemoryGateway};

fn shared_desk() -> (Arc<InMemoryGateway>, Arc<Desk>) {
    let gateway = Arc::new(InMemoryGateway::new());
    let desk = Desk::with_gateway(gateway.clone(), DeskOptions::default()).expect("open desk");
    (gateway, Arc::new(desk))
}

#[test]
fn concurrent_tweets_count_every_tag() {
    let (gateway, desk) = shared_desk();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let desk = Arc::clone(&desk);
            thread::spawn(move || {
                for i in 0..25 {
                    let header = format!("T{:09}", t * 100 + i);
                    desk.submit(&header, &format!("@user{t}\n#deals from thread {t}"))
                        .expect("submit should succeed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(desk.snapshot_trending(), vec![("deals".to_string(), 200)]);
    assert_eq!(desk.snapshot_messages().len(), 200);

    let saved = gateway.saved();
    assert_eq!(saved.trending.count("deals"), 200);
    assert_eq!(saved.messages.len(), 200);
}

#[test]
fn concurrent_duplicates_logged_once() {
    let (_gateway, desk) = shared_desk();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let desk = Arc::clone(&desk);
            thread::spawn(move || {
                desk.submit("S123456789", "+447911123456\nSame text everywhere")
                    .expect("submit")
                    .appended
            })
        })
        .collect();

    let appended: usize = handles
        .into_iter()
        .map(|h| usize::from(h.join().expect("thread panicked")))
        .sum();

    assert_eq!(appended, 1);
    assert_eq!(desk.snapshot_messages().len(), 1);
}

#[test]
fn concurrent_sir_reports_keep_one_record_per_code() {
    let (_gateway, desk) = shared_desk();
    let natures = ["Theft", "Raid", "Cash Loss", "Bomb Threat"];

    let handles: Vec<_> = natures
        .iter()
        .enumerate()
        .map(|(i, nature)| {
            let desk = Arc::clone(&desk);
            let body = format!("jane@napier.ac.uk\nSIR 01/01/23\nSC001\n{nature}\nReport {i}");
            thread::spawn(move || {
                desk.submit(&format!("E{:09}", i), &body).expect("submit");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let sir = desk.snapshot_sir();
    assert_eq!(sir.len(), 1);
    assert_eq!(sir[0].0, "SC001");
    assert!(natures.contains(&sir[0].1.as_str()));
}

#[test]
fn sanitise_is_deterministic_across_threads() {
    let table = Arc::new(AbbreviationTable::from_pairs([("LOL", "Laughing out loud")]));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let parsed = classify_and_validate("T999999999", "@desk\nlol #deals @shop")
                    .expect("valid tweet");
                sanitise(parsed, &table)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    let first = &results[0];
    assert_eq!(first.message.body, "lol <Laughing out loud> #deals @shop");
    for (i, result) in results.iter().enumerate().skip(1) {
        assert_eq!(first, result, "thread {i} produced a different result");
    }
}
