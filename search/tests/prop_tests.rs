use proptest::prelude::*;

use onboard_search::{Resolution, SelectorState};
use onboard_types::SelectOption;

#[derive(Clone, Debug)]
enum Event {
    Type(String),
    Dispatch,
    /// Resolve the in-flight query at this index (modulo their count).
    Resolve(usize),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-c]{0,3}".prop_map(Event::Type),
        Just(Event::Dispatch),
        any::<usize>().prop_map(Event::Resolve),
    ]
}

fn answer(generation: u64) -> Vec<SelectOption> {
    vec![SelectOption::new(generation.to_string(), format!("gen {generation}"))]
}

proptest! {
    /// Whatever order answers arrive in, accepted options always come from the
    /// newest generation dispatched at the time and the counter never goes back.
    #[test]
    fn only_newest_generation_is_accepted(events in prop::collection::vec(event(), 0..60)) {
        let mut state = SelectorState::new();
        let mut in_flight: Vec<u64> = Vec::new();
        let mut newest = 0u64;
        let mut last_accepted: Option<u64> = None;

        for e in &events {
            let before = state.generation();
            match e {
                Event::Type(text) => state.set_query(text),
                Event::Dispatch => {
                    let d = state.dispatch();
                    prop_assert_eq!(d.generation, before + 1);
                    newest = d.generation;
                    in_flight.push(d.generation);
                }
                Event::Resolve(i) if !in_flight.is_empty() => {
                    let generation = in_flight.remove(i % in_flight.len());
                    let snapshot = state.clone();
                    match state.resolve(generation, answer(generation)) {
                        Resolution::Accepted => {
                            prop_assert_eq!(generation, newest);
                            prop_assert!(last_accepted < Some(generation));
                            prop_assert!(!state.is_loading());
                            last_accepted = Some(generation);
                        }
                        Resolution::Stale { current } => {
                            prop_assert_eq!(current, newest);
                            prop_assert_eq!(&state, &snapshot);
                        }
                    }
                }
                Event::Resolve(_) => {}
            }
            prop_assert!(state.generation() >= before);
            match last_accepted {
                Some(g) => {
                    prop_assert_eq!(state.options(), &answer(g)[..]);
                }
                None => {
                    prop_assert!(state.options().is_empty());
                }
            }
        }
    }
}
