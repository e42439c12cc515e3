//! Property tests: random operation sequences against a reference model.
//!
//! After every step the list must satisfy its structural invariants, agree
//! with the model on the set of live records, and leave state untouched on
//! failure.

use proptest::prelude::*;
use std::collections::BTreeMap;
use todoslot_core::{TodoList, TodoListError, MAX_CONTENT_LEN, MAX_TODO_LIST_LENGTH};
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Add { key: u8, len: usize },
    MarkDone { key: u8 },
    Update { key: u8, len: usize },
    Delete { key: u8 },
}

fn arb_len() -> impl Strategy<Value = usize> {
    prop_oneof![
        8 => 0usize..=32,
        1 => Just(MAX_CONTENT_LEN),
        1 => Just(MAX_CONTENT_LEN + 1),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    // A small key space keeps duplicate ids and slot reuse frequent.
    let key = 0u8..48;
    prop_oneof![
        4 => (key.clone(), arb_len()).prop_map(|(key, len)| Op::Add { key, len }),
        1 => key.clone().prop_map(|key| Op::MarkDone { key }),
        1 => (key.clone(), arb_len()).prop_map(|(key, len)| Op::Update { key, len }),
        3 => key.prop_map(|key| Op::Delete { key }),
    ]
}

fn id_for(key: u8) -> Uuid {
    Uuid::from_u128(u128::from(key) + 1)
}

fn content(key: u8, len: usize) -> String {
    char::from(b'a' + key % 26).to_string().repeat(len)
}

proptest! {
    #[test]
    fn invariants_hold_for_random_operation_sequences(
        ops in prop::collection::vec(arb_op(), 1..200)
    ) {
        let mut list = TodoList::new(Uuid::new_v4());
        // key -> (content, completed)
        let mut model: BTreeMap<u8, (String, bool)> = BTreeMap::new();

        for op in ops {
            let before = list.clone();
            let result: Result<(), TodoListError> = match op {
                Op::Add { key, len } => {
                    let text = content(key, len);
                    let expected_err = if len > MAX_CONTENT_LEN {
                        Some("content_too_long")
                    } else if model.contains_key(&key) {
                        Some("duplicate_id")
                    } else if model.len() == MAX_TODO_LIST_LENGTH {
                        Some("capacity_exceeded")
                    } else {
                        None
                    };
                    let free_top = list.deleted_indexes().last().copied();
                    let outcome = list.add(id_for(key), text.clone());
                    match (&outcome, expected_err) {
                        (Ok(slot), None) => {
                            prop_assert_eq!(slot.reused, free_top.is_some());
                            if let Some(top) = free_top {
                                prop_assert_eq!(slot.index, usize::from(top));
                            }
                            model.insert(key, (text, false));
                        }
                        (Err(err), Some(code)) => prop_assert_eq!(err.code(), code),
                        (got, want) => prop_assert!(false, "add: got {:?}, want {:?}", got, want),
                    }
                    outcome.map(|_| ())
                }
                Op::MarkDone { key } => {
                    let outcome = list.mark_done(id_for(key)).map(|_| ());
                    match model.get_mut(&key) {
                        Some(entry) => {
                            prop_assert!(outcome.is_ok());
                            entry.1 = true;
                        }
                        None => prop_assert_eq!(&outcome, &Err(TodoListError::NotFound(id_for(key)))),
                    }
                    outcome
                }
                Op::Update { key, len } => {
                    let text = content(key, len);
                    let outcome = list.update_content(id_for(key), text.clone()).map(|_| ());
                    match model.get_mut(&key) {
                        None => prop_assert_eq!(&outcome, &Err(TodoListError::NotFound(id_for(key)))),
                        Some(_) if len > MAX_CONTENT_LEN => {
                            let too_long =
                                matches!(outcome, Err(TodoListError::ContentTooLong { .. }));
                            prop_assert!(too_long, "update: got {:?}", outcome);
                        }
                        Some(entry) => {
                            prop_assert!(outcome.is_ok());
                            entry.0 = text;
                        }
                    }
                    outcome
                }
                Op::Delete { key } => {
                    let len_before = list.slot_count();
                    let outcome = list.delete(id_for(key)).map(|_| ());
                    if model.remove(&key).is_some() {
                        prop_assert!(outcome.is_ok());
                        prop_assert_eq!(list.slot_count(), len_before);
                    } else {
                        prop_assert_eq!(&outcome, &Err(TodoListError::NotFound(id_for(key))));
                    }
                    outcome
                }
            };

            if result.is_err() {
                prop_assert_eq!(&list, &before);
            }

            prop_assert!(list.verify_invariants().is_ok());
            prop_assert_eq!(list.live_count(), list.slot_count() - list.deleted_indexes().len());
            prop_assert!(list.slot_count() <= MAX_TODO_LIST_LENGTH);
            prop_assert!(list.slot_count() >= before.slot_count());
            prop_assert_eq!(list.live_count(), model.len());
            for (key, (text, completed)) in &model {
                let todo = list.get(id_for(*key));
                prop_assert!(todo.is_some());
                let todo = todo.unwrap();
                prop_assert_eq!(&todo.content, text);
                prop_assert_eq!(todo.completed, *completed);
            }
        }
    }
}
