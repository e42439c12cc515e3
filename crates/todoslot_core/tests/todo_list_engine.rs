use todoslot_core::{
    SlotIndex, SlotState, TodoList, TodoListError, MAX_CONTENT_LEN, MAX_TODO_LIST_LENGTH,
};
use uuid::Uuid;

fn new_list() -> TodoList {
    TodoList::new(Uuid::new_v4())
}

fn fill(list: &mut TodoList, n: usize) -> Vec<Uuid> {
    (0..n)
        .map(|i| {
            let id = Uuid::new_v4();
            list.add(id, format!("todo {i}")).unwrap();
            id
        })
        .collect()
}

#[test]
fn add_mark_update_delete_then_reuse_slot() {
    let owner = Uuid::new_v4();
    let mut list = TodoList::new(owner);
    assert_eq!(list.owner(), owner);
    assert_eq!(list.live_count(), 0);
    assert_eq!(list.slot_count(), 0);
    assert!(list.deleted_indexes().is_empty());

    let id1 = Uuid::new_v4();
    let slot = list.add(id1, "Write tests").unwrap();
    assert_eq!(slot, SlotIndex { index: 0, reused: false });
    assert_eq!(list.live_count(), 1);
    let todo = list.get(id1).unwrap();
    assert_eq!(todo.content, "Write tests");
    assert!(!todo.completed);

    list.mark_done(id1).unwrap();
    assert!(list.get(id1).unwrap().completed);
    assert_eq!(list.live_count(), 1);

    list.update_content(id1, "Write more tests").unwrap();
    let todo = list.get(id1).unwrap();
    assert_eq!(todo.content, "Write more tests");
    assert!(todo.completed, "update must not touch completed");

    assert_eq!(list.delete(id1).unwrap(), 0);
    assert_eq!(list.live_count(), 0);
    assert_eq!(list.slot_count(), 1);
    assert_eq!(list.deleted_indexes(), &[0]);
    assert_eq!(list.slot_state(0), Some(SlotState::Tombstoned));

    let id2 = Uuid::new_v4();
    let slot = list.add(id2, "Reused slot").unwrap();
    assert_eq!(slot, SlotIndex { index: 0, reused: true });
    assert_eq!(list.live_count(), 1);
    assert_eq!(list.slot_count(), 1);
    assert!(list.deleted_indexes().is_empty());
    let todo = list.get(id2).unwrap();
    assert_eq!(todo.content, "Reused slot");
    assert!(!todo.completed);
    list.verify_invariants().unwrap();
}

#[test]
fn forty_first_add_without_holes_is_rejected() {
    let mut list = new_list();
    fill(&mut list, MAX_TODO_LIST_LENGTH);
    let before = list.clone();

    let err = list.add(Uuid::new_v4(), "one too many").unwrap_err();
    assert_eq!(err, TodoListError::CapacityExceeded);
    assert_eq!(list, before);
    assert_eq!(list.remaining_capacity(), 0);
}

#[test]
fn full_list_accepts_add_after_delete() {
    let mut list = new_list();
    let ids = fill(&mut list, MAX_TODO_LIST_LENGTH);

    list.delete(ids[17]).unwrap();
    let slot = list.add(Uuid::new_v4(), "fits again").unwrap();

    assert_eq!(slot, SlotIndex { index: 17, reused: true });
    assert_eq!(list.slot_count(), MAX_TODO_LIST_LENGTH);
    assert_eq!(list.live_count(), MAX_TODO_LIST_LENGTH);
}

#[test]
fn content_limit_is_inclusive() {
    let mut list = new_list();
    let id = Uuid::new_v4();

    list.add(id, "a".repeat(MAX_CONTENT_LEN)).unwrap();
    let err = list
        .add(Uuid::new_v4(), "a".repeat(MAX_CONTENT_LEN + 1))
        .unwrap_err();
    assert_eq!(
        err,
        TodoListError::ContentTooLong {
            len: MAX_CONTENT_LEN + 1,
            max: MAX_CONTENT_LEN
        }
    );

    let err = list
        .update_content(id, "b".repeat(MAX_CONTENT_LEN + 1))
        .unwrap_err();
    assert!(matches!(err, TodoListError::ContentTooLong { .. }));
    assert_eq!(list.get(id).unwrap().content, "a".repeat(MAX_CONTENT_LEN));
    list.update_content(id, "b".repeat(MAX_CONTENT_LEN)).unwrap();
}

#[test]
fn content_limit_counts_utf8_bytes() {
    let mut list = new_list();
    // 'é' is two bytes: 100 chars fit, 101 do not.
    list.add(Uuid::new_v4(), "é".repeat(100)).unwrap();
    let err = list.add(Uuid::new_v4(), "é".repeat(101)).unwrap_err();
    assert!(matches!(err, TodoListError::ContentTooLong { len: 202, .. }));
}

#[test]
fn duplicate_live_id_is_rejected() {
    let mut list = new_list();
    let id = Uuid::new_v4();
    list.add(id, "first").unwrap();

    let err = list.add(id, "second").unwrap_err();
    assert_eq!(err, TodoListError::DuplicateId(id));
    assert_eq!(list.live_count(), 1);
    assert_eq!(list.get(id).unwrap().content, "first");
}

#[test]
fn double_delete_reports_not_found() {
    let mut list = new_list();
    let id = Uuid::new_v4();
    list.add(id, "short lived").unwrap();

    list.delete(id).unwrap();
    let err = list.delete(id).unwrap_err();
    assert_eq!(err, TodoListError::NotFound(id));
    assert_eq!(list.deleted_indexes(), &[0]);
    assert_eq!(list.live_count(), 0);
}

#[test]
fn unknown_id_reports_not_found_everywhere() {
    let mut list = new_list();
    fill(&mut list, 3);
    let missing = Uuid::new_v4();
    let before = list.clone();

    assert_eq!(list.mark_done(missing), Err(TodoListError::NotFound(missing)));
    assert_eq!(
        list.update_content(missing, "nope"),
        Err(TodoListError::NotFound(missing))
    );
    assert_eq!(list.delete(missing), Err(TodoListError::NotFound(missing)));
    assert_eq!(list, before);
}

#[test]
fn reuse_is_last_deleted_first() {
    let mut list = new_list();
    let ids = fill(&mut list, 5);

    list.delete(ids[1]).unwrap();
    list.delete(ids[3]).unwrap();
    list.delete(ids[0]).unwrap();
    assert_eq!(list.deleted_indexes(), &[1, 3, 0]);

    let reused: Vec<usize> = (0..3)
        .map(|_| list.add(Uuid::new_v4(), "again").unwrap().index)
        .collect();
    assert_eq!(reused, vec![0, 3, 1]);
    assert_eq!(list.slot_count(), 5);

    let appended = list.add(Uuid::new_v4(), "tail").unwrap();
    assert_eq!(appended, SlotIndex { index: 5, reused: false });
}

#[test]
fn sequence_never_shrinks_when_everything_is_deleted() {
    let mut list = new_list();
    let ids = fill(&mut list, 4);
    for id in &ids {
        list.delete(*id).unwrap();
    }

    assert_eq!(list.live_count(), 0);
    assert_eq!(list.slot_count(), 4);
    assert_eq!(list.live_todos().count(), 0);
    assert!(list.slots().iter().all(|todo| todo.is_scrubbed()));
    list.verify_invariants().unwrap();
}

#[test]
fn mark_done_is_idempotent() {
    let mut list = new_list();
    let id = Uuid::new_v4();
    list.add(id, "finish").unwrap();

    list.mark_done(id).unwrap();
    let once = list.clone();
    list.mark_done(id).unwrap();
    assert_eq!(list, once);
}

#[test]
fn repeated_update_is_a_no_op() {
    let mut list = new_list();
    let id = Uuid::new_v4();
    list.add(id, "draft").unwrap();

    list.update_content(id, "final").unwrap();
    let once = list.clone();
    list.update_content(id, "final").unwrap();
    assert_eq!(list, once);
}

#[test]
fn live_todos_skip_tombstones_in_sequence_order() {
    let mut list = new_list();
    let ids = fill(&mut list, 4);
    list.delete(ids[2]).unwrap();

    let live: Vec<(usize, Uuid)> = list
        .live_todos()
        .map(|(index, todo)| (index, todo.id))
        .collect();
    assert_eq!(live, vec![(0, ids[0]), (1, ids[1]), (3, ids[3])]);
    assert_eq!(list.slot_state(4), None);
}
