//! Optimistic mutations over cached query results.
//!
//! A [`Transaction`] records, for every loaded entry, the data before and
//! after the mutation. The cache writes `after` to apply it and `before` to
//! roll it back, so both directions go through the same path.

use std::collections::HashMap;

use chrono::NaiveDate;
use dayplan_core::dashboard::Dashboard;
use dayplan_core::dates::bucket_of;
use dayplan_core::search::{newest_first, Page};
use dayplan_core::todo::{Todo, TodoPatch};
use dayplan_core::types::TodoId;

use crate::cache::{CachedData, QueryKey};

/// A change applied ahead of server confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Update { id: TodoId, patch: TodoPatch },
    Delete { id: TodoId },
}

impl Mutation {
    pub fn id(&self) -> TodoId {
        match self {
            Mutation::Update { id, .. } | Mutation::Delete { id } => *id,
        }
    }
}

/// `{before, after, affected_keys}` for one optimistic mutation.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub mutation: Mutation,
    /// Every entry the mutation touches; all of them are refetched on settle.
    pub affected_keys: Vec<QueryKey>,
    /// Data as it was before the mutation, for entries that had data.
    pub before: HashMap<QueryKey, CachedData>,
    /// Data with the mutation applied.
    pub after: HashMap<QueryKey, CachedData>,
}

impl Transaction {
    /// Compute the optimistic result of `mutation` over the loaded entries.
    ///
    /// `keys` lists every cached key (including ones still loading);
    /// `loaded` yields the data of those that have some.
    pub fn plan<'a>(
        mutation: Mutation,
        keys: Vec<QueryKey>,
        loaded: impl IntoIterator<Item = (&'a QueryKey, &'a CachedData)>,
    ) -> Self {
        let loaded: Vec<(&QueryKey, &CachedData)> = loaded.into_iter().collect();

        // The todo as it will look after an update. Needed when the update
        // moves it onto a dashboard day that does not list it yet.
        let updated = match &mutation {
            Mutation::Update { id, patch } => find_todo(&loaded, *id).map(|mut todo| {
                patch.apply_to(&mut todo);
                todo
            }),
            Mutation::Delete { .. } => None,
        };

        let mut before = HashMap::with_capacity(loaded.len());
        let mut after = HashMap::with_capacity(loaded.len());
        for (key, data) in loaded {
            before.insert(key.clone(), data.clone());
            after.insert(key.clone(), apply(key, data, &mutation, updated.as_ref()));
        }

        Transaction {
            mutation,
            affected_keys: keys,
            before,
            after,
        }
    }
}

fn find_todo(loaded: &[(&QueryKey, &CachedData)], id: TodoId) -> Option<Todo> {
    loaded
        .iter()
        .find_map(|(_, data)| data.todos().find(|todo| todo.id == id))
        .cloned()
}

/// Apply `mutation` to one entry's data.
pub fn apply(
    key: &QueryKey,
    data: &CachedData,
    mutation: &Mutation,
    updated: Option<&Todo>,
) -> CachedData {
    match (key, data) {
        (QueryKey::Dashboard { date }, CachedData::Dashboard(dashboard)) => {
            CachedData::Dashboard(apply_to_dashboard(*date, dashboard, mutation, updated))
        }
        (_, CachedData::Pages(pages)) => CachedData::Pages(
            pages
                .iter()
                .map(|page| apply_to_page(page, mutation))
                .collect(),
        ),
        (_, other) => other.clone(),
    }
}

fn apply_to_page(page: &Page<Todo>, mutation: &Mutation) -> Page<Todo> {
    let mut page = page.clone();
    match mutation {
        Mutation::Update { id, patch } => {
            if let Some(todo) = page.data.iter_mut().find(|t| t.id == *id) {
                patch.apply_to(todo);
            }
        }
        Mutation::Delete { id } => {
            page.data.retain(|t| t.id != *id);
            // The server can no longer resolve a deleted cursor; the new
            // last item marks the same position.
            if page.next_cursor == Some(*id) {
                page.next_cursor = page.data.last().map(|t| t.id);
            }
        }
    }
    page
}

fn apply_to_dashboard(
    day: NaiveDate,
    dashboard: &Dashboard,
    mutation: &Mutation,
    updated: Option<&Todo>,
) -> Dashboard {
    let mut dashboard = dashboard.clone();
    let mut counts = dashboard.counts();
    let position = dashboard
        .todos_for_today
        .iter()
        .position(|t| t.id == mutation.id());

    match (mutation, position) {
        (Mutation::Delete { .. }, Some(index)) => {
            let removed = dashboard.todos_for_today.remove(index);
            counts.remove(removed.is_completed);
        }
        (Mutation::Update { patch, .. }, Some(index)) => {
            let was_completed = dashboard.todos_for_today[index].is_completed;
            patch.apply_to(&mut dashboard.todos_for_today[index]);
            let todo = &dashboard.todos_for_today[index];

            if on_day(todo, day) {
                counts.transition(was_completed, todo.is_completed);
            } else {
                dashboard.todos_for_today.remove(index);
                counts.remove(was_completed);
            }
        }
        (Mutation::Update { .. }, None) => {
            if let Some(todo) = updated.filter(|t| on_day(t, day)) {
                counts.add(todo.is_completed);
                let at = dashboard.todos_for_today.partition_point(|t| {
                    newest_first((&t.created_at, &t.id), (&todo.created_at, &todo.id)).is_lt()
                });
                dashboard.todos_for_today.insert(at, todo.clone());
            }
        }
        (Mutation::Delete { .. }, None) => {}
    }

    dashboard.set_counts(counts);
    dashboard
}

fn on_day(todo: &Todo, day: NaiveDate) -> bool {
    todo.date.as_ref().map(bucket_of) == Some(day)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use dayplan_core::dates::day_range;
    use dayplan_core::todo::UpdateTodo;
    use uuid::Uuid;

    use super::*;

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn todo(n: u128, title: &str, done: bool, date: Option<&str>) -> Todo {
        Todo {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            start_time: None,
            end_time: None,
            date: date.map(|d| day_range(d).unwrap().start),
            description: None,
            is_completed: done,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
                + Duration::minutes(n as i64),
        }
    }

    fn dashboard_key() -> QueryKey {
        QueryKey::Dashboard {
            date: march_first(),
        }
    }

    /// Newest first, as the server returns them.
    fn sample_dashboard() -> Dashboard {
        Dashboard::from_todos(vec![
            todo(3, "Gym", false, Some("2024-03-01")),
            todo(2, "Call landlord", true, Some("2024-03-01")),
            todo(1, "Pay rent", false, Some("2024-03-01")),
        ])
    }

    fn update(id: u128, input: UpdateTodo) -> Mutation {
        Mutation::Update {
            id: Uuid::from_u128(id),
            patch: input.normalize().unwrap(),
        }
    }

    fn applied_dashboard(data: &Dashboard, mutation: &Mutation, updated: Option<&Todo>) -> Dashboard {
        match apply(&dashboard_key(), &CachedData::Dashboard(data.clone()), mutation, updated) {
            CachedData::Dashboard(dashboard) => dashboard,
            other => panic!("expected dashboard, got {other:?}"),
        }
    }

    #[test]
    fn completing_moves_pending_to_completed() {
        let mutation = update(1, UpdateTodo::completion(true));
        let dashboard = applied_dashboard(&sample_dashboard(), &mutation, None);
        assert_eq!(dashboard.completed_tasks, 2);
        assert_eq!(dashboard.pending_tasks, 1);
        assert!((dashboard.progress_percent - 200.0 / 3.0).abs() < 1e-9);
        assert!(dashboard.todos_for_today[2].is_completed);
    }

    #[test]
    fn double_flip_restores_dashboard() {
        let original = sample_dashboard();
        let once = applied_dashboard(&original, &update(1, UpdateTodo::completion(true)), None);
        let twice = applied_dashboard(&once, &update(1, UpdateTodo::completion(false)), None);
        assert_eq!(twice, original);
    }

    #[test]
    fn delete_decrements_exactly_one_counter() {
        let dashboard = applied_dashboard(
            &sample_dashboard(),
            &Mutation::Delete {
                id: Uuid::from_u128(2),
            },
            None,
        );
        assert_eq!(dashboard.completed_tasks, 0);
        assert_eq!(dashboard.pending_tasks, 2);
        assert_eq!(dashboard.progress_percent, 0.0);
        assert_eq!(dashboard.todos_for_today.len(), 2);
    }

    #[test]
    fn moving_date_off_the_day_removes_from_dashboard() {
        let input = UpdateTodo {
            date: Some("2024-03-05".into()),
            ..UpdateTodo::default()
        };
        let dashboard = applied_dashboard(&sample_dashboard(), &update(3, input), None);
        assert_eq!(dashboard.pending_tasks, 1);
        assert!(dashboard.todos_for_today.iter().all(|t| t.id.as_u128() != 3));
    }

    #[test]
    fn moving_date_onto_the_day_inserts_in_order() {
        let mut moved = todo(4, "Dentist", false, Some("2024-03-01"));
        moved.created_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 2, 30).unwrap();
        let mutation = update(
            4,
            UpdateTodo {
                date: Some("2024-03-01".into()),
                ..UpdateTodo::default()
            },
        );

        let dashboard = applied_dashboard(&sample_dashboard(), &mutation, Some(&moved));
        let ids: Vec<u128> = dashboard.todos_for_today.iter().map(|t| t.id.as_u128()).collect();
        assert_eq!(ids, vec![3, 4, 2, 1]);
        assert_eq!(dashboard.pending_tasks, 3);
    }

    #[test]
    fn update_patches_every_loaded_page() {
        let pages = CachedData::Pages(vec![
            Page {
                data: vec![todo(3, "Gym", false, None), todo(2, "Pay rent", false, None)],
                next_cursor: Some(Uuid::from_u128(2)),
                has_more: true,
            },
            Page {
                data: vec![todo(1, "Rent car", false, None)],
                next_cursor: None,
                has_more: false,
            },
        ]);
        let mutation = update(
            1,
            UpdateTodo {
                title: Some("Return car".into()),
                ..UpdateTodo::default()
            },
        );

        let CachedData::Pages(pages) = apply(&QueryKey::Todos, &pages, &mutation, None) else {
            panic!("expected pages");
        };
        assert_eq!(pages[1].data[0].title, "Return car");
        assert_eq!(pages[0].data[1].title, "Pay rent");
    }

    #[test]
    fn deleting_the_cursor_item_moves_the_cursor() {
        let pages = CachedData::Pages(vec![Page {
            data: vec![todo(3, "Gym", false, None), todo(2, "Pay rent", false, None)],
            next_cursor: Some(Uuid::from_u128(2)),
            has_more: true,
        }]);
        let mutation = Mutation::Delete {
            id: Uuid::from_u128(2),
        };

        let CachedData::Pages(pages) = apply(&QueryKey::Todos, &pages, &mutation, None) else {
            panic!("expected pages");
        };
        assert_eq!(pages[0].data.len(), 1);
        assert_eq!(pages[0].next_cursor, Some(Uuid::from_u128(3)));
        assert!(pages[0].has_more);
    }

    #[test]
    fn plan_records_before_and_after_for_loaded_entries() {
        let list = CachedData::Pages(vec![Page {
            data: vec![todo(1, "Pay rent", false, Some("2024-03-01"))],
            next_cursor: None,
            has_more: false,
        }]);
        let dashboard = CachedData::Dashboard(Dashboard::from_todos(vec![todo(
            1,
            "Pay rent",
            false,
            Some("2024-03-01"),
        )]));
        let keys = vec![QueryKey::Todos, dashboard_key(), QueryKey::search("gym")];

        let tx = Transaction::plan(
            update(1, UpdateTodo::completion(true)),
            keys.clone(),
            [(&keys[0], &list), (&keys[1], &dashboard)],
        );

        assert_eq!(tx.affected_keys, keys);
        assert_eq!(tx.before[&QueryKey::Todos], list);
        assert_eq!(tx.before.len(), 2);
        let CachedData::Dashboard(after) = &tx.after[&dashboard_key()] else {
            panic!("expected dashboard");
        };
        assert_eq!(after.progress_percent, 100.0);
    }
}
