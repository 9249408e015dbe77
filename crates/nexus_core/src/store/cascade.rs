//! Referential cascade rules.
//!
//! Foreign-key edges are declared once in [`RELATIONS`]; deleting any record
//! walks those edges breadth-first and removes every dependent, so the
//! per-entity delete mutators never encode their own cascade logic.

use super::table::{Removed, Table};
use super::CrmStore;
use crate::model::deal::Deal;
use crate::model::task::{RelatedKind, Task};
use crate::model::team::Goal;
use crate::model::{EntityId, EntityKind, Record};
use std::collections::{HashSet, VecDeque};

/// Child → parent foreign-key edge.
#[derive(Debug, Clone, Copy)]
struct Relation {
    child: EntityKind,
    parent: EntityKind,
}

const RELATIONS: &[Relation] = &[
    Relation {
        child: EntityKind::Deal,
        parent: EntityKind::Client,
    },
    Relation {
        child: EntityKind::Task,
        parent: EntityKind::Client,
    },
    Relation {
        child: EntityKind::Task,
        parent: EntityKind::Deal,
    },
    Relation {
        child: EntityKind::Goal,
        parent: EntityKind::TeamMember,
    },
];

/// Whether a record holds a foreign key to `(parent, id)`.
trait References {
    fn references(&self, parent: EntityKind, id: &str) -> bool;
}

impl References for Deal {
    fn references(&self, parent: EntityKind, id: &str) -> bool {
        parent == EntityKind::Client && self.client_id == id
    }
}

impl References for Task {
    fn references(&self, parent: EntityKind, id: &str) -> bool {
        let kind = match parent {
            EntityKind::Client => RelatedKind::Client,
            EntityKind::Deal => RelatedKind::Deal,
            EntityKind::Conversation => RelatedKind::Conversation,
            _ => return false,
        };
        self.is_related_to(kind, id)
    }
}

impl References for Goal {
    fn references(&self, parent: EntityKind, id: &str) -> bool {
        parent == EntityKind::TeamMember && self.member_id == id
    }
}

/// Ids of every dependent record that a delete must take with it.
#[derive(Debug, Default)]
struct CascadePlan {
    deals: HashSet<EntityId>,
    tasks: HashSet<EntityId>,
    goals: HashSet<EntityId>,
}

/// Dependents removed by one cascade, with original positions.
#[derive(Debug, Default)]
pub(crate) struct CascadeRemoval {
    pub deals: Vec<Removed<Deal>>,
    pub tasks: Vec<Removed<Task>>,
    pub goals: Vec<Removed<Goal>>,
}

impl CrmStore {
    /// Removes every record that depends, directly or transitively, on
    /// `(kind, id)`. The root record itself is not touched.
    pub(crate) fn cascade_delete(&mut self, kind: EntityKind, id: &str) -> CascadeRemoval {
        let plan = self.plan_cascade(kind, id);
        CascadeRemoval {
            deals: take_planned(&mut self.deals, &plan.deals),
            tasks: take_planned(&mut self.tasks, &plan.tasks),
            goals: take_planned(&mut self.goals, &plan.goals),
        }
    }

    fn plan_cascade(&self, kind: EntityKind, id: &str) -> CascadePlan {
        let mut plan = CascadePlan::default();
        let mut queue = VecDeque::from([(kind, id.to_string())]);

        while let Some((parent_kind, parent_id)) = queue.pop_front() {
            for relation in RELATIONS.iter().filter(|edge| edge.parent == parent_kind) {
                match relation.child {
                    EntityKind::Deal => collect_children(
                        &self.deals,
                        &mut plan.deals,
                        parent_kind,
                        &parent_id,
                        &mut queue,
                    ),
                    EntityKind::Task => collect_children(
                        &self.tasks,
                        &mut plan.tasks,
                        parent_kind,
                        &parent_id,
                        &mut queue,
                    ),
                    EntityKind::Goal => collect_children(
                        &self.goals,
                        &mut plan.goals,
                        parent_kind,
                        &parent_id,
                        &mut queue,
                    ),
                    _ => {}
                }
            }
        }

        plan
    }
}

fn collect_children<T: Record + References>(
    table: &Table<T>,
    planned: &mut HashSet<EntityId>,
    parent_kind: EntityKind,
    parent_id: &str,
    queue: &mut VecDeque<(EntityKind, EntityId)>,
) {
    for row in table.iter().filter(|row| row.references(parent_kind, parent_id)) {
        if planned.insert(row.id().to_string()) {
            queue.push_back((T::KIND, row.id().to_string()));
        }
    }
}

fn take_planned<T: Record>(table: &mut Table<T>, planned: &HashSet<EntityId>) -> Vec<Removed<T>> {
    if planned.is_empty() {
        return Vec::new();
    }
    table.remove_where(|row| planned.contains(row.id()))
}
