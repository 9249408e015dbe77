//! Team member and goal mutators.

use super::undo::UndoCommand;
use super::{CrmStore, StoreError, StoreResult};
use crate::model::notification::NotificationKind;
use crate::model::team::{Goal, MemberStatus, NewGoal, NewTeamMember, TeamMember, TeamMemberPatch};
use crate::model::{new_entity_id, EntityKind};
use log::info;
use rust_decimal::Decimal;

impl CrmStore {
    /// Invites a member. Missing permissions fall back to the role defaults.
    pub fn add_team_member(&mut self, input: NewTeamMember) -> TeamMember {
        let member = TeamMember {
            id: new_entity_id(),
            tenant_id: self.config.tenant_id.clone(),
            name: input.name,
            email: input.email,
            role: input.role,
            status: MemberStatus::Active,
            permissions: input
                .permissions
                .unwrap_or_else(|| input.role.default_permissions()),
            created_at: self.now(),
        };
        self.team_members.push(member.clone());

        info!(
            "event=member_create module=store status=ok member_id={}",
            member.id
        );
        self.notify(
            NotificationKind::Success,
            "Membro adicionado",
            format!("{} agora faz parte da equipe", member.name),
        );
        member
    }

    pub fn update_team_member(
        &mut self,
        id: &str,
        patch: TeamMemberPatch,
    ) -> StoreResult<TeamMember> {
        let member = self.team_members.require_mut(id)?;
        patch.apply(member);
        let updated = member.clone();

        info!("event=member_update module=store status=ok member_id={id}");
        self.notify(
            NotificationKind::Success,
            "Membro atualizado",
            format!("{} foi atualizado", updated.name),
        );
        Ok(updated)
    }

    /// Removes a member and their goals.
    pub fn delete_team_member(&mut self, id: &str) -> StoreResult<TeamMember> {
        let member = self.team_members.remove(id)?;
        let removal = self.cascade_delete(EntityKind::TeamMember, id);
        if self.ui.current_user_id.as_deref() == Some(id) {
            self.ui.current_user_id = self.team_members.first().map(|first| first.id.clone());
        }

        let removed = member.record.clone();
        let goals_removed = removal.goals.len();
        self.record_undo(UndoCommand::DeleteTeamMember {
            member,
            goals: removal.goals,
        });
        info!("event=member_delete module=store status=ok member_id={id} goals_removed={goals_removed}");
        self.notify(
            NotificationKind::Success,
            "Membro removido",
            format!("{} foi removido da equipe", removed.name),
        );
        Ok(removed)
    }

    /// Sets a monthly target. An existing goal for the same member and month
    /// is overwritten.
    pub fn set_goal(&mut self, input: NewGoal) -> StoreResult<Goal> {
        if !(1..=12).contains(&input.month) {
            return Err(StoreError::InvalidMonth(input.month));
        }
        self.team_members.require(&input.member_id)?;

        let existing = self
            .goals
            .iter()
            .find(|goal| {
                goal.member_id == input.member_id
                    && goal.month == input.month
                    && goal.year == input.year
            })
            .map(|goal| goal.id.clone());

        let goal = match existing {
            Some(goal_id) => {
                let goal = self.goals.require_mut(&goal_id)?;
                goal.target = input.target.max(Decimal::ZERO);
                goal.clone()
            }
            None => {
                let goal = Goal {
                    id: new_entity_id(),
                    member_id: input.member_id,
                    month: input.month,
                    year: input.year,
                    target: input.target.max(Decimal::ZERO),
                };
                self.goals.push(goal.clone());
                goal
            }
        };

        info!(
            "event=goal_set module=store status=ok goal_id={} member_id={} month={}-{:02}",
            goal.id, goal.member_id, goal.year, goal.month
        );
        Ok(goal)
    }

    pub fn delete_goal(&mut self, id: &str) -> StoreResult<Goal> {
        let goal = self.goals.remove(id)?.record;
        info!("event=goal_delete module=store status=ok goal_id={id}");
        Ok(goal)
    }
}
